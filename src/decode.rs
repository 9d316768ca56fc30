// decode.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF file decoding
use crate::block::*;
use crate::color_table::ColorTable;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::image::GifImage;
use crate::interlace::deinterlace;
use crate::lzw::Decompressor;
use pix::Raster;
use std::io::{self, ErrorKind, Read};

/// Buffer size (must be at least as large as a color table with 256 entries)
const BUF_SZ: usize = 1024;

/// An `Iterator` for [Block]s within a GIF file.
///
/// Build with Decoder.[into_blocks].
///
/// [Block]: block/enum.Block.html
/// [into_blocks]: ../struct.Decoder.html#method.into_blocks
pub struct Blocks<R: Read> {
    /// Reader for blocks
    reader: R,
    /// Maximum image size, in bytes
    max_image_sz: Option<usize>,
    /// Buffer for incoming data
    buffer: Vec<u8>,
    /// Expected next block and size
    expected_next: Option<(BlockCode, usize)>,
    /// Size of image data
    image_sz: usize,
    /// LZW decompressor for image data
    decompressor: Option<Decompressor>,
    /// Scratch buffer for decompressed data
    scratch: Vec<u8>,
    /// Reader error, held until the buffered data runs out
    read_err: Option<io::Error>,
    /// Trailer (or an error) reached
    done: bool,
}

impl<R: Read> Iterator for Blocks<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.next_block();
        match res {
            Ok(Block::Trailer(_)) | Err(_) => self.done = true,
            _ => (),
        }
        Some(res)
    }
}

impl<R: Read> Blocks<R> {
    /// Create a new block iterator
    pub(crate) fn new(reader: R, max_image_sz: Option<usize>) -> Self {
        use crate::block::BlockCode::Header_;
        Blocks {
            reader,
            max_image_sz,
            buffer: Vec::with_capacity(BUF_SZ),
            expected_next: Some((Header_, Header_.size())),
            image_sz: 0,
            decompressor: None,
            scratch: Vec::with_capacity(BUF_SZ),
            read_err: None,
            done: false,
        }
    }

    /// Examine buffer for block code and size.
    fn examine_buffer(&mut self) -> Result<(BlockCode, usize)> {
        let (bc, sz) = match self.expected_next.take() {
            Some(bc_sz) => bc_sz,
            None => {
                let t = match self.buffer.first() {
                    Some(t) => *t,
                    None => return Err(self.end_of_data()),
                };
                let bc = BlockCode::from_u8(t).ok_or(Error::InvalidBlockCode)?;
                (bc, bc.size())
            }
        };
        self.expected_next = self.expected(bc);
        Ok((bc, sz))
    }

    /// Get next expected block code and size
    fn expected(&self, bc: BlockCode) -> Option<(BlockCode, usize)> {
        use crate::block::BlockCode::*;
        match bc {
            Header_ => Some((LogicalScreenDesc_, LogicalScreenDesc_.size())),
            LogicalScreenDesc_ => {
                let buf = self.buffer.get(..LogicalScreenDesc_.size())?;
                let sz = LogicalScreenDesc::from_buf(buf)
                    .color_table_config()
                    .size_bytes();
                if sz > 0 {
                    Some((GlobalColorTable_, sz))
                } else {
                    None
                }
            }
            ImageDesc_ => {
                let buf = self.buffer.get(..ImageDesc_.size())?;
                let sz = ImageDesc::from_buf(buf).color_table_config().size_bytes();
                if sz > 0 {
                    Some((LocalColorTable_, sz))
                } else {
                    Some((ImageData_, ImageData_.size()))
                }
            }
            LocalColorTable_ => Some((ImageData_, ImageData_.size())),
            _ => None,
        }
    }

    /// Decode the next block (including all sub-blocks).
    fn next_block(&mut self) -> Result<Block> {
        self.fill_buffer()?;
        let (bc, sz) = self.examine_buffer()?;
        let mut block = self.decode_block(bc, sz)?;
        if block.has_sub_blocks() {
            while self.decode_sub_block(&mut block)? {}
        }
        self.check_block_end(&block)?;
        Ok(block)
    }

    /// Fill the buffer from reader.
    ///
    /// A reader error stops further reads; it is reported once the
    /// buffered data is not enough for the next block.
    fn fill_buffer(&mut self) -> Result<()> {
        if self.read_err.is_some() {
            return Ok(());
        }
        let mut len = self.buffer.len();
        self.buffer.resize(BUF_SZ, 0);
        while len < BUF_SZ {
            match self.reader.read(&mut self.buffer[len..]) {
                Ok(0) => break, // EOF
                Ok(n) => len += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => {
                    self.read_err = Some(e);
                    break;
                }
            }
        }
        self.buffer.truncate(len);
        Ok(())
    }

    /// Decode one block
    fn decode_block(&mut self, bc: BlockCode, sz: usize) -> Result<Block> {
        if self.buffer.len() >= sz {
            debug!("  block  : {:?} {:?}", bc, sz);
            let block = self.parse_block(bc, sz)?;
            self.buffer.drain(..sz);
            self.check_block_start(&block)?;
            Ok(block)
        } else if bc == BlockCode::Header_ {
            match self.read_err.take() {
                Some(e) => Err(Error::Io(e)),
                None => Err(Error::MalformedHeader),
            }
        } else {
            Err(self.end_of_data())
        }
    }

    /// Get the error for data ending before a complete block
    fn end_of_data(&mut self) -> Error {
        match self.read_err.take() {
            Some(e) => Error::Read(e),
            None => Error::UnexpectedEndOfFile,
        }
    }

    /// Parse a block in the buffer
    fn parse_block(&self, bc: BlockCode, sz: usize) -> Result<Block> {
        use crate::block::BlockCode::*;
        let buf = &self.buffer[..sz];
        Ok(match bc {
            Header_ => Header::from_buf(buf)?.into(),
            LogicalScreenDesc_ => LogicalScreenDesc::from_buf(buf).into(),
            GlobalColorTable_ => GlobalColorTable::with_colors(buf).into(),
            Extension_ => Block::parse_extension(buf),
            ImageDesc_ => ImageDesc::from_buf(buf).into(),
            LocalColorTable_ => LocalColorTable::with_colors(buf).into(),
            ImageData_ => ImageData::from_buf(self.image_sz, buf)?.into(),
            Trailer_ => Trailer::default().into(),
        })
    }

    /// Check start of block (before sub-blocks)
    fn check_block_start(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::ImageDesc(b) => {
                self.image_sz = b.image_sz();
                if let Some(sz) = self.max_image_sz {
                    if self.image_sz > sz {
                        return Err(Error::TooLargeImage);
                    }
                }
            }
            Block::ImageData(b) => {
                self.decompressor = Some(Decompressor::new(b.min_code_size()));
            }
            _ => (),
        }
        Ok(())
    }

    /// Check end of block (after sub-blocks)
    fn check_block_end(&mut self, block: &Block) -> Result<()> {
        if let Block::ImageData(b) = block {
            if let Some(dec) = self.decompressor.take() {
                if !dec.is_done() {
                    debug!("image data: missing end code");
                }
            }
            if !b.is_complete() {
                return Err(Error::IncompleteImageData);
            }
        }
        Ok(())
    }

    /// Decode one sub-block.
    ///
    /// Returns `false` after the terminating (empty) sub-block.
    fn decode_sub_block(&mut self, block: &mut Block) -> Result<bool> {
        self.fill_buffer()?;
        let len = self.buffer.len();
        if len > 0 {
            let sz = usize::from(self.buffer[0]);
            if len > sz {
                let bsz = sz + 1;
                if sz > 0 {
                    trace!("sub-block: {:?}", sz);
                    self.parse_sub_block(block, bsz)?;
                }
                self.buffer.drain(..bsz);
                return Ok(sz > 0);
            }
        }
        Err(self.end_of_data())
    }

    /// Parse a sub-block in the buffer
    fn parse_sub_block(&mut self, block: &mut Block, sz: usize) -> Result<()> {
        match block {
            Block::GraphicControl(b) => b.parse_buf(&self.buffer[1..sz]),
            Block::Extension(b) => {
                b.skip_sub_block(sz - 1);
                Ok(())
            }
            Block::ImageData(b) => self.decode_image_data(b, sz),
            _ => Err(Error::InvalidBlockSequence),
        }
    }

    /// Decode image data
    fn decode_image_data(&mut self, b: &mut ImageData, sz: usize) -> Result<()> {
        let dec = self
            .decompressor
            .as_mut()
            .ok_or(Error::InvalidBlockSequence)?;
        self.scratch.clear();
        dec.decompress(&self.buffer[1..sz], &mut self.scratch)?;
        b.add_data(&self.scratch);
        Ok(())
    }
}

impl Header {
    /// Decode a Header block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        if &buf[..3] == b"GIF" {
            let version = [buf[3], buf[4], buf[5]];
            match &version {
                b"87a" | b"89a" => Ok(Header::with_version(version)),
                _ => Err(Error::UnsupportedVersion(version)),
            }
        } else {
            Err(Error::MalformedHeader)
        }
    }
}

impl LogicalScreenDesc {
    /// Decode a Logical Screen Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        let width = u16::from_le_bytes([buf[0], buf[1]]);
        let height = u16::from_le_bytes([buf[2], buf[3]]);
        LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_flags(buf[4])
            .with_background_color_idx(buf[5])
            .with_pixel_aspect_ratio(buf[6])
    }
}

impl ImageDesc {
    /// Decode an Image Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        let left = u16::from_le_bytes([buf[1], buf[2]]);
        let top = u16::from_le_bytes([buf[3], buf[4]]);
        let width = u16::from_le_bytes([buf[5], buf[6]]);
        let height = u16::from_le_bytes([buf[7], buf[8]]);
        ImageDesc::default()
            .with_left(left)
            .with_top(top)
            .with_width(width)
            .with_height(height)
            .with_flags(buf[9])
    }
}

impl ImageData {
    /// Decode an Image Data block from a buffer
    fn from_buf(image_sz: usize, buf: &[u8]) -> Result<Self> {
        let min_code_size = buf[0];
        if (2..=8).contains(&min_code_size) {
            Ok(Self::new(image_sz, min_code_size))
        } else {
            Err(Error::InvalidCodeSize)
        }
    }
}

impl Block {
    /// Parse an extension block
    fn parse_extension(buf: &[u8]) -> Self {
        match ExtensionCode::from(buf[1]) {
            ExtensionCode::GraphicControl_ => GraphicControl::default().into(),
            code => Extension::new(code).into(),
        }
    }
}

impl GraphicControl {
    /// Parse a Graphic Control extension sub-block
    fn parse_buf(&mut self, buf: &[u8]) -> Result<()> {
        if buf.len() == 4 {
            self.set_flags(buf[0]);
            self.set_delay_time_cs(u16::from_le_bytes([buf[1], buf[2]]));
            self.set_transparent_color_idx(buf[3]);
            Ok(())
        } else {
            Err(Error::MalformedGraphicControlExtension)
        }
    }
}

/// An `Iterator` for [ImageBlocks] within a GIF file.
///
/// Build with Decoder.[into_frames].
///
/// [ImageBlocks]: block/struct.ImageBlocks.html
/// [into_frames]: ../struct.Decoder.html#method.into_frames
pub struct Frames<R: Read> {
    /// Block decoder
    blocks: Blocks<R>,
    /// Header block
    header: Option<Header>,
    /// Logical screen descriptor block
    logical_screen_desc: Option<LogicalScreenDesc>,
    /// Global color table block
    global_color_table: Option<GlobalColorTable>,
    /// Graphic control block of the current image
    graphic_control_ext: Option<GraphicControl>,
    /// Image descriptor of the current image
    image_desc: Option<ImageDesc>,
    /// Local color table of the current image
    local_color_table: Option<LocalColorTable>,
}

impl<R: Read> Iterator for Frames<R> {
    type Item = Result<ImageBlocks>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(block) = self.blocks.next() {
            match block.and_then(|b| self.handle_block(b)) {
                Ok(Some(f)) => return Some(Ok(f)),
                Ok(None) => (), // need more blocks
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl<R: Read> Frames<R> {
    /// Create a new frame iterator
    pub(crate) fn new(blocks: Blocks<R>) -> Self {
        Frames {
            blocks,
            header: None,
            logical_screen_desc: None,
            global_color_table: None,
            graphic_control_ext: None,
            image_desc: None,
            local_color_table: None,
        }
    }

    /// Read preamble blocks.  These are the blocks at the beginning of the
    /// file, before any image blocks.
    ///
    /// Returns `None` if the preamble was already taken.
    pub fn preamble(&mut self) -> Result<Option<Preamble>> {
        while !self.has_frame() {
            match self.blocks.next() {
                Some(block) => {
                    if let Some(_f) = self.handle_block(block?)? {
                        return Err(Error::InvalidBlockSequence);
                    }
                }
                None => break,
            }
        }
        match (self.header.take(), self.logical_screen_desc.take()) {
            (Some(header), Some(logical_screen_desc)) => Ok(Some(Preamble {
                header,
                logical_screen_desc,
                global_color_table: self.global_color_table.take(),
            })),
            _ => Ok(None),
        }
    }

    /// Check if any image blocks exist
    fn has_frame(&self) -> bool {
        self.graphic_control_ext.is_some()
            || self.image_desc.is_some()
            || self.local_color_table.is_some()
    }

    /// Handle one block
    fn handle_block(&mut self, block: Block) -> Result<Option<ImageBlocks>> {
        match block {
            Block::Header(b) => self.header = Some(b),
            Block::LogicalScreenDesc(b) => self.logical_screen_desc = Some(b),
            Block::GlobalColorTable(b) => self.global_color_table = Some(b),
            Block::GraphicControl(b) => {
                if self.has_frame() {
                    return Err(Error::InvalidBlockSequence);
                }
                self.graphic_control_ext = Some(b);
            }
            Block::Extension(b) => {
                debug!("skipped {:?}: {} bytes", b.code(), b.data_len());
            }
            Block::ImageDesc(b) => {
                if self.image_desc.is_some() {
                    return Err(Error::InvalidBlockSequence);
                }
                self.image_desc = Some(b);
            }
            Block::LocalColorTable(b) => self.local_color_table = Some(b),
            Block::ImageData(image_data) => {
                let graphic_control_ext = self.graphic_control_ext.take();
                let local_color_table = self.local_color_table.take();
                let image_desc = self
                    .image_desc
                    .take()
                    .ok_or(Error::InvalidBlockSequence)?;
                return Ok(Some(ImageBlocks::new(
                    graphic_control_ext,
                    image_desc,
                    local_color_table,
                    image_data,
                )));
            }
            Block::Trailer(_) => (),
        }
        Ok(None)
    }
}

/// Decode a complete GIF image.
///
/// Any error aborts the whole load.
pub(crate) fn decode_image<R: Read>(mut frames: Frames<R>) -> Result<GifImage> {
    let preamble = frames.preamble()?.ok_or(Error::MalformedHeader)?;
    let desc = &preamble.logical_screen_desc;
    let global_map = preamble.global_color_table.as_ref().map(|t| t.colors());
    // transparent index is not known yet
    let global = global_map.map(|map| ColorTable::from_color_map(Some(map), None));
    let bg_idx = desc.background_color_idx();
    let background = global
        .as_ref()
        .and_then(|t| t.entry(usize::from(bg_idx)));
    let mut image = GifImage::new()
        .with_canvas_size(desc.screen_width(), desc.screen_height());
    image.set_global_color_table(global.clone(), background);
    for blocks in frames {
        let blocks = blocks?;
        if let Some(frame) =
            decode_frame(&blocks, global_map, global.as_ref(), bg_idx)
        {
            image.add_frame(frame);
        }
    }
    Ok(image)
}

/// Decode one frame from its blocks.
///
/// Frames with zero width or height are skipped.
fn decode_frame(
    blocks: &ImageBlocks,
    global_map: Option<&[u8]>,
    global: Option<&ColorTable>,
    bg_idx: u8,
) -> Option<Frame> {
    let desc = &blocks.image_desc;
    if desc.image_sz() == 0 {
        warn!("skipped empty image: {}x{}", desc.width(), desc.height());
        return None;
    }
    let control = blocks.graphic_control_ext;
    let transparent = control.and_then(|c| c.transparent_color());
    let table = match (&blocks.local_color_table, transparent) {
        (Some(local), _) => {
            Some(ColorTable::from_color_map(Some(local.colors()), transparent))
        }
        // transparency applies to this frame only
        (None, Some(_)) => global_map
            .map(|map| ColorTable::from_color_map(Some(map), transparent)),
        (None, None) => global.cloned(),
    };
    let fill = match (transparent, global_map) {
        (Some(t), _) => t,
        (None, Some(_)) => bg_idx,
        (None, None) => 0,
    };
    let mut pixels = vec![fill; desc.image_sz()];
    let data = blocks.image_data.data();
    if desc.interlaced() {
        deinterlace(data, &mut pixels, usize::from(desc.width()));
    } else {
        let n = data.len().min(pixels.len());
        pixels[..n].copy_from_slice(&data[..n]);
    }
    let raster = Raster::with_u8_buffer(
        u32::from(desc.width()),
        u32::from(desc.height()),
        pixels,
    );
    let transparent_color = transparent.and_then(|t| {
        table.as_ref().and_then(|tbl| tbl.entry(usize::from(t)))
    });
    // no graphic control means no delay
    let delay = control.map_or(0, |c| c.delay_time_cs());
    Some(
        Frame::with_indexed(raster)
            .with_color_table(table)
            .with_offset(desc.left(), desc.top())
            .with_delay_time_cs(Some(delay))
            .with_transparent_color(transparent_color)
            .with_interlaced(desc.interlaced()),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::Decoder;
    use pix::rgb::SRgba8;

    const SIMPLE_1: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91, 0x00,
        0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
        0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
        0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
        0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75, 0xEC, 0x95, 0xFA, 0xA8,
        0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01, 0x00, 0x3B,
    ];

    const IMAGE_1: &[u8] = &[
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
        1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
        1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
        1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
        2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
        2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
        2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
    ];

    /// Offset of graphic control flags in SIMPLE_1
    const GC_FLAGS: usize = 28;

    /// Offset of transparent color index in SIMPLE_1
    const GC_TRANSPARENT: usize = 31;

    /// Offset of image descriptor flags in SIMPLE_1
    const DESC_FLAGS: usize = 42;

    fn pixels(frame: &Frame) -> &[u8] {
        frame.indexed_raster().unwrap().as_u8_slice()
    }

    #[test]
    fn simple_1_frames() -> Result<()> {
        let mut frames = Decoder::new(SIMPLE_1).into_frames();
        let preamble = frames.preamble()?.unwrap();
        assert_eq!(preamble.screen_width(), 10);
        assert_eq!(preamble.global_color_table.unwrap().len(), 4);
        let mut count = 0;
        for f in frames {
            assert_eq!(f?.image_data.data(), IMAGE_1);
            count += 1;
        }
        assert_eq!(count, 1);
        Ok(())
    }

    #[test]
    fn simple_1_image() -> Result<()> {
        let image = Decoder::new(SIMPLE_1).into_image()?;
        assert_eq!(image.canvas_size(), Some((10, 10)));
        assert_eq!(image.frame_count(), 1);
        let global = image.global_color_table().unwrap();
        assert_eq!(global.len(), 4);
        assert_eq!(global.entry(1), Some(SRgba8::new(0xFF, 0, 0, 0xFF)));
        assert_eq!(image.background_color(), Some(SRgba8::new(0xFF, 0xFF, 0xFF, 0xFF)));
        let frame = image.frame(0).unwrap();
        assert_eq!(pixels(frame), IMAGE_1);
        assert_eq!((frame.left(), frame.top()), (0, 0));
        assert_eq!(frame.delay_time_cs(), Some(0));
        assert_eq!(frame.transparent_color(), None);
        assert!(!frame.interlaced());
        assert_eq!(frame.color_table(), Some(global));
        Ok(())
    }

    #[test]
    fn transparent_index() -> Result<()> {
        let mut gif = SIMPLE_1.to_vec();
        gif[GC_FLAGS] = 0x01;
        gif[GC_TRANSPARENT] = 3;
        let image = Decoder::new(&gif[..]).into_image()?;
        let frame = image.frame(0).unwrap();
        assert_eq!(frame.transparent_color(), Some(SRgba8::new(0, 0, 0, 0)));
        let table = frame.color_table().unwrap();
        for i in 0..3 {
            assert_ne!(table.entry(i), Some(SRgba8::new(0, 0, 0, 0)));
        }
        assert_eq!(table.entry(0), Some(SRgba8::new(0xFF, 0xFF, 0xFF, 0xFF)));
        assert_eq!(table.entry(2), Some(SRgba8::new(0, 0, 0xFF, 0xFF)));
        assert_eq!(table.entry(3), Some(SRgba8::new(0, 0, 0, 0)));
        // global table is not affected
        let global = image.global_color_table().unwrap();
        assert_eq!(global.entry(3), Some(SRgba8::new(0, 0, 0, 0xFF)));
        Ok(())
    }

    #[test]
    fn interlaced_rows() -> Result<()> {
        let mut gif = SIMPLE_1.to_vec();
        gif[DESC_FLAGS] = 0x40;
        let image = Decoder::new(&gif[..]).into_image()?;
        let frame = image.frame(0).unwrap();
        assert!(frame.interlaced());
        let pix = pixels(frame);
        let order = [0, 8, 4, 2, 6, 1, 3, 5, 7, 9];
        for (line, row) in order.iter().enumerate() {
            assert_eq!(
                &pix[row * 10..(row + 1) * 10],
                &IMAGE_1[line * 10..(line + 1) * 10]
            );
        }
        Ok(())
    }

    #[test]
    fn skip_comment() -> Result<()> {
        let mut gif = SIMPLE_1.to_vec();
        let comment = [0x21, 0xFE, 0x03, b'a', b'b', b'c', 0x00];
        gif.splice(25..25, comment.iter().copied());
        let blocks: Vec<Block> =
            Decoder::new(&gif[..]).into_blocks().collect::<Result<_>>()?;
        assert!(blocks.iter().any(|b| matches!(b,
            Block::Extension(e) if e.code() == ExtensionCode::Comment_
                && e.data_len() == 3)));
        let image = Decoder::new(&gif[..]).into_image()?;
        assert_eq!(pixels(image.frame(0).unwrap()), IMAGE_1);
        Ok(())
    }

    #[test]
    fn bad_signature() {
        let mut gif = SIMPLE_1.to_vec();
        gif[0] = b'J';
        let err = Decoder::new(&gif[..]).into_image().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Open);
        let err = Decoder::new(&b""[..]).into_image().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Open);
        let mut gif = SIMPLE_1.to_vec();
        gif[5] = b'b';
        let err = Decoder::new(&gif[..]).into_image().unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(_)));
    }

    #[test]
    fn truncated() {
        let gif = &SIMPLE_1[..50];
        let err = Decoder::new(gif).into_image().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn too_large() {
        let err = Decoder::new(SIMPLE_1)
            .max_image_sz(Some(99))
            .into_image()
            .unwrap_err();
        assert!(matches!(err, Error::TooLargeImage));
    }

    #[test]
    fn missing_graphic_control() -> Result<()> {
        let mut gif = SIMPLE_1.to_vec();
        gif.drain(25..33);
        let mut image = Decoder::new(&gif[..]).into_image()?;
        let frame = image.frame(0).unwrap();
        assert_eq!(frame.delay_time_cs(), Some(0));
        assert_eq!(frame.transparent_color(), None);
        assert_eq!(pixels(frame), IMAGE_1);
        // a default delay must not replace the decoded one
        image.set_default_delay_time_cs(Some(50));
        let mut saved = vec![];
        image.save(&mut saved)?;
        let image = GifImage::load(&saved[..])?;
        assert_eq!(image.frame(0).unwrap().delay_time_cs(), Some(0));
        Ok(())
    }

    #[test]
    fn empty_image_skipped() -> Result<()> {
        let gif = &[
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00, 0x80,
            0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
            // zero width
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x02,
            0x01, 0x2C, 0x00,
            // 2x2
            0x2C, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00, 0x02,
            0x03, 0x0C, 0x10, 0x05, 0x00, 0x3B,
        ][..];
        let frames: Vec<ImageBlocks> =
            Decoder::new(gif).into_frames().collect::<Result<_>>()?;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].image_desc.image_sz(), 0);
        let image = Decoder::new(gif).into_image()?;
        assert_eq!(image.frame_count(), 1);
        let frame = image.frame(0).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 2));
        Ok(())
    }

    #[test]
    fn invalid_code_size() {
        for size in [0, 1, 9, 12] {
            let mut gif = SIMPLE_1.to_vec();
            gif[43] = size;
            let err = Decoder::new(&gif[..]).into_image().unwrap_err();
            assert!(matches!(err, Error::InvalidCodeSize));
            assert_eq!(err.kind(), ErrorKind::Parse);
        }
    }

    /// Reader which fails after its data runs out
    struct FailingReader {
        data: &'static [u8],
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "reset"));
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_error_at_start() {
        let reader = FailingReader { data: &[] };
        let err = Decoder::new_unbuffered(reader).into_image().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Open);
    }

    #[test]
    fn read_error_in_body() {
        let reader = FailingReader {
            data: &SIMPLE_1[..50],
        };
        let err = Decoder::new_unbuffered(reader).into_image().unwrap_err();
        assert!(matches!(err, Error::Read(_)));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn block_sequence() {
        // image data sub-blocks with a missing terminator, then trailer
        let mut gif = SIMPLE_1.to_vec();
        gif.remove(gif.len() - 2);
        let err = Decoder::new(&gif[..]).into_image().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
