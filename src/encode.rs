// encode.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! GIF file encoding
use crate::block::*;
use crate::color_table::{ColorMap, ColorTable};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::image::GifImage;
use crate::interlace::interlace;
use crate::lzw::Compressor;
use std::io::{self, Write};

/// Maximum length of a sub-block
const SUB_BLOCK_SZ: usize = 0xFF;

/// Encoder for writing [Block]s into a GIF file.
///
/// Build with Encoder.[into_block_enc].
///
/// [Block]: block/enum.Block.html
/// [into_block_enc]: ../struct.Encoder.html#method.into_block_enc
pub struct BlockEnc<W: Write> {
    /// Writer for blocks
    writer: W,
}

impl<W: Write> BlockEnc<W> {
    /// Create a new block encoder
    pub(crate) fn new(writer: W) -> Self {
        BlockEnc { writer }
    }

    /// Encode one block
    pub fn encode<B>(&mut self, block: B) -> Result<()>
    where
        B: Into<Block>,
    {
        use crate::block::Block::*;
        let block = block.into();
        let w = &mut self.writer;
        let res = match &block {
            Header(b) => b.format(w),
            LogicalScreenDesc(b) => b.format(w),
            GlobalColorTable(b) => b.format(w),
            GraphicControl(b) => b.format(w),
            Extension(b) => b.format(w),
            ImageDesc(b) => b.format(w),
            LocalColorTable(b) => b.format(w),
            ImageData(b) => b.format(w),
            Trailer(b) => b.format(w),
        };
        res.map_err(Error::Write)
    }

    /// Flush the writer
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Error::Write)
    }
}

impl Header {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: {:?}", self);
        w.write_all(b"GIF")?;
        w.write_all(&self.version())
    }
}

impl LogicalScreenDesc {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: {:?}", self);
        let mut buf = Vec::with_capacity(BlockCode::LogicalScreenDesc_.size());
        buf.extend_from_slice(&self.screen_width().to_le_bytes());
        buf.extend_from_slice(&self.screen_height().to_le_bytes());
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
        w.write_all(&buf)
    }
}

impl GlobalColorTable {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: GlobalColorTable {} entries", self.len());
        w.write_all(self.colors())
    }
}

impl GraphicControl {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: {:?}", self);
        let mut buf = Vec::with_capacity(8);
        buf.extend_from_slice(BlockCode::Extension_.signature());
        buf.push(ExtensionCode::GraphicControl_.into());
        buf.push(4); // block size
        buf.push(self.flags());
        buf.extend_from_slice(&self.delay_time_cs().to_le_bytes());
        buf.push(self.transparent_color_idx());
        buf.push(0); // block size
        w.write_all(&buf)
    }
}

impl Extension {
    /// Skipped extensions have no data; only an empty block is written
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: {:?}", self);
        let code: u8 = self.code().into();
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[code, 0])
    }
}

impl ImageDesc {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: {:?}", self);
        let mut buf = Vec::with_capacity(BlockCode::ImageDesc_.size());
        buf.extend_from_slice(BlockCode::ImageDesc_.signature());
        buf.extend_from_slice(&self.left().to_le_bytes());
        buf.extend_from_slice(&self.top().to_le_bytes());
        buf.extend_from_slice(&self.width().to_le_bytes());
        buf.extend_from_slice(&self.height().to_le_bytes());
        buf.push(self.flags());
        w.write_all(&buf)
    }
}

impl LocalColorTable {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: LocalColorTable {} entries", self.len());
        w.write_all(self.colors())
    }
}

impl ImageData {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let min_code_size = self.min_code_size();
        let mut buf = Vec::with_capacity(self.data().len());
        Compressor::new(min_code_size).compress(self.data(), &mut buf);
        debug!(
            "encode: ImageData {} pixels, {} compressed",
            self.data().len(),
            buf.len()
        );
        w.write_all(&[min_code_size])?;
        for sub_block in buf.chunks(SUB_BLOCK_SZ) {
            // chunks are never longer than 255
            w.write_all(&[sub_block.len() as u8])?;
            w.write_all(sub_block)?;
        }
        w.write_all(&[0])
    }
}

impl Trailer {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        debug!("encode: Trailer");
        w.write_all(BlockCode::Trailer_.signature())
    }
}

/// Encoder for writing [ImageBlocks] into a GIF file.
///
/// Build with Encoder.[into_frame_enc].
///
/// [ImageBlocks]: block/struct.ImageBlocks.html
/// [into_frame_enc]: ../struct.Encoder.html#method.into_frame_enc
pub struct FrameEnc<W: Write> {
    /// Block encoder
    block_enc: BlockEnc<W>,
    /// Has preamble been encoded?
    has_preamble: bool,
    /// Has trailer been encoded?
    has_trailer: bool,
}

impl<W: Write> FrameEnc<W> {
    /// Create a new frame encoder
    pub(crate) fn new(block_enc: BlockEnc<W>) -> Self {
        FrameEnc {
            block_enc,
            has_preamble: false,
            has_trailer: false,
        }
    }

    /// Encode the GIF preamble blocks.
    ///
    /// Must be called only once, before [encode_frame].
    ///
    /// [encode_frame]: struct.FrameEnc.html#method.encode_frame
    pub fn encode_preamble(&mut self, preamble: Preamble) -> Result<()> {
        if self.has_preamble {
            return Err(Error::InvalidBlockSequence);
        }
        self.block_enc.encode(preamble.header)?;
        self.block_enc.encode(preamble.logical_screen_desc)?;
        if let Some(tbl) = preamble.global_color_table {
            self.block_enc.encode(tbl)?;
        }
        self.has_preamble = true;
        Ok(())
    }

    /// Encode the blocks of one frame.
    pub fn encode_frame(&mut self, frame: ImageBlocks) -> Result<()> {
        if !self.has_preamble || self.has_trailer {
            return Err(Error::InvalidBlockSequence);
        }
        if let Some(ctrl) = frame.graphic_control_ext {
            self.block_enc.encode(ctrl)?;
        }
        self.block_enc.encode(frame.image_desc)?;
        if let Some(tbl) = frame.local_color_table {
            self.block_enc.encode(tbl)?;
        }
        self.block_enc.encode(frame.image_data)
    }

    /// Encode the trailer block and flush the writer.
    pub fn encode_trailer(&mut self) -> Result<()> {
        if !self.has_preamble || self.has_trailer {
            return Err(Error::InvalidBlockSequence);
        }
        self.block_enc.encode(Trailer::default())?;
        self.has_trailer = true;
        self.block_enc.flush()
    }
}

/// Encode a complete GIF image.
///
/// On error, the writer is left with a truncated stream.
pub(crate) fn encode_image<W: Write>(
    image: &GifImage,
    enc: &mut FrameEnc<W>,
) -> Result<()> {
    let (width, height) = image.canvas_size().ok_or(Error::CanvasUnresolved)?;
    let width =
        u16::try_from(width).map_err(|_| Error::InvalidRasterDimensions)?;
    let height =
        u16::try_from(height).map_err(|_| Error::InvalidRasterDimensions)?;
    let global = image.global_color_table();
    let global_map = global.and_then(ColorTable::to_color_map);
    let mut logical_screen_desc = LogicalScreenDesc::default()
        .with_screen_width(width)
        .with_screen_height(height)
        .with_color_resolution(8);
    let mut global_color_table = None;
    if let (Some(tbl), Some(map)) = (global, &global_map) {
        let bg_idx = image
            .background_color()
            .and_then(|clr| tbl.find(clr))
            .and_then(|i| u8::try_from(i).ok())
            .unwrap_or(0);
        logical_screen_desc = logical_screen_desc
            .with_color_table_config(&map.config())
            .with_background_color_idx(bg_idx);
        global_color_table =
            Some(GlobalColorTable::with_colors(&map.wire_colors()));
    }
    enc.encode_preamble(Preamble {
        header: Header::default(),
        logical_screen_desc,
        global_color_table,
    })?;
    for frame in image.frames() {
        enc.encode_frame(frame_blocks(image, global_map.as_ref(), frame)?)?;
    }
    enc.encode_trailer()
}

/// Build the blocks for one frame
fn frame_blocks(
    image: &GifImage,
    global_map: Option<&ColorMap>,
    frame: &Frame,
) -> Result<ImageBlocks> {
    let global = image.global_color_table();
    let mut local = frame
        .color_table()
        .filter(|tbl| !global.map_or(false, |g| tbl.same_colors(g)));
    let web_safe;
    let table = match frame.color_table().or(global) {
        Some(tbl) => Some(tbl),
        None if frame.indexed_raster().is_none() => {
            web_safe = ColorTable::web_safe();
            local = Some(&web_safe);
            Some(&web_safe)
        }
        None => None,
    };
    let local_map = local.and_then(ColorTable::to_color_map);
    let width = u16::try_from(frame.width())?;
    let height = u16::try_from(frame.height())?;
    let mut image_desc = ImageDesc::default()
        .with_left(frame.left())
        .with_top(frame.top())
        .with_width(width)
        .with_height(height)
        .with_interlaced(frame.interlaced());
    let mut local_color_table = None;
    if let Some(map) = &local_map {
        image_desc = image_desc.with_color_table_config(&map.config());
        local_color_table = Some(LocalColorTable::with_colors(&map.wire_colors()));
    }
    let mut indices = frame.indices(table.unwrap_or(&ColorTable::default()));
    if frame.interlaced() {
        indices = interlace(&indices, usize::from(width));
    }
    let table_len = local_map.as_ref().or(global_map).map_or(0, |m| m.config().len());
    let image_data = ImageData::with_indices(&indices, table_len);
    let transparent = frame
        .transparent_color()
        .or_else(|| image.default_transparent_color())
        .and_then(|clr| table.and_then(|tbl| tbl.find(clr)))
        .and_then(|i| u8::try_from(i).ok());
    let delay = frame
        .delay_time_cs()
        .or_else(|| image.default_delay_time_cs())
        .unwrap_or(0);
    let mut control = GraphicControl::default();
    control.set_disposal_method(DisposalMethod::NoAction);
    control.set_user_input(false);
    control.set_delay_time_cs(delay);
    control.set_transparent_color(transparent);
    Ok(ImageBlocks::new(
        Some(control),
        image_desc,
        local_color_table,
        image_data,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{Decoder, Encoder};
    use pix::gray::Gray8;
    use pix::rgb::SRgba8;
    use pix::Raster;

    fn raster(width: u32, height: u32, pixels: &[u8]) -> Raster<Gray8> {
        Raster::with_u8_buffer(width, height, pixels.to_vec())
    }

    fn two_colors() -> ColorTable {
        ColorTable::with_rgb(&[[0, 0, 0], [0xFF, 0xFF, 0xFF]])
    }

    fn encode(image: &GifImage) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        Encoder::new(&mut bytes).encode_image(image)?;
        Ok(bytes)
    }

    fn blocks(bytes: &[u8]) -> Vec<Block> {
        Decoder::new(bytes)
            .into_blocks()
            .collect::<Result<_>>()
            .unwrap()
    }

    fn controls(bytes: &[u8]) -> Vec<GraphicControl> {
        blocks(bytes)
            .into_iter()
            .filter_map(|b| match b {
                Block::GraphicControl(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sub_blocks() -> Result<()> {
        let mut bytes = vec![];
        let mut enc = Encoder::new(&mut bytes).into_block_enc();
        let data: Vec<u8> = (0..2000).map(|i| (i * 7 % 251) as u8).collect();
        enc.encode(ImageData::with_indices(&data, 256))?;
        enc.flush()?;
        drop(enc);
        assert_eq!(bytes[0], 8);
        let mut pos = 1;
        while bytes[pos] != 0 {
            assert!(pos + usize::from(bytes[pos]) < bytes.len());
            pos += usize::from(bytes[pos]) + 1;
        }
        assert_eq!(pos, bytes.len() - 1);
        Ok(())
    }

    #[test]
    fn screen_desc() -> Result<()> {
        let mut image = GifImage::new().with_canvas_size(300, 200);
        let table = ColorTable::with_rgb(&[[1, 1, 1], [2, 2, 2], [3, 3, 3]]);
        image.set_global_color_table(
            Some(table),
            Some(SRgba8::new(3, 3, 3, 0xFF)),
        );
        let bytes = encode(&image)?;
        assert_eq!(&bytes[..6], b"GIF89a");
        assert_eq!(&bytes[6..13], &[44, 1, 200, 0, 0b1111_0001, 2, 0]);
        assert_eq!(&bytes[13..25], &[1, 1, 1, 2, 2, 2, 3, 3, 3, 0, 0, 0]);
        assert_eq!(&bytes[25..], b";");
        Ok(())
    }

    #[test]
    fn canvas_unresolved() {
        let image = GifImage::new();
        let err = encode(&image).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CanvasUnresolved);
    }

    #[test]
    fn canvas_too_large() {
        let frame = Frame::with_indexed(Raster::with_clear(10, 10))
            .with_offset(u16::MAX, 0);
        let mut image = GifImage::new();
        image.add_frame(frame);
        let err = encode(&image).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[test]
    fn default_delay() -> Result<()> {
        let mut image = GifImage::new();
        image.set_global_color_table(Some(two_colors()), None);
        image.set_default_delay_time_cs(Some(50));
        image.add_frame(Frame::with_indexed(Raster::with_clear(2, 2)));
        image.add_frame(
            Frame::with_indexed(Raster::with_clear(2, 2))
                .with_delay_time_cs(Some(20)),
        );
        let ctrl = controls(&encode(&image)?);
        assert_eq!(ctrl.len(), 2);
        assert_eq!(ctrl[0].delay_time_cs(), 50);
        assert_eq!(ctrl[1].delay_time_cs(), 20);
        for c in ctrl {
            assert_eq!(c.disposal_method(), DisposalMethod::NoAction);
            assert!(!c.user_input());
            assert_eq!(c.transparent_color(), None);
        }
        Ok(())
    }

    #[test]
    fn no_default_delay() -> Result<()> {
        let mut image = GifImage::new();
        image.add_frame(Frame::with_indexed(Raster::with_clear(2, 2)));
        let ctrl = controls(&encode(&image)?);
        assert_eq!(ctrl[0].delay_time_cs(), 0);
        Ok(())
    }

    #[test]
    fn local_color_table() -> Result<()> {
        let mut image = GifImage::new();
        image.set_global_color_table(Some(two_colors()), None);
        // same colors as global: no local table
        image.add_frame(
            Frame::with_indexed(Raster::with_clear(2, 2))
                .with_color_table(Some(two_colors())),
        );
        let other = ColorTable::with_rgb(&[[0xFF, 0, 0], [0, 0xFF, 0], [0, 0, 0xFF]]);
        image.add_frame(
            Frame::with_indexed(raster(2, 2, &[0, 1, 2, 1]))
                .with_color_table(Some(other)),
        );
        let bytes = encode(&image)?;
        let local: Vec<LocalColorTable> = blocks(&bytes)
            .into_iter()
            .filter_map(|b| match b {
                Block::LocalColorTable(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].len(), 4);
        assert_eq!(&local[0].colors()[..9], &[0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF]);
        Ok(())
    }

    #[test]
    fn transparent_index() -> Result<()> {
        let mut image = GifImage::new();
        let table = ColorTable::with_rgb(&[[0, 0, 0], [9, 9, 9], [0xFF, 0, 0]]);
        image.set_global_color_table(Some(table), None);
        image.set_default_transparent_color(Some(SRgba8::new(9, 9, 9, 0)));
        image.add_frame(Frame::with_indexed(Raster::with_clear(2, 2)));
        image.add_frame(
            Frame::with_indexed(Raster::with_clear(2, 2))
                .with_transparent_color(Some(SRgba8::new(0xFF, 0, 0, 0xFF))),
        );
        image.add_frame(
            Frame::with_indexed(Raster::with_clear(2, 2))
                .with_transparent_color(Some(SRgba8::new(1, 2, 3, 0xFF))),
        );
        let ctrl = controls(&encode(&image)?);
        assert_eq!(ctrl[0].transparent_color(), Some(1));
        assert_eq!(ctrl[1].transparent_color(), Some(2));
        // not found in the table
        assert_eq!(ctrl[2].transparent_color(), None);
        Ok(())
    }

    #[test]
    fn true_color_web_safe() -> Result<()> {
        let red = SRgba8::new(0xFF, 0, 0, 0xFF);
        let black = SRgba8::new(0, 0, 0, 0xFF);
        let frame = Frame::with_true_color(Raster::with_pixels(
            2,
            1,
            vec![red, black],
        ));
        let mut image = GifImage::new();
        image.add_frame(frame);
        let decoded = Decoder::new(&encode(&image)?[..]).into_image()?;
        let frame = decoded.frame(0).unwrap();
        let table = frame.color_table().unwrap();
        assert_eq!(table.len(), 256);
        let pix = frame.indexed_raster().unwrap().as_u8_slice();
        assert_eq!(table.entry(usize::from(pix[0])), Some(red));
        assert_eq!(table.entry(usize::from(pix[1])), Some(black));
        Ok(())
    }

    #[test]
    fn frame_sequence() {
        let mut bytes = vec![];
        let mut enc = Encoder::new(&mut bytes).into_frame_enc();
        assert!(enc.encode_trailer().is_err());
        enc.encode_preamble(Preamble::default()).unwrap();
        assert!(enc.encode_preamble(Preamble::default()).is_err());
        enc.encode_trailer().unwrap();
        assert!(enc.encode_trailer().is_err());
    }
}
