// private.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Decoder and encoder builders
use crate::decode::{self, Blocks, Frames};
use crate::encode::{self, BlockEnc, FrameEnc};
use crate::error::Result;
use crate::image::GifImage;
use std::io::{BufReader, BufWriter, Read, Write};

/// Default limit on decoded image size, in bytes
const MAX_IMAGE_SZ: usize = 1 << 25;

/// Builder for reading GIF data.
///
/// Decoding can stop at any of three levels:
///
/// | method          | yields                                   |
/// |-----------------|------------------------------------------|
/// | [into_image]    | one [GifImage] with every frame resolved |
/// | [into_frames]   | [ImageBlocks], grouped per frame         |
/// | [into_blocks]   | raw [Block]s, in stream order            |
///
/// ## Example: count frames and pixels
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// use gifimage::Decoder;
///
/// let mut pixels = 0;
/// for frame in Decoder::new(gif).into_frames() {
///     pixels += frame?.image_desc.image_sz();
/// }
/// assert_eq!(pixels, 4);
///
/// let image = Decoder::new(gif).into_image()?;
/// assert_eq!(image.canvas_size(), Some((2, 2)));
/// assert_eq!(image.frame_count(), 1);
/// # Ok(())
/// # }
/// ```
///
/// [Block]: block/enum.Block.html
/// [GifImage]: struct.GifImage.html
/// [ImageBlocks]: block/struct.ImageBlocks.html
/// [into_blocks]: struct.Decoder.html#method.into_blocks
/// [into_frames]: struct.Decoder.html#method.into_frames
/// [into_image]: struct.Decoder.html#method.into_image
pub struct Decoder<R: Read> {
    /// Source of GIF data
    reader: R,
    /// Largest image (width times height) accepted
    max_image_sz: Option<usize>,
}

impl<R: Read> Decoder<BufReader<R>> {
    /// Wrap `reader` in a `BufReader` and decode from it.
    pub fn new(reader: R) -> Self {
        Self::new_unbuffered(BufReader::new(reader))
    }
}

impl<R: Read> Decoder<R> {
    /// Decode directly from `reader`, which should do its own buffering.
    pub fn new_unbuffered(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(MAX_IMAGE_SZ),
        }
    }

    /// Limit the pixel count of any one image descriptor.
    ///
    /// Larger images fail with `TooLargeImage`; `None` removes the limit.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Iterate over raw blocks.
    pub fn into_blocks(self) -> Blocks<R> {
        Blocks::new(self.reader, self.max_image_sz)
    }

    /// Iterate over frames, after reading the preamble.
    pub fn into_frames(self) -> Frames<R> {
        Frames::new(self.into_blocks())
    }

    /// Read the whole stream into a [GifImage](struct.GifImage.html).
    pub fn into_image(self) -> Result<GifImage> {
        decode::decode_image(self.into_frames())
    }
}

/// Builder for writing GIF data.
///
/// Like [Decoder](struct.Decoder.html), it works at three levels:
/// [encode_image] writes a whole [GifImage], [into_frame_enc] accepts
/// [ImageBlocks] one frame at a time, and [into_block_enc] writes
/// individual [Block]s with no sequencing checks.
///
/// ## Example: a two-color checkerboard
/// ```
/// use gifimage::{ColorTable, Encoder, Frame, GifImage};
/// use pix::{gray::Gray8, Raster};
///
/// # fn main() -> Result<(), gifimage::Error> {
/// let mut raster = Raster::<Gray8>::with_clear(8, 8);
/// for y in 0..8 {
///     for x in 0..8 {
///         if (x + y) % 2 == 1 {
///             *raster.pixel_mut(x, y) = Gray8::new(1);
///         }
///     }
/// }
/// let mut image = GifImage::new();
/// let table = ColorTable::with_rgb(&[[0, 0, 0], [0xFF, 0xFF, 0xFF]]);
/// image.set_global_color_table(Some(table), None);
/// image.add_frame(Frame::with_indexed(raster));
///
/// let mut gif = Vec::new();
/// Encoder::new(&mut gif).encode_image(&image)?;
/// assert_eq!(&gif[..6], b"GIF89a");
/// # Ok(())
/// # }
/// ```
///
/// [Block]: block/enum.Block.html
/// [GifImage]: struct.GifImage.html
/// [ImageBlocks]: block/struct.ImageBlocks.html
/// [encode_image]: struct.Encoder.html#method.encode_image
/// [into_block_enc]: struct.Encoder.html#method.into_block_enc
/// [into_frame_enc]: struct.Encoder.html#method.into_frame_enc
pub struct Encoder<W: Write> {
    /// Destination for GIF data
    writer: W,
}

impl<W: Write> Encoder<BufWriter<W>> {
    /// Wrap `writer` in a `BufWriter` and encode to it.
    pub fn new(writer: W) -> Self {
        Self::new_unbuffered(BufWriter::new(writer))
    }
}

impl<W: Write> Encoder<W> {
    /// Encode directly to `writer`.
    pub fn new_unbuffered(writer: W) -> Self {
        Encoder { writer }
    }

    /// Write individual blocks.
    pub fn into_block_enc(self) -> BlockEnc<W> {
        BlockEnc::new(self.writer)
    }

    /// Write a preamble, then frames, then the trailer.
    pub fn into_frame_enc(self) -> FrameEnc<W> {
        FrameEnc::new(self.into_block_enc())
    }

    /// Write `image` as a complete GIF stream, then flush.
    pub fn encode_image(self, image: &GifImage) -> Result<()> {
        let mut enc = self.into_frame_enc();
        encode::encode_image(image, &mut enc)
    }
}
