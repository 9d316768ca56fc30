// image.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Multi-frame GIF image container
use crate::canvas::canvas_size;
use crate::color_table::ColorTable;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::private::{Decoder, Encoder};
use pix::rgb::SRgba8;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// In-memory GIF image: a canvas with a sequence of frames.
///
/// Frames are stored in display order.  Options set on the image (global
/// color table, default delay and default transparent color) apply to
/// every frame which does not override them.
///
/// ## Example
/// ```
/// use gifimage::{ColorTable, Frame, GifImage};
/// use pix::Raster;
///
/// let mut image = GifImage::new().with_canvas_size(64, 64);
/// let table = ColorTable::with_rgb(&[[0, 0, 0], [0xFF, 0xFF, 0xFF]]);
/// image.set_global_color_table(Some(table), None);
/// image.set_default_delay_time_cs(Some(10));
/// image.add_frame(Frame::with_indexed(Raster::with_clear(64, 64)));
/// assert_eq!(image.frame_count(), 1);
/// assert_eq!(image.canvas_size(), Some((64, 64)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct GifImage {
    /// Explicit canvas size
    canvas_size: Option<(u16, u16)>,
    /// Global color table
    global_color_table: Option<ColorTable>,
    /// Background color (from global color table)
    background_color: Option<SRgba8>,
    /// Delay for frames without their own
    default_delay_time_cs: Option<u16>,
    /// Transparent color for frames without their own
    default_transparent_color: Option<SRgba8>,
    /// All frames
    frames: Vec<Frame>,
}

impl GifImage {
    /// Create a new, empty image
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit canvas size.
    ///
    /// If either dimension is zero, the size is inferred from the frames.
    pub fn with_canvas_size(mut self, width: u16, height: u16) -> Self {
        self.canvas_size = Some((width, height));
        self
    }

    /// Get the canvas size, explicit or inferred from frames
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        canvas_size(self.canvas_size, &self.frames)
    }

    /// Set the global color table and background color
    pub fn set_global_color_table(
        &mut self,
        table: Option<ColorTable>,
        background: Option<SRgba8>,
    ) {
        self.global_color_table = table.filter(|t| !t.is_empty());
        self.background_color = background;
    }

    /// Get the global color table
    pub fn global_color_table(&self) -> Option<&ColorTable> {
        self.global_color_table.as_ref()
    }

    /// Get the background color
    pub fn background_color(&self) -> Option<SRgba8> {
        self.background_color
    }

    /// Set the delay (in centiseconds) of frames without their own delay
    pub fn set_default_delay_time_cs(&mut self, delay: Option<u16>) {
        self.default_delay_time_cs = delay;
    }

    pub fn default_delay_time_cs(&self) -> Option<u16> {
        self.default_delay_time_cs
    }

    /// Set the transparent color of frames without their own
    pub fn set_default_transparent_color(&mut self, clr: Option<SRgba8>) {
        self.default_transparent_color = clr;
    }

    pub fn default_transparent_color(&self) -> Option<SRgba8> {
        self.default_transparent_color
    }

    /// Append a frame
    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Get the number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Get all frames
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Get one frame
    pub fn frame(&self, i: usize) -> Option<&Frame> {
        self.frames.get(i)
    }

    /// Load an image from a reader.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Decoder::new(reader).into_image()
    }

    /// Save the image to a writer.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        Encoder::new(writer).encode_image(self)
    }

    /// Open and load an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(File::open(path)?)
    }

    /// Create (or truncate) a file and save the image into it.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(File::create(path).map_err(Error::Write)?)
    }
}
