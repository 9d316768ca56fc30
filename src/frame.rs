// frame.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Frames of a GIF image
use crate::color_table::{rgb, ColorTable};
use pix::gray::Gray8;
use pix::rgb::SRgba8;
use pix::Raster;
use std::collections::HashMap;
use std::fmt;

/// Raster of a frame
pub enum FrameRaster {
    /// Indexed color raster (one palette index per pixel)
    Indexed(Raster<Gray8>),
    /// True color raster, quantized when encoded
    TrueColor(Raster<SRgba8>),
}

impl Clone for FrameRaster {
    fn clone(&self) -> Self {
        match self {
            FrameRaster::Indexed(r) => {
                FrameRaster::Indexed(Raster::with_raster(r))
            }
            FrameRaster::TrueColor(r) => {
                FrameRaster::TrueColor(Raster::with_raster(r))
            }
        }
    }
}

impl FrameRaster {
    /// Get the raster width
    pub fn width(&self) -> u32 {
        match self {
            FrameRaster::Indexed(r) => r.width(),
            FrameRaster::TrueColor(r) => r.width(),
        }
    }

    /// Get the raster height
    pub fn height(&self) -> u32 {
        match self {
            FrameRaster::Indexed(r) => r.height(),
            FrameRaster::TrueColor(r) => r.height(),
        }
    }
}

/// One frame of a GIF image.
///
/// A frame is placed on the canvas at its offset.  When it has no color
/// table of its own, the image's global color table applies.
#[derive(Clone)]
pub struct Frame {
    /// Raster of the frame
    raster: FrameRaster,
    /// Local color table
    color_table: Option<ColorTable>,
    /// Left offset on canvas
    left: u16,
    /// Top offset on canvas
    top: u16,
    /// Delay time in centiseconds (`None` uses the image default)
    delay_time_cs: Option<u16>,
    /// Transparent color
    transparent_color: Option<SRgba8>,
    /// Interlaced flag
    interlaced: bool,
}

impl fmt::Debug for Frame {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.raster {
            FrameRaster::Indexed(_) => "indexed",
            FrameRaster::TrueColor(_) => "true color",
        };
        fmt.debug_struct("Frame")
            .field("raster", &kind)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("colors", &self.color_table.as_ref().map(|t| t.len()))
            .field("left", &self.left)
            .field("top", &self.top)
            .field("delay_time_cs", &self.delay_time_cs)
            .field("transparent_color", &self.transparent_color)
            .field("interlaced", &self.interlaced)
            .finish()
    }
}

impl Frame {
    /// Create a frame with a raster
    fn new(raster: FrameRaster) -> Self {
        Frame {
            raster,
            color_table: None,
            left: 0,
            top: 0,
            delay_time_cs: None,
            transparent_color: None,
            interlaced: false,
        }
    }

    /// Create a frame with an indexed raster.
    pub fn with_indexed(raster: Raster<Gray8>) -> Self {
        Self::new(FrameRaster::Indexed(raster))
    }

    /// Create a frame with a true color raster.
    ///
    /// The raster is quantized to the applicable color table when encoded.
    pub fn with_true_color(raster: Raster<SRgba8>) -> Self {
        Self::new(FrameRaster::TrueColor(raster))
    }

    /// Adjust the local color table.
    pub fn with_color_table(mut self, table: Option<ColorTable>) -> Self {
        self.color_table = table.filter(|t| !t.is_empty());
        self
    }

    /// Adjust the offset on the canvas.
    pub fn with_offset(mut self, left: u16, top: u16) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Adjust the delay time.
    pub fn with_delay_time_cs(mut self, delay: Option<u16>) -> Self {
        self.delay_time_cs = delay;
        self
    }

    /// Adjust the transparent color.
    pub fn with_transparent_color(mut self, clr: Option<SRgba8>) -> Self {
        self.transparent_color = clr;
        self
    }

    /// Adjust the interlaced flag.
    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    /// Get the raster
    pub fn raster(&self) -> &FrameRaster {
        &self.raster
    }

    /// Get the indexed raster, if the frame is not true color
    pub fn indexed_raster(&self) -> Option<&Raster<Gray8>> {
        match &self.raster {
            FrameRaster::Indexed(r) => Some(r),
            FrameRaster::TrueColor(_) => None,
        }
    }

    /// Get the local color table
    pub fn color_table(&self) -> Option<&ColorTable> {
        self.color_table.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn left(&self) -> u16 {
        self.left
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> Option<u16> {
        self.delay_time_cs
    }

    /// Get the transparent color
    pub fn transparent_color(&self) -> Option<SRgba8> {
        self.transparent_color
    }

    pub fn interlaced(&self) -> bool {
        self.interlaced
    }

    /// Get the lower-right corner on the canvas
    pub(crate) fn extent(&self) -> (u32, u32) {
        (
            u32::from(self.left) + self.width(),
            u32::from(self.top) + self.height(),
        )
    }

    /// Get the color indices of all pixels, quantizing a true color raster
    /// to a color table.
    pub(crate) fn indices(&self, table: &ColorTable) -> Vec<u8> {
        match &self.raster {
            FrameRaster::Indexed(r) => r.as_u8_slice().to_vec(),
            FrameRaster::TrueColor(r) => quantize(r, table),
        }
    }
}

/// Map each pixel of a true color raster to the nearest table entry
fn quantize(raster: &Raster<SRgba8>, table: &ColorTable) -> Vec<u8> {
    let mut cache = HashMap::new();
    raster
        .pixels()
        .iter()
        .map(|p| {
            *cache.entry(rgb(*p)).or_insert_with(|| {
                table.nearest(*p).unwrap_or_default() as u8
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder() {
        let frame = Frame::with_indexed(Raster::with_clear(4, 3))
            .with_offset(2, 5)
            .with_delay_time_cs(Some(20))
            .with_interlaced(true);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.extent(), (6, 8));
        assert_eq!(frame.delay_time_cs(), Some(20));
        assert!(frame.interlaced());
        assert!(frame.color_table().is_none());
        assert_eq!(frame.transparent_color(), None);
    }

    #[test]
    fn empty_table_ignored() {
        let frame = Frame::with_indexed(Raster::with_clear(1, 1))
            .with_color_table(Some(ColorTable::new()));
        assert!(frame.color_table().is_none());
    }

    #[test]
    fn quantize_true_color() {
        let red = SRgba8::new(0xFF, 0, 0, 0xFF);
        let blue = SRgba8::new(0, 0, 0xF0, 0xFF);
        let raster = Raster::with_pixels(2, 2, vec![red, blue, blue, red]);
        let table = ColorTable::with_rgb(&[[0, 0, 0], [0, 0, 0xFF], [0xFF, 0, 0]]);
        let frame = Frame::with_true_color(raster);
        assert!(frame.indexed_raster().is_none());
        assert_eq!(frame.indices(&table), vec![2, 1, 1, 2]);
    }

    #[test]
    fn clone_indexed() {
        let mut raster = Raster::with_clear(2, 1);
        *raster.pixel_mut(1, 0) = Gray8::new(7);
        let frame = Frame::with_indexed(raster);
        let copy = frame.clone();
        assert_eq!(copy.indices(&ColorTable::new()), vec![0, 7]);
    }
}
