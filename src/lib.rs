// lib.rs      gifimage crate.
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Multi-frame GIF images, with a GIF87a/89a decoder and encoder.
//!
//! A [GifImage] holds a canvas size, an optional global [ColorTable] and a
//! sequence of [Frame]s.  It can be loaded from and saved to any reader or
//! writer.  Lower-level access to the wire format is available through
//! [Decoder] and [Encoder].
//!
//! [ColorTable]: struct.ColorTable.html
//! [Decoder]: struct.Decoder.html
//! [Encoder]: struct.Encoder.html
//! [Frame]: struct.Frame.html
//! [GifImage]: struct.GifImage.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod canvas;
mod color_table;
pub mod decode;
pub mod encode;
mod error;
mod frame;
mod image;
mod interlace;
mod lzw;
mod private;

pub use crate::canvas::canvas_size;
pub use crate::color_table::{ColorMap, ColorTable};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::frame::{Frame, FrameRaster};
pub use crate::image::GifImage;
pub use crate::private::{Decoder, Encoder};
