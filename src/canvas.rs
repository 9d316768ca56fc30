// canvas.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Logical canvas sizing
use crate::frame::Frame;

/// Resolve the canvas size.
///
/// An explicit size is used when both dimensions are non-zero.  Otherwise,
/// the size is the bounding box of all frames (offset plus raster size).
/// With no explicit size and no frames, the size is unresolved (`None`).
pub fn canvas_size(
    explicit: Option<(u16, u16)>,
    frames: &[Frame],
) -> Option<(u32, u32)> {
    match explicit {
        Some((w, h)) if w > 0 && h > 0 => Some((w.into(), h.into())),
        _ => frames.iter().map(Frame::extent).reduce(|a, b| {
            (a.0.max(b.0), a.1.max(b.1))
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pix::Raster;

    fn frame(left: u16, top: u16, width: u32, height: u32) -> Frame {
        Frame::with_indexed(Raster::with_clear(width, height))
            .with_offset(left, top)
    }

    #[test]
    fn explicit() {
        let frames = [frame(0, 0, 50, 50)];
        assert_eq!(canvas_size(Some((300, 200)), &frames), Some((300, 200)));
        assert_eq!(canvas_size(Some((300, 200)), &[]), Some((300, 200)));
    }

    #[test]
    fn inferred() {
        let frames = [frame(0, 0, 10, 10), frame(5, 5, 10, 10), frame(20, 20, 5, 5)];
        assert_eq!(canvas_size(None, &frames), Some((25, 25)));
    }

    #[test]
    fn degenerate_explicit() {
        let frames = [frame(3, 4, 10, 10)];
        assert_eq!(canvas_size(Some((0, 100)), &frames), Some((13, 14)));
    }

    #[test]
    fn unresolved() {
        assert_eq!(canvas_size(None, &[]), None);
        assert_eq!(canvas_size(Some((0, 0)), &[]), None);
    }
}
