// interlace.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Interlaced row ordering
//!
//! Interlaced images are transmitted in four passes:
//! 1. every 8th row, starting with row 0
//! 2. every 8th row, starting with row 4
//! 3. every 4th row, starting with row 2
//! 4. every 2nd row, starting with row 1

/// Starting row of each pass
static PASS_OFFSET: [usize; 4] = [0, 4, 2, 1];

/// Row stride of each pass
static PASS_STRIDE: [usize; 4] = [8, 8, 4, 2];

/// Iterate over image rows in transmission order
fn transmission_rows(height: usize) -> impl Iterator<Item = usize> {
    PASS_OFFSET
        .iter()
        .zip(PASS_STRIDE.iter())
        .flat_map(move |(&offset, &stride)| (offset..height).step_by(stride))
}

/// Copy rows from transmission order into display order.
///
/// The height is taken from the destination; source rows past the end are
/// ignored, and destination rows without a source row are left unchanged.
pub fn deinterlace(src: &[u8], dst: &mut [u8], width: usize) {
    if width == 0 {
        return;
    }
    let height = dst.len() / width;
    for (row, line) in transmission_rows(height).zip(src.chunks_exact(width)) {
        let start = row * width;
        dst[start..start + width].copy_from_slice(line);
    }
}

/// Reorder rows from display order to transmission order
pub fn interlace(data: &[u8], width: usize) -> Vec<u8> {
    if width == 0 {
        return data.to_vec();
    }
    let height = data.len() / width;
    let mut rows = Vec::with_capacity(data.len());
    for row in transmission_rows(height) {
        let start = row * width;
        rows.extend_from_slice(&data[start..start + width]);
    }
    rows
}
