// color_table.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Color tables (palettes) and their wire-format color maps
use crate::block::{
    ColorTableConfig, ColorTableExistence, ColorTableOrdering, CHANNELS,
};
use pix::rgb::{Rgb, SRgba8};
use pix::Palette;

/// Maximum number of entries in a color table
pub const MAX_ENTRIES: usize = 256;

/// Get the red, green and blue components of a color
pub(crate) fn rgb(clr: SRgba8) -> [u8; 3] {
    [
        u8::from(Rgb::red(clr)),
        u8::from(Rgb::green(clr)),
        u8::from(Rgb::blue(clr)),
    ]
}

/// Ordered table of colors, addressed by index.
///
/// An entry with zero alpha marks the transparent index of one particular
/// usage of the table (see [from_color_map]).
///
/// [from_color_map]: struct.ColorTable.html#method.from_color_map
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorTable {
    colors: Vec<SRgba8>,
}

/// Color map block: a power-of-two sized list of RGB triples
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMap {
    /// Bit depth (log2 of entry count)
    bits: u8,
    /// RGB triples
    colors: Vec<u8>,
}

impl ColorMap {
    /// Get the bit depth
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        1 << self.bits
    }

    /// Get the RGB triples
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    /// Get the color table config for a screen or image descriptor
    pub fn config(&self) -> ColorTableConfig {
        ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            self.len(),
        )
    }

    /// Get the RGB triples, padded to the length stored in the descriptor
    pub fn wire_colors(&self) -> Vec<u8> {
        let mut colors = self.colors.clone();
        colors.resize(self.config().size_bytes(), 0);
        colors
    }
}

impl From<&Palette> for ColorTable {
    fn from(palette: &Palette) -> Self {
        let colors = (0..palette.len().min(MAX_ENTRIES))
            .filter_map(|i| palette.entry(i))
            .map(|c| {
                SRgba8::new(
                    u8::from(Rgb::red(c)),
                    u8::from(Rgb::green(c)),
                    u8::from(Rgb::blue(c)),
                    0xFF,
                )
            })
            .collect();
        ColorTable { colors }
    }
}

impl ColorTable {
    /// Create an empty color table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a color table from a slice of colors.
    ///
    /// Entries past 256 are dropped.
    pub fn with_colors(colors: &[SRgba8]) -> Self {
        if colors.len() > MAX_ENTRIES {
            warn!("Color table truncated from {} entries", colors.len());
        }
        let colors = colors.iter().take(MAX_ENTRIES).copied().collect();
        ColorTable { colors }
    }

    /// Create an opaque color table from RGB values
    pub fn with_rgb(colors: &[[u8; 3]]) -> Self {
        let colors: Vec<SRgba8> = colors
            .iter()
            .map(|[r, g, b]| SRgba8::new(*r, *g, *b, 0xFF))
            .collect();
        Self::with_colors(&colors)
    }

    /// Create the default system palette (6x6x6 color cube).
    ///
    /// This is used to quantize true color frames when no other color
    /// table applies.
    pub fn web_safe() -> Self {
        let mut colors = Vec::with_capacity(216);
        for r in 0..6u8 {
            for g in 0..6u8 {
                for b in 0..6u8 {
                    colors.push(SRgba8::new(r * 51, g * 51, b * 51, 0xFF));
                }
            }
        }
        ColorTable { colors }
    }

    /// Append a color, returning its index (`None` if the table is full)
    pub fn push(&mut self, clr: SRgba8) -> Option<usize> {
        if self.colors.len() < MAX_ENTRIES {
            self.colors.push(clr);
            Some(self.colors.len() - 1)
        } else {
            None
        }
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get all colors
    pub fn colors(&self) -> &[SRgba8] {
        &self.colors
    }

    /// Get one entry
    pub fn entry(&self, idx: usize) -> Option<SRgba8> {
        self.colors.get(idx).copied()
    }

    /// Find the index of a color.
    ///
    /// An exact match (including alpha) is preferred; otherwise the first
    /// entry with matching red, green and blue is returned.
    pub fn find(&self, clr: SRgba8) -> Option<usize> {
        self.colors.iter().position(|c| *c == clr).or_else(|| {
            let target = rgb(clr);
            self.colors.iter().position(|c| rgb(*c) == target)
        })
    }

    /// Find the entry closest to a color (squared RGB distance)
    pub fn nearest(&self, clr: SRgba8) -> Option<usize> {
        let [r, g, b] = rgb(clr);
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| {
                let [cr, cg, cb] = rgb(**c);
                let dr = i32::from(r) - i32::from(cr);
                let dg = i32::from(g) - i32::from(cg);
                let db = i32::from(b) - i32::from(cb);
                dr * dr + dg * dg + db * db
            })
            .map(|(i, _)| i)
    }

    /// Check whether two tables hold the same colors, ignoring alpha
    pub fn same_colors(&self, other: &ColorTable) -> bool {
        self.len() == other.len()
            && self
                .colors
                .iter()
                .zip(other.colors.iter())
                .all(|(a, b)| rgb(*a) == rgb(*b))
    }

    /// Convert to a wire-format color map.
    ///
    /// Returns `None` for an empty table. The map has `2^bits` entries,
    /// where `bits = ceil(log2(len))`; unused entries are zero.
    pub fn to_color_map(&self) -> Option<ColorMap> {
        if self.is_empty() {
            return None;
        }
        let count = self.len().next_power_of_two();
        let bits = count.trailing_zeros() as u8;
        let mut colors = vec![0; count * CHANNELS];
        for (dst, clr) in colors.chunks_exact_mut(CHANNELS).zip(&self.colors) {
            dst.copy_from_slice(&rgb(*clr));
        }
        Some(ColorMap { bits, colors })
    }

    /// Create a color table from wire-format RGB triples.
    ///
    /// Every entry is opaque, except `transparent`, which gets zero alpha.
    /// A missing map gives an empty table.
    pub fn from_color_map(map: Option<&[u8]>, transparent: Option<u8>) -> Self {
        let transparent = transparent.map(usize::from);
        let colors = map
            .unwrap_or_default()
            .chunks_exact(CHANNELS)
            .take(MAX_ENTRIES)
            .enumerate()
            .map(|(i, c)| {
                let alpha = if Some(i) == transparent { 0 } else { 0xFF };
                SRgba8::new(c[0], c[1], c[2], alpha)
            })
            .collect();
        ColorTable { colors }
    }
}
