//! Color-table views and palette operations.

use alloc::vec::Vec;

use crate::buffer::{PixelView, PixelViewMut};
use crate::error::BitmapError;

/// 24-bit pixel in DIB byte order: blue, green, red.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RgbTriple {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

/// Color-table entry in DIB byte order: blue, green, red, reserved.
///
/// The reserved byte carries alpha for 32-bit pixels and is ignored when the
/// quad is used as a palette color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RgbQuad {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub reserved: u8,
}

impl RgbQuad {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            b,
            g,
            r,
            reserved: 0,
        }
    }

    /// Structural color equality, ignoring the reserved byte.
    pub fn same_color(&self, other: &RgbQuad) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Rec. 601 luma, the weighting used throughout the conversion engine.
    pub fn luminance(&self) -> u8 {
        luminance(self.r, self.g, self.b)
    }
}

/// `(77 r + 151 g + 28 b) >> 8` integer luma.
pub(crate) fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((u16::from(r) * 77 + u16::from(g) * 151 + u16::from(b) * 28) >> 8) as u8
}

/// Read-only view over a bitmap's color table.
pub struct PaletteView<'a> {
    view: PixelView<'a, RgbQuad>,
}

impl<'a> PaletteView<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        // The bitmap keeps its palette storage at exactly 4 bytes per entry.
        let len = bytes.len() / 4;
        Self {
            view: PixelView::new(bytes, len).expect("palette storage is 4 bytes per entry"),
        }
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<RgbQuad, BitmapError> {
        self.view.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = RgbQuad> + '_ {
        self.view.iter()
    }

    /// Raw headerless dump: `4 * len` bytes, B-G-R-reserved per entry.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.view.to_bytes()
    }

    /// Whether every entry is grey (r == g == b).
    pub fn is_greyscale(&self) -> bool {
        self.iter().all(|e| e.r == e.g && e.g == e.b)
    }

    pub fn entries(&self) -> Vec<RgbQuad> {
        self.iter().collect()
    }
}

impl PartialEq for PaletteView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.view == other.view
    }
}

/// Mutable view over a bitmap's color table.
pub struct PaletteViewMut<'a> {
    view: PixelViewMut<'a, RgbQuad>,
}

impl<'a> PaletteViewMut<'a> {
    pub(crate) fn new(bytes: &'a mut [u8]) -> Self {
        let len = bytes.len() / 4;
        Self {
            view: PixelViewMut::new(bytes, len).expect("palette storage is 4 bytes per entry"),
        }
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<RgbQuad, BitmapError> {
        self.view.get(index)
    }

    pub fn set(&mut self, index: usize, entry: RgbQuad) -> Result<(), BitmapError> {
        self.view.set(index, entry)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.view.to_bytes()
    }

    /// Restore the table from a raw headerless dump. The dump must hold
    /// exactly `4 * len` bytes.
    pub fn set_from_bytes(&mut self, bytes: &[u8]) -> Result<(), BitmapError> {
        let expected = self.view.len() * 4;
        if bytes.len() != expected {
            return Err(BitmapError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        for (i, quad) in bytes.chunks_exact(4).enumerate() {
            self.view.set(
                i,
                RgbQuad {
                    b: quad[0],
                    g: quad[1],
                    r: quad[2],
                    reserved: quad[3],
                },
            )?;
        }
        Ok(())
    }

    /// Rebuild the table as a two-segment linear gradient: entries
    /// `[0, split_index]` ramp from black to `color`, entries
    /// `(split_index, len)` ramp from `color` to white.
    pub fn colorize(&mut self, color: RgbQuad, split_index: usize) -> Result<(), BitmapError> {
        let len = self.view.len();
        if split_index == 0 || split_index >= len {
            return Err(BitmapError::OutOfRange {
                index: split_index,
                len,
            });
        }

        let ramp = |from: u8, to: u8, step: usize, steps: usize| -> u8 {
            if steps == 0 {
                return to;
            }
            let from = i32::from(from);
            let to = i32::from(to);
            (from + (to - from) * step as i32 / steps as i32) as u8
        };

        for i in 0..=split_index {
            let entry = RgbQuad::new(
                ramp(0, color.r, i, split_index),
                ramp(0, color.g, i, split_index),
                ramp(0, color.b, i, split_index),
            );
            self.view.set(i, entry)?;
        }
        let tail_steps = len - 1 - split_index;
        for i in split_index + 1..len {
            let step = i - split_index;
            let entry = RgbQuad::new(
                ramp(color.r, 255, step, tail_steps),
                ramp(color.g, 255, step, tail_steps),
                ramp(color.b, 255, step, tail_steps),
            );
            self.view.set(i, entry)?;
        }
        Ok(())
    }

    pub fn as_view(&self) -> PaletteView<'_> {
        PaletteView {
            view: self.view.as_view(),
        }
    }
}

/// A canonical `count`-entry linear greyscale ramp, black to white.
pub(crate) fn greyscale_ramp(count: usize) -> Vec<RgbQuad> {
    (0..count)
        .map(|i| {
            let v = if count > 1 {
                (i * 255 / (count - 1)) as u8
            } else {
                0
            };
            RgbQuad::new(v, v, v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn storage(len: usize) -> Vec<u8> {
        vec![0u8; len * 4]
    }

    #[test]
    fn colorize_two_segment_ramp() {
        let mut bytes = storage(10);
        let mut pal = PaletteViewMut::new(&mut bytes);
        pal.colorize(RgbQuad::new(100, 100, 100), 5).unwrap();

        assert_eq!(pal.get(0).unwrap(), RgbQuad::new(0, 0, 0));
        assert_eq!(pal.get(5).unwrap(), RgbQuad::new(100, 100, 100));
        assert_eq!(pal.get(9).unwrap(), RgbQuad::new(255, 255, 255));
        // Interior entries ramp monotonically.
        let lum: Vec<u8> = pal.as_view().iter().map(|e| e.r).collect();
        assert!(lum.windows(2).all(|w| w[0] <= w[1]), "{lum:?}");
    }

    #[test]
    fn colorize_split_bounds() {
        let mut bytes = storage(8);
        let mut pal = PaletteViewMut::new(&mut bytes);
        assert!(matches!(
            pal.colorize(RgbQuad::new(1, 2, 3), 0),
            Err(BitmapError::OutOfRange { .. })
        ));
        assert!(matches!(
            pal.colorize(RgbQuad::new(1, 2, 3), 8),
            Err(BitmapError::OutOfRange { .. })
        ));
        assert!(pal.colorize(RgbQuad::new(1, 2, 3), 7).is_ok());
    }

    #[test]
    fn dump_and_restore_raw_quads() {
        let mut bytes = storage(2);
        let mut pal = PaletteViewMut::new(&mut bytes);
        pal.set(0, RgbQuad::new(10, 20, 30)).unwrap();
        pal.set(1, RgbQuad::new(40, 50, 60)).unwrap();
        let dump = pal.to_bytes();
        // B, G, R, reserved per entry.
        assert_eq!(dump, vec![30, 20, 10, 0, 60, 50, 40, 0]);

        let mut other_bytes = storage(2);
        let mut other = PaletteViewMut::new(&mut other_bytes);
        other.set_from_bytes(&dump).unwrap();
        assert_eq!(other.get(1).unwrap(), RgbQuad::new(40, 50, 60));
        assert!(other.set_from_bytes(&dump[..4]).is_err());
    }

    #[test]
    fn greyscale_ramp_endpoints() {
        let ramp = greyscale_ramp(256);
        assert_eq!(ramp[0], RgbQuad::new(0, 0, 0));
        assert_eq!(ramp[255], RgbQuad::new(255, 255, 255));
        assert_eq!(ramp[128].r, 128);
        let two = greyscale_ramp(2);
        assert_eq!(two[1], RgbQuad::new(255, 255, 255));
    }

    #[test]
    fn luminance_weighting() {
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
        // Green dominates the weighting.
        assert!(luminance(0, 255, 0) > luminance(255, 0, 0));
        assert!(luminance(255, 0, 0) > luminance(0, 0, 255));
    }
}
