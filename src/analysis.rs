//! Pixel statistics: unique-color counting and per-channel histograms.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::bitmap::Bitmap;
use crate::buffer::{Bit1, Nibble4};
use crate::error::BitmapError;
use crate::palette::luminance;
use crate::pixel::ImageType;

/// Channel selector for [`histogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Luminance (greyscale) channel.
    Black,
    Red,
    Green,
    Blue,
    Alpha,
}

/// Fixed-capacity bit set; `insert` reports whether the value was new.
struct BitSet {
    words: Vec<u32>,
    count: usize,
}

impl BitSet {
    fn new(capacity: usize) -> Self {
        Self {
            words: vec![0u32; capacity.div_ceil(32)],
            count: 0,
        }
    }

    fn insert(&mut self, value: usize) -> bool {
        let word = &mut self.words[value / 32];
        let mask = 1u32 << (value % 32);
        if *word & mask == 0 {
            *word |= mask;
            self.count += 1;
            true
        } else {
            false
        }
    }
}

/// Count the distinct colors actually used by the pixels of a standard
/// bitmap. Palette depths count distinct palette colors referenced (two
/// indices with the same RGB count once, the reserved byte is ignored);
/// 32 bpp ignores alpha.
pub fn count_unique_colors(bitmap: &Bitmap) -> Result<u32, BitmapError> {
    if bitmap.image_type() != ImageType::Bitmap {
        return Err(BitmapError::UnsupportedImageType(bitmap.image_type()));
    }
    match bitmap.bpp() {
        1 | 4 | 8 => count_palette(bitmap),
        16 => {
            let mut seen = BitSet::new(1 << 16);
            for row in 0..bitmap.height() {
                let bytes = bitmap.row_bytes(row)?;
                for px in bytes.chunks_exact(2) {
                    seen.insert(u16::from_le_bytes([px[0], px[1]]) as usize);
                }
            }
            Ok(seen.count as u32)
        }
        24 | 32 => {
            let step = bitmap.bpp() as usize / 8;
            let mut seen = BitSet::new(1 << 24);
            for row in 0..bitmap.height() {
                let bytes = bitmap.row_bytes(row)?;
                for px in bytes.chunks_exact(step) {
                    // Stored order is b, g, r(, reserved).
                    let key = (px[2] as usize) << 16 | (px[1] as usize) << 8 | px[0] as usize;
                    seen.insert(key);
                }
            }
            Ok(seen.count as u32)
        }
        bpp => Err(BitmapError::InvalidArgument(format!(
            "{bpp} bpp has no color count"
        ))),
    }
}

fn count_palette(bitmap: &Bitmap) -> Result<u32, BitmapError> {
    let pal = bitmap.palette().ok_or(BitmapError::InvalidPaletteSize(0))?;

    // Collapse duplicate palette colors: canonical[i] is the lowest index
    // carrying the same (r, g, b) as entry i.
    let len = pal.len();
    let mut canonical = Vec::with_capacity(len);
    let mut distinct = 0usize;
    for i in 0..len {
        let e = pal.get(i)?;
        let mut canon = i;
        for j in 0..i {
            let o = pal.get(j)?;
            if o.same_color(&e) {
                canon = canonical[j];
                break;
            }
        }
        if canon == i {
            distinct += 1;
        }
        canonical.push(canon);
    }

    let mut used = vec![false; len];
    let mut observed = 0usize;
    'scan: for row in 0..bitmap.height() {
        for index in palette_indices(bitmap, row)? {
            let index = index as usize;
            if index >= len {
                continue;
            }
            let canon = canonical[index];
            if !used[canon] {
                used[canon] = true;
                observed += 1;
                if observed == distinct {
                    break 'scan;
                }
            }
        }
    }
    Ok(observed as u32)
}

fn palette_indices(bitmap: &Bitmap, row: u32) -> Result<Vec<u8>, BitmapError> {
    let width = bitmap.width() as usize;
    Ok(match bitmap.bpp() {
        1 => bitmap
            .scanline::<Bit1>(row)?
            .iter()
            .map(|v| v.0)
            .collect(),
        4 => bitmap
            .scanline::<Nibble4>(row)?
            .iter()
            .map(|v| v.0)
            .collect(),
        _ => bitmap.row_bytes(row)?[..width].to_vec(),
    })
}

/// Per-channel 256-bin histogram. 8 bpp supports only [`Channel::Black`]
/// (palette images bin by palette luminance), 24 bpp adds the color
/// channels, 32 bpp adds [`Channel::Alpha`]. The bins always sum to
/// `width * height`.
pub fn histogram(bitmap: &Bitmap, channel: Channel) -> Result<[u32; 256], BitmapError> {
    if bitmap.image_type() != ImageType::Bitmap {
        return Err(BitmapError::UnsupportedImageType(bitmap.image_type()));
    }
    let mut bins = [0u32; 256];
    match (bitmap.bpp(), channel) {
        (8, Channel::Black) => {
            // Map each palette index to its entry's luminance; greyscale
            // ramps degenerate to the identity.
            let pal = bitmap.palette().ok_or(BitmapError::InvalidPaletteSize(0))?;
            let mut lut = [0u8; 256];
            for (i, slot) in lut.iter_mut().enumerate() {
                *slot = if i < pal.len() {
                    pal.get(i)?.luminance()
                } else {
                    0
                };
            }
            let width = bitmap.width() as usize;
            for row in 0..bitmap.height() {
                for &index in &bitmap.row_bytes(row)?[..width] {
                    bins[lut[index as usize] as usize] += 1;
                }
            }
        }
        (24, ch) | (32, ch) => {
            let step = bitmap.bpp() as usize / 8;
            let select: fn(&[u8]) -> Option<u8> = match ch {
                Channel::Black => |px| Some(luminance(px[2], px[1], px[0])),
                Channel::Red => |px| Some(px[2]),
                Channel::Green => |px| Some(px[1]),
                Channel::Blue => |px| Some(px[0]),
                Channel::Alpha => |px| px.get(3).copied(),
            };
            for row in 0..bitmap.height() {
                let bytes = bitmap.row_bytes(row)?;
                for px in bytes.chunks_exact(step) {
                    let value = select(px).ok_or_else(|| {
                        BitmapError::InvalidArgument(format!(
                            "no alpha channel at {} bpp",
                            bitmap.bpp()
                        ))
                    })?;
                    bins[value as usize] += 1;
                }
            }
        }
        (bpp, ch) => {
            return Err(BitmapError::InvalidArgument(format!(
                "no {ch:?} histogram at {bpp} bpp"
            )));
        }
    }
    Ok(bins)
}
