//! Color quantization: 24-bit truecolor down to an indexed 8-bit palette.

mod neuquant;
mod wu;

use alloc::vec::Vec;

use rgb::RGB;

use crate::bitmap::Bitmap;
use crate::error::BitmapError;
use crate::palette::RgbQuad;
use crate::pixel::ImageType;

/// Palette-reduction algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantizerKind {
    /// Wu variance-minimizing box split. Deterministic for identical input.
    Wu,
    /// Kohonen competitive-learning network (NeuQuant). `sample_fraction`
    /// trades speed for quality (1 = every pixel, 30 = sparsest); `seed`
    /// rotates the sampling start so identical seeds reproduce identical
    /// palettes.
    NeuQuant { sample_fraction: u32, seed: u32 },
}

impl Default for QuantizerKind {
    fn default() -> Self {
        Self::Wu
    }
}

/// Quantize a 24-bit bitmap to at most `palette_size` indexed colors.
///
/// The first `reserve.len()` output palette entries are `reserve` verbatim;
/// the algorithm only fills the remaining slots. Every pixel maps to its
/// nearest palette entry (squared RGB distance, lowest index wins ties).
pub fn quantize(
    src: &Bitmap,
    kind: QuantizerKind,
    palette_size: u32,
    reserve: &[RgbQuad],
) -> Result<Bitmap, BitmapError> {
    if src.image_type() != ImageType::Bitmap || src.bpp() != 24 {
        return Err(BitmapError::NotTruecolor { bpp: src.bpp() });
    }
    if !(2..=256).contains(&palette_size) {
        return Err(BitmapError::InvalidPaletteSize(palette_size));
    }
    if reserve.len() > palette_size as usize {
        return Err(BitmapError::InvalidArgument(alloc::format!(
            "reserve palette ({} entries) exceeds target size {palette_size}",
            reserve.len()
        )));
    }

    let width = src.width() as usize;
    let mut pixels: Vec<RGB<u8>> = Vec::with_capacity(width * src.height() as usize);
    for row in 0..src.height() {
        for px in src.row_bytes(row)?.chunks_exact(3) {
            pixels.push(RGB {
                r: px[2],
                g: px[1],
                b: px[0],
            });
        }
    }

    let free_slots = palette_size as usize - reserve.len();
    let mut palette: Vec<RgbQuad> = reserve.to_vec();
    let chosen = match kind {
        QuantizerKind::Wu => wu::build_palette(&pixels, free_slots),
        QuantizerKind::NeuQuant {
            sample_fraction,
            seed,
        } => neuquant::build_palette(&pixels, free_slots, sample_fraction, seed),
    };
    palette.extend(chosen);

    let mut out = Bitmap::allocate(src.width(), src.height(), 8)?;
    out.set_palette(&palette)?;
    for row in 0..src.height() {
        let base = row as usize * width;
        let dst = out.row_bytes_mut(row)?;
        for (x, slot) in dst[..width].iter_mut().enumerate() {
            let px = pixels[base + x];
            *slot = nearest_index(&palette, px.r, px.g, px.b);
        }
    }
    *out.metadata_mut() = src.metadata().clone();
    Ok(out)
}

/// Index of the nearest palette entry by squared RGB distance; the lowest
/// index wins ties, so remapping is deterministic.
pub(crate) fn nearest_index(palette: &[RgbQuad], r: u8, g: u8, b: u8) -> u8 {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;
    for (i, e) in palette.iter().enumerate() {
        let dr = i32::from(e.r) - i32::from(r);
        let dg = i32::from(e.g) - i32::from(g);
        let db = i32::from(e.b) - i32::from(b);
        let dist = (dr * dr + dg * dg + db * db) as u32;
        if dist < best_dist {
            best_dist = dist;
            best = i;
            if dist == 0 {
                break;
            }
        }
    }
    best as u8
}
