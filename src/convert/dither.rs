//! 1-bit reduction: threshold and dither over an 8-bit grey collapse.

use alloc::vec;

use crate::bitmap::Bitmap;
use crate::error::BitmapError;
use crate::palette::RgbQuad;

/// Dither algorithm for 1-bit targets.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DitherKind {
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Ordered 4x4 Bayer matrix.
    Bayer4x4,
    /// Ordered 8x8 Bayer matrix.
    Bayer8x8,
}

const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

fn allocate_1bpp(width: u32, height: u32) -> Result<Bitmap, BitmapError> {
    let mut out = Bitmap::allocate(width, height, 1)?;
    out.set_palette(&[RgbQuad::new(0, 0, 0), RgbQuad::new(255, 255, 255)])?;
    Ok(out)
}

fn set_bit(row: &mut [u8], x: usize, on: bool) {
    let mask = 0x80 >> (x & 7);
    if on {
        row[x >> 3] |= mask;
    } else {
        row[x >> 3] &= !mask;
    }
}

/// Per-pixel `luminance >= threshold` test on an 8-bit grey source.
pub(crate) fn threshold_to_1(grey: &Bitmap, threshold: u8) -> Result<Bitmap, BitmapError> {
    let mut out = allocate_1bpp(grey.width(), grey.height())?;
    for row in 0..grey.height() {
        let src = grey.row_bytes(row)?;
        let dst = out.row_bytes_mut(row)?;
        for x in 0..grey.width() as usize {
            set_bit(dst, x, src[x] >= threshold);
        }
    }
    Ok(out)
}

/// Dither an 8-bit grey source down to 1 bit.
pub(crate) fn dither_to_1(grey: &Bitmap, kind: DitherKind) -> Result<Bitmap, BitmapError> {
    match kind {
        DitherKind::FloydSteinberg => floyd_steinberg(grey),
        DitherKind::Bayer4x4 => ordered(grey, |x, y| (u16::from(BAYER_4X4[y % 4][x % 4]) + 1) * 255 / 16),
        DitherKind::Bayer8x8 => ordered(grey, |x, y| (u16::from(BAYER_8X8[y % 8][x % 8]) + 1) * 255 / 64),
    }
}

fn ordered(grey: &Bitmap, cell: impl Fn(usize, usize) -> u16) -> Result<Bitmap, BitmapError> {
    let mut out = allocate_1bpp(grey.width(), grey.height())?;
    for row in 0..grey.height() {
        let src = grey.row_bytes(row)?;
        let dst = out.row_bytes_mut(row)?;
        for x in 0..grey.width() as usize {
            set_bit(dst, x, u16::from(src[x]) >= cell(x, row as usize));
        }
    }
    Ok(out)
}

fn floyd_steinberg(grey: &Bitmap) -> Result<Bitmap, BitmapError> {
    let width = grey.width() as usize;
    let mut out = allocate_1bpp(grey.width(), grey.height())?;

    // Working row plus the next row's accumulated error, in signed space.
    let mut current = vec![0i32; width];
    let mut pending = vec![0i32; width];

    for row in 0..grey.height() {
        let src = grey.row_bytes(row)?;
        for (slot, (&err, &px)) in current
            .iter_mut()
            .zip(pending.iter().zip(src[..width].iter()))
        {
            *slot = err + i32::from(px);
        }
        pending.fill(0);

        let dst = out.row_bytes_mut(row)?;
        for x in 0..width {
            let value = current[x];
            let on = value >= 128;
            set_bit(dst, x, on);
            let err = value - if on { 255 } else { 0 };

            // 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right.
            if x + 1 < width {
                current[x + 1] += err * 7 / 16;
            }
            if x > 0 {
                pending[x - 1] += err * 3 / 16;
            }
            pending[x] += err * 5 / 16;
            if x + 1 < width {
                pending[x + 1] += err / 16;
            }
        }
    }
    Ok(out)
}
