//! Per-row pixel format converters.
//!
//! Each function rewrites one unpadded scanline between two packed layouts.
//! Palette depths expand through the source color table; 16-bit rows pack
//! and unpack through the 5-5-5 / 5-6-5 masks, scaling channels with the
//! `(v * 0xFF) / max` rule so full intensity maps to full intensity.

use crate::palette::{luminance, RgbQuad};

#[inline]
fn bit_at(row: &[u8], x: usize) -> usize {
    usize::from(row[x >> 3] & (0x80 >> (x & 7)) != 0)
}

#[inline]
fn nibble_at(row: &[u8], x: usize) -> usize {
    if x & 1 == 0 {
        (row[x >> 1] >> 4) as usize
    } else {
        (row[x >> 1] & 0x0F) as usize
    }
}

#[inline]
fn pal(palette: &[RgbQuad], index: usize) -> RgbQuad {
    palette.get(index).copied().unwrap_or_default()
}

#[inline]
pub(crate) fn pack_555(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 10) | (u16::from(g >> 3) << 5) | u16::from(b >> 3)
}

#[inline]
pub(crate) fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

#[inline]
pub(crate) fn unpack_555(v: u16) -> (u8, u8, u8) {
    let r = ((u32::from(v) & 0x7C00) >> 10) * 0xFF / 0x1F;
    let g = ((u32::from(v) & 0x03E0) >> 5) * 0xFF / 0x1F;
    let b = (u32::from(v) & 0x001F) * 0xFF / 0x1F;
    (r as u8, g as u8, b as u8)
}

#[inline]
pub(crate) fn unpack_565(v: u16) -> (u8, u8, u8) {
    let r = ((u32::from(v) & 0xF800) >> 11) * 0xFF / 0x1F;
    let g = ((u32::from(v) & 0x07E0) >> 5) * 0xFF / 0x3F;
    let b = (u32::from(v) & 0x001F) * 0xFF / 0x1F;
    (r as u8, g as u8, b as u8)
}

#[inline]
fn read_u16(row: &[u8], x: usize) -> u16 {
    u16::from_le_bytes([row[x * 2], row[x * 2 + 1]])
}

#[inline]
fn write_u16(row: &mut [u8], x: usize, v: u16) {
    row[x * 2..x * 2 + 2].copy_from_slice(&v.to_le_bytes());
}

/// Read pixel `x` of a truecolor-expressible row as (r, g, b, a).
/// `bpp` selects the decode; palette depths go through `palette`.
pub(crate) fn read_rgba(
    row: &[u8],
    x: usize,
    bpp: u32,
    is_565: bool,
    palette: &[RgbQuad],
) -> (u8, u8, u8, u8) {
    match bpp {
        1 => {
            let e = pal(palette, bit_at(row, x));
            (e.r, e.g, e.b, 0xFF)
        }
        4 => {
            let e = pal(palette, nibble_at(row, x));
            (e.r, e.g, e.b, 0xFF)
        }
        8 => {
            let e = pal(palette, row[x] as usize);
            (e.r, e.g, e.b, 0xFF)
        }
        16 => {
            let v = read_u16(row, x);
            let (r, g, b) = if is_565 { unpack_565(v) } else { unpack_555(v) };
            (r, g, b, 0xFF)
        }
        24 => (row[x * 3 + 2], row[x * 3 + 1], row[x * 3], 0xFF),
        32 => (row[x * 4 + 2], row[x * 4 + 1], row[x * 4], row[x * 4 + 3]),
        _ => (0, 0, 0, 0xFF),
    }
}

// ── to 8-bit index / greyscale ──────────────────────────────────────

/// 1 → 8: bit 0 stays index 0, bit 1 becomes index 255 (the caller moves
/// palette entry 1 to slot 255).
pub(crate) fn line_1_to_8(target: &mut [u8], source: &[u8], width: usize) {
    for (x, out) in target[..width].iter_mut().enumerate() {
        *out = if bit_at(source, x) != 0 { 255 } else { 0 };
    }
}

/// 4 → 8: nibble indices carry over unchanged.
pub(crate) fn line_4_to_8(target: &mut [u8], source: &[u8], width: usize) {
    for (x, out) in target[..width].iter_mut().enumerate() {
        *out = nibble_at(source, x) as u8;
    }
}

/// Any truecolor-expressible row to 8-bit grey by luma.
pub(crate) fn line_to_8_grey(
    target: &mut [u8],
    source: &[u8],
    width: usize,
    bpp: u32,
    is_565: bool,
    palette: &[RgbQuad],
) {
    for (x, out) in target[..width].iter_mut().enumerate() {
        let (r, g, b, _) = read_rgba(source, x, bpp, is_565, palette);
        *out = luminance(r, g, b);
    }
}

// ── to 4-bit ────────────────────────────────────────────────────────

/// 1 → 4: indices 0/1 carry over (palette prefix is copied by the caller).
pub(crate) fn line_1_to_4(target: &mut [u8], source: &[u8], width: usize) {
    for x in 0..width {
        write_nibble(target, x, bit_at(source, x) as u8);
    }
}

/// 8-bit grey → 4-bit grey ramp index (high nibble of the luma).
pub(crate) fn line_8_to_4_grey(target: &mut [u8], source: &[u8], width: usize) {
    for x in 0..width {
        write_nibble(target, x, source[x] >> 4);
    }
}

#[inline]
fn write_nibble(row: &mut [u8], x: usize, v: u8) {
    let slot = &mut row[x >> 1];
    if x & 1 == 0 {
        *slot = (*slot & 0x0F) | (v << 4);
    } else {
        *slot = (*slot & 0xF0) | (v & 0x0F);
    }
}

// ── to 16-bit ───────────────────────────────────────────────────────

pub(crate) fn line_to_16(
    target: &mut [u8],
    source: &[u8],
    width: usize,
    bpp: u32,
    src_565: bool,
    dst_565: bool,
    palette: &[RgbQuad],
) {
    for x in 0..width {
        let (r, g, b, _) = read_rgba(source, x, bpp, src_565, palette);
        let v = if dst_565 {
            pack_565(r, g, b)
        } else {
            pack_555(r, g, b)
        };
        write_u16(target, x, v);
    }
}

// ── to 24-bit ───────────────────────────────────────────────────────

pub(crate) fn line_to_24(
    target: &mut [u8],
    source: &[u8],
    width: usize,
    bpp: u32,
    is_565: bool,
    palette: &[RgbQuad],
) {
    for (x, out) in target[..width * 3].chunks_exact_mut(3).enumerate() {
        let (r, g, b, _) = read_rgba(source, x, bpp, is_565, palette);
        out[0] = b;
        out[1] = g;
        out[2] = r;
    }
}

// ── to 32-bit ───────────────────────────────────────────────────────

pub(crate) fn line_to_32(
    target: &mut [u8],
    source: &[u8],
    width: usize,
    bpp: u32,
    is_565: bool,
    palette: &[RgbQuad],
) {
    for (x, out) in target[..width * 4].chunks_exact_mut(4).enumerate() {
        let (r, g, b, a) = read_rgba(source, x, bpp, is_565, palette);
        out[0] = b;
        out[1] = g;
        out[2] = r;
        out[3] = a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_scaling_saturates() {
        assert_eq!(unpack_555(pack_555(255, 255, 255)), (255, 255, 255));
        assert_eq!(unpack_565(pack_565(255, 255, 255)), (255, 255, 255));
        assert_eq!(unpack_555(pack_555(0, 0, 0)), (0, 0, 0));
    }

    #[test]
    fn pack_555_layout() {
        // Pure red occupies the top five data bits.
        assert_eq!(pack_555(255, 0, 0), 0x7C00);
        assert_eq!(pack_565(255, 0, 0), 0xF800);
        assert_eq!(pack_565(0, 255, 0), 0x07E0);
        assert_eq!(pack_555(0, 0, 255), 0x001F);
    }

    #[test]
    fn palette_expansion_to_24() {
        let palette = [RgbQuad::new(10, 20, 30), RgbQuad::new(200, 100, 50)];
        let source = [0b0100_0000u8];
        let mut target = [0u8; 9];
        line_to_24(&mut target, &source, 3, 1, false, &palette);
        // B, G, R order; pixel 1 is palette entry 1.
        assert_eq!(&target[..3], &[30, 20, 10]);
        assert_eq!(&target[3..6], &[50, 100, 200]);
        assert_eq!(&target[6..9], &[30, 20, 10]);
    }

    #[test]
    fn one_bit_to_8_uses_end_slots() {
        let source = [0b1010_0000u8];
        let mut target = [9u8; 4];
        line_1_to_8(&mut target, &source, 4);
        assert_eq!(target, [255, 0, 255, 0]);
    }

    #[test]
    fn alpha_passes_through_32() {
        let source = [1u8, 2, 3, 77, 4, 5, 6, 255];
        let mut target = [0u8; 8];
        line_to_32(&mut target, &source, 2, 32, false, &[]);
        assert_eq!(target, source);
    }
}
