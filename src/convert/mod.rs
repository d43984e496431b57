//! Pixel-format conversion engine.
//!
//! [`convert`] produces a new bitmap at a requested target depth. The source
//! is never mutated; when the request needs no work (or has no defined
//! conversion path) the outcome is [`ConvertOutcome::Unchanged`] rather than
//! a cloned bitmap, so callers can probe depth combinations cheaply.

mod dither;
mod lines;

pub use dither::DitherKind;

use alloc::vec::Vec;

use crate::bitmap::{
    Bitmap, BLUE_MASK_555, BLUE_MASK_565, GREEN_MASK_555, GREEN_MASK_565, RED_MASK_555,
    RED_MASK_565,
};
use crate::error::BitmapError;
use crate::palette::{greyscale_ramp, RgbQuad};
use crate::pixel::ImageType;
use crate::quantize::{self, QuantizerKind};

/// Requested target depth for [`convert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetDepth {
    /// 1 bpp by per-pixel `luminance >= threshold`.
    OneBitThreshold,
    /// 1 bpp through the selected dither algorithm.
    OneBitDither,
    /// 4 bpp palette.
    FourBit,
    /// 8 bpp palette; quantizes truecolor sources.
    EightBit,
    /// 16 bpp, 5-5-5 channel layout.
    Sixteen555,
    /// 16 bpp, 5-6-5 channel layout.
    Sixteen565,
    /// 24 bpp truecolor.
    TwentyFour,
    /// 32 bpp truecolor with alpha.
    ThirtyTwo,
}

impl TargetDepth {
    fn bpp(self) -> u32 {
        match self {
            Self::OneBitThreshold | Self::OneBitDither => 1,
            Self::FourBit => 4,
            Self::EightBit => 8,
            Self::Sixteen555 | Self::Sixteen565 => 16,
            Self::TwentyFour => 24,
            Self::ThirtyTwo => 32,
        }
    }
}

/// Conversion configuration, builder style.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    threshold: u8,
    dither: DitherKind,
    quantizer: QuantizerKind,
    reorder_palette: bool,
    force_greyscale: bool,
    reserve_palette: Vec<RgbQuad>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            threshold: 128,
            dither: DitherKind::default(),
            quantizer: QuantizerKind::default(),
            reorder_palette: false,
            force_greyscale: false,
            reserve_palette: Vec::new(),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Luminance cutoff for [`TargetDepth::OneBitThreshold`].
    pub fn threshold(mut self, t: u8) -> Self {
        self.threshold = t;
        self
    }

    pub fn dither(mut self, kind: DitherKind) -> Self {
        self.dither = kind;
        self
    }

    /// Quantizer used when reducing truecolor to 8 bpp.
    pub fn quantizer(mut self, kind: QuantizerKind) -> Self {
        self.quantizer = kind;
        self
    }

    /// Force a canonical linear greyscale palette when the source is already
    /// greyscale.
    pub fn reorder_palette(mut self, on: bool) -> Self {
        self.reorder_palette = on;
        self
    }

    /// Convert to greyscale before applying the target depth.
    pub fn force_greyscale(mut self, on: bool) -> Self {
        self.force_greyscale = on;
        self
    }

    /// Fixed palette prefix preserved verbatim through quantization.
    pub fn reserve_palette(mut self, reserve: Vec<RgbQuad>) -> Self {
        self.reserve_palette = reserve;
        self
    }
}

/// Result of a conversion request.
#[derive(Debug)]
pub enum ConvertOutcome {
    /// A new bitmap at the requested depth; the source is untouched.
    Converted(Bitmap),
    /// The source already satisfies the request, or no conversion path is
    /// defined for the combination. Nothing was allocated.
    Unchanged,
}

impl ConvertOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// The converted bitmap, if any.
    pub fn converted(self) -> Option<Bitmap> {
        match self {
            Self::Converted(dib) => Some(dib),
            Self::Unchanged => None,
        }
    }
}

/// Convert `src` to the requested depth.
///
/// Extended image types (integer/float/complex pixels) have no conversion
/// path here and come back [`ConvertOutcome::Unchanged`].
pub fn convert(
    src: &Bitmap,
    target: TargetDepth,
    opts: &ConvertOptions,
) -> Result<ConvertOutcome, BitmapError> {
    if src.image_type() != ImageType::Bitmap {
        return Ok(ConvertOutcome::Unchanged);
    }

    let grey_rework = opts.reorder_palette && src.is_greyscale() && !has_canonical_ramp(src);
    let force_rework = opts.force_greyscale && !src.is_greyscale();

    if src.bpp() == target.bpp() && !grey_rework && !force_rework && masks_match(src, target) {
        return Ok(ConvertOutcome::Unchanged);
    }

    // Greyscale pre-collapse: forced greyscale, and canonicalization of an
    // arbitrary-order grey palette, both reduce to "go through an 8-bit
    // linear-ramp version first".
    let pre;
    let work: &Bitmap = if force_rework || grey_rework {
        pre = to_grey8(src)?;
        &pre
    } else {
        src
    };

    let out = match target {
        TargetDepth::OneBitThreshold => {
            let grey = to_grey8(work)?;
            dither::threshold_to_1(&grey, opts.threshold)?
        }
        TargetDepth::OneBitDither => {
            let grey = to_grey8(work)?;
            dither::dither_to_1(&grey, opts.dither)?
        }
        TargetDepth::FourBit => to_4(work)?,
        TargetDepth::EightBit => to_8(work, opts)?,
        TargetDepth::Sixteen555 => to_16(work, false)?,
        TargetDepth::Sixteen565 => to_16(work, true)?,
        TargetDepth::TwentyFour => to_24(work)?,
        TargetDepth::ThirtyTwo => to_32(work)?,
    };

    let mut out = out;
    *out.metadata_mut() = src.metadata().clone();
    Ok(ConvertOutcome::Converted(out))
}

/// Convert, consuming the source: returns the new bitmap on success and
/// hands the original back untouched when nothing changed.
pub fn convert_replacing(
    src: Bitmap,
    target: TargetDepth,
    opts: &ConvertOptions,
) -> Result<Bitmap, BitmapError> {
    match convert(&src, target, opts)? {
        ConvertOutcome::Converted(out) => Ok(out),
        ConvertOutcome::Unchanged => Ok(src),
    }
}

fn masks_match(src: &Bitmap, target: TargetDepth) -> bool {
    match target {
        TargetDepth::Sixteen555 => {
            src.masks() == (RED_MASK_555, GREEN_MASK_555, BLUE_MASK_555)
        }
        TargetDepth::Sixteen565 => {
            src.masks() == (RED_MASK_565, GREEN_MASK_565, BLUE_MASK_565)
        }
        _ => true,
    }
}

fn has_canonical_ramp(src: &Bitmap) -> bool {
    match src.palette() {
        Some(pal) => pal.entries() == greyscale_ramp(pal.len()),
        None => true,
    }
}

fn source_palette(src: &Bitmap) -> Vec<RgbQuad> {
    src.palette().map(|p| p.entries()).unwrap_or_default()
}

fn is_565(src: &Bitmap) -> bool {
    src.masks() == (RED_MASK_565, GREEN_MASK_565, BLUE_MASK_565)
}

/// Collapse any standard depth to canonical 8-bit greyscale.
fn to_grey8(src: &Bitmap) -> Result<Bitmap, BitmapError> {
    let mut out = Bitmap::allocate(src.width(), src.height(), 8)?;
    out.set_palette(&greyscale_ramp(256))?;
    let palette = source_palette(src);
    let src_565 = is_565(src);
    for row in 0..src.height() {
        let source = src.row_bytes(row)?;
        let target = out.row_bytes_mut(row)?;
        lines::line_to_8_grey(
            target,
            source,
            src.width() as usize,
            src.bpp(),
            src_565,
            &palette,
        );
    }
    Ok(out)
}

fn to_4(src: &Bitmap) -> Result<Bitmap, BitmapError> {
    let width = src.width() as usize;
    let mut out = Bitmap::allocate(src.width(), src.height(), 4)?;

    if src.bpp() == 1 {
        // Direct index expansion keeps the 2-entry palette.
        let palette = source_palette(src);
        out.set_palette(&[
            palette.first().copied().unwrap_or_default(),
            palette.get(1).copied().unwrap_or_default(),
        ])?;
        for row in 0..src.height() {
            lines::line_1_to_4(out.row_bytes_mut(row)?, src.row_bytes(row)?, width);
        }
        return Ok(out);
    }

    // Everything else reduces through greyscale.
    let grey = if src.bpp() == 8 && has_canonical_ramp(src) && src.is_greyscale() {
        None
    } else {
        Some(to_grey8(src)?)
    };
    let grey_ref = grey.as_ref().unwrap_or(src);
    out.set_palette(&greyscale_ramp(16))?;
    for row in 0..src.height() {
        lines::line_8_to_4_grey(out.row_bytes_mut(row)?, grey_ref.row_bytes(row)?, width);
    }
    Ok(out)
}

fn to_8(src: &Bitmap, opts: &ConvertOptions) -> Result<Bitmap, BitmapError> {
    let width = src.width() as usize;
    match src.bpp() {
        1 => {
            let mut out = Bitmap::allocate(src.width(), src.height(), 8)?;
            // Bit 0 maps to index 0, bit 1 to index 255; the ramp between
            // keeps greyscale sources canonical.
            let palette = source_palette(src);
            let mut entries = greyscale_ramp(256);
            entries[0] = palette.first().copied().unwrap_or_default();
            entries[255] = palette.get(1).copied().unwrap_or_default();
            out.set_palette(&entries)?;
            for row in 0..src.height() {
                lines::line_1_to_8(out.row_bytes_mut(row)?, src.row_bytes(row)?, width);
            }
            Ok(out)
        }
        4 => {
            let mut out = Bitmap::allocate(src.width(), src.height(), 8)?;
            let palette = source_palette(src);
            let mut entries = greyscale_ramp(256);
            for (i, e) in palette.iter().take(16).enumerate() {
                entries[i] = *e;
            }
            out.set_palette(&entries)?;
            for row in 0..src.height() {
                lines::line_4_to_8(out.row_bytes_mut(row)?, src.row_bytes(row)?, width);
            }
            Ok(out)
        }
        8 => {
            // Only reachable after a greyscale pre-collapse; the collapse
            // already is the 8-bit result.
            Ok(src.clone())
        }
        16 | 24 | 32 => {
            let normalized;
            let truecolor = if src.bpp() == 24 {
                src
            } else {
                normalized = to_24(src)?;
                &normalized
            };
            quantize::quantize(truecolor, opts.quantizer, 256, &opts.reserve_palette)
        }
        other => Err(BitmapError::InvalidArgument(alloc::format!(
            "no 8-bit conversion path from {other} bpp"
        ))),
    }
}

fn to_16(src: &Bitmap, dst_565: bool) -> Result<Bitmap, BitmapError> {
    let (r, g, b) = if dst_565 {
        (RED_MASK_565, GREEN_MASK_565, BLUE_MASK_565)
    } else {
        (RED_MASK_555, GREEN_MASK_555, BLUE_MASK_555)
    };
    let mut out = Bitmap::allocate_with_masks(src.width(), src.height(), 16, r, g, b)?;
    let palette = source_palette(src);
    let src_565 = is_565(src);
    for row in 0..src.height() {
        lines::line_to_16(
            out.row_bytes_mut(row)?,
            src.row_bytes(row)?,
            src.width() as usize,
            src.bpp(),
            src_565,
            dst_565,
            &palette,
        );
    }
    Ok(out)
}

fn to_24(src: &Bitmap) -> Result<Bitmap, BitmapError> {
    let mut out = Bitmap::allocate(src.width(), src.height(), 24)?;
    let palette = source_palette(src);
    let src_565 = is_565(src);
    for row in 0..src.height() {
        lines::line_to_24(
            out.row_bytes_mut(row)?,
            src.row_bytes(row)?,
            src.width() as usize,
            src.bpp(),
            src_565,
            &palette,
        );
    }
    Ok(out)
}

fn to_32(src: &Bitmap) -> Result<Bitmap, BitmapError> {
    let mut out = Bitmap::allocate(src.width(), src.height(), 32)?;
    let palette = source_palette(src);
    let src_565 = is_565(src);
    for row in 0..src.height() {
        lines::line_to_32(
            out.row_bytes_mut(row)?,
            src.row_bytes(row)?,
            src.width() as usize,
            src.bpp(),
            src_565,
            &palette,
        );
    }
    Ok(out)
}
