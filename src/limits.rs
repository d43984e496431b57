//! Allocation guard rails.

use crate::bitmap::{bits_to_line, pad_to_pitch};
use crate::error::BitmapError;

/// Caps enforced before a bitmap allocation reserves any memory.
///
/// Every field defaults to `None`, meaning unbounded.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Cap on `width * height`.
    pub max_pixels: Option<u64>,
    /// Cap on the bytes a bitmap would occupy: pitch-padded rows plus the
    /// full color table at palette depths.
    pub max_allocation_bytes: Option<u64>,
}

impl Limits {
    /// Validate a `width x height` allocation at `bpp` against every cap.
    pub(crate) fn check(&self, width: u32, height: u32, bpp: u32) -> Result<(), BitmapError> {
        if let Some(cap) = self.max_width {
            if width > cap {
                return Err(exceeded("width", u64::from(width), u64::from(cap)));
            }
        }
        if let Some(cap) = self.max_height {
            if height > cap {
                return Err(exceeded("height", u64::from(height), u64::from(cap)));
            }
        }
        if let Some(cap) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > cap {
                return Err(exceeded("pixel count", pixels, cap));
            }
        }
        if let Some(cap) = self.max_allocation_bytes {
            let bytes = allocation_bytes(width, height, bpp)?;
            if bytes > cap {
                return Err(exceeded("allocation", bytes, cap));
            }
        }
        Ok(())
    }
}

fn exceeded(what: &str, value: u64, cap: u64) -> BitmapError {
    BitmapError::LimitExceeded(alloc::format!("{what} {value} exceeds limit {cap}"))
}

/// Bytes a bitmap of these dimensions occupies, row padding and palette
/// storage included.
fn allocation_bytes(width: u32, height: u32, bpp: u32) -> Result<u64, BitmapError> {
    let pitch = pad_to_pitch(bits_to_line(bpp, width)?) as u64;
    let palette = if bpp <= 8 { (1u64 << bpp) * 4 } else { 0 };
    Ok(pitch * u64::from(height) + palette)
}
