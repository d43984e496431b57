//! Structural bitmap comparison.

use crate::bitmap::Bitmap;
use crate::buffer::{packed_eq, Bit1, Nibble4};

/// Which aspects [`compare`] inspects. Unselected aspects are ignored:
/// with `palette` off, two bitmaps differing only in their color tables
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareFlags {
    pub header: bool,
    pub palette: bool,
    pub pixel_data: bool,
    pub metadata: bool,
}

impl CompareFlags {
    /// Every aspect.
    pub const ALL: CompareFlags = CompareFlags {
        header: true,
        palette: true,
        pixel_data: true,
        metadata: true,
    };

    pub fn header(mut self, on: bool) -> Self {
        self.header = on;
        self
    }

    pub fn palette(mut self, on: bool) -> Self {
        self.palette = on;
        self
    }

    pub fn pixel_data(mut self, on: bool) -> Self {
        self.pixel_data = on;
        self
    }

    pub fn metadata(mut self, on: bool) -> Self {
        self.metadata = on;
        self
    }
}

impl Default for CompareFlags {
    fn default() -> Self {
        CompareFlags::ALL
    }
}

/// Compare two bitmaps under `flags`, short-circuiting on the first
/// difference. Pixel comparison is depth-aware: padding bytes and the unused
/// low bits of a partial final byte in sub-byte rows never affect the
/// result.
pub fn compare(a: &Bitmap, b: &Bitmap, flags: CompareFlags) -> bool {
    if flags.header && !headers_equal(a, b) {
        return false;
    }
    if flags.palette && !palettes_equal(a, b) {
        return false;
    }
    if flags.pixel_data {
        // Pixels are only comparable when the layout matches.
        if !headers_equal(a, b) || !pixels_equal(a, b) {
            return false;
        }
    }
    if flags.metadata && a.metadata() != b.metadata() {
        return false;
    }
    true
}

fn headers_equal(a: &Bitmap, b: &Bitmap) -> bool {
    a.width() == b.width()
        && a.height() == b.height()
        && a.bpp() == b.bpp()
        && a.image_type() == b.image_type()
        && a.masks() == b.masks()
}

fn palettes_equal(a: &Bitmap, b: &Bitmap) -> bool {
    match (a.palette(), b.palette()) {
        (None, None) => true,
        (Some(pa), Some(pb)) => pa.to_bytes() == pb.to_bytes(),
        _ => false,
    }
}

fn pixels_equal(a: &Bitmap, b: &Bitmap) -> bool {
    let width = a.width() as usize;
    for row in 0..a.height() {
        let (Ok(ra), Ok(rb)) = (a.row_bytes(row), b.row_bytes(row)) else {
            return false;
        };
        let equal = match a.bpp() {
            1 => packed_eq::<Bit1>(ra, rb, width),
            4 => packed_eq::<Nibble4>(ra, rb, width),
            _ => ra == rb,
        };
        if !equal {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TagValue;
    use crate::palette::RgbQuad;

    #[test]
    fn identical_bitmaps_compare_equal() {
        let a = Bitmap::allocate(5, 3, 8).unwrap();
        let b = Bitmap::allocate(5, 3, 8).unwrap();
        assert!(compare(&a, &b, CompareFlags::ALL));
    }

    #[test]
    fn header_mismatch_short_circuits() {
        let a = Bitmap::allocate(5, 3, 8).unwrap();
        let b = Bitmap::allocate(5, 4, 8).unwrap();
        assert!(!compare(&a, &b, CompareFlags::ALL));
        assert!(!compare(&a, &b, CompareFlags::ALL.header(false)));
    }

    #[test]
    fn trailing_bits_of_partial_bytes_are_ignored() {
        let mut a = Bitmap::allocate(5, 1, 1).unwrap();
        let mut b = Bitmap::allocate(5, 1, 1).unwrap();
        a.row_bytes_mut(0).unwrap()[0] = 0b1010_0000;
        // Same 5 leading bits, different junk in the low 3.
        b.row_bytes_mut(0).unwrap()[0] = 0b1010_0111;
        assert!(compare(&a, &b, CompareFlags::ALL));

        b.row_bytes_mut(0).unwrap()[0] = 0b1011_0111;
        assert!(!compare(&a, &b, CompareFlags::ALL));
    }

    #[test]
    fn palette_only_difference() {
        let a = Bitmap::allocate(4, 1, 8).unwrap();
        let mut b = Bitmap::allocate(4, 1, 8).unwrap();
        let mut entries = [RgbQuad::default(); 256];
        entries[0] = RgbQuad::new(1, 2, 3);
        b.set_palette(&entries).unwrap();
        assert!(!compare(&a, &b, CompareFlags::ALL));
        assert!(compare(&a, &b, CompareFlags::ALL.palette(false)));
    }

    #[test]
    fn metadata_difference() {
        let a = Bitmap::allocate(2, 2, 24).unwrap();
        let mut b = Bitmap::allocate(2, 2, 24).unwrap();
        b.metadata_mut()
            .set("Software", TagValue::Ascii("zendib".into()));
        assert!(!compare(&a, &b, CompareFlags::ALL));
        assert!(compare(&a, &b, CompareFlags::ALL.metadata(false)));
    }
}
