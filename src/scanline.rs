//! Scanline access: pixel views bound to one bitmap row.

use crate::bitmap::Bitmap;
use crate::buffer::{PixelElement, PixelView, PixelViewMut};
use crate::error::BitmapError;

/// Number of `T` elements in one row, or an error when the row's bit width
/// does not divide evenly into `T`.
///
/// Sub-byte elements and bytes are special-cased: 1-bit and 4-bit views are
/// always `width` elements long, and a `u8` view covers the unpadded line
/// bytes whatever the depth.
fn row_elements<T: PixelElement>(dib: &Bitmap) -> Result<usize, BitmapError> {
    let width = dib.width() as usize;
    match T::BITS {
        1 | 4 => Ok(width),
        8 => Ok(dib.line()),
        bits => {
            let row_bits = dib.bpp() as usize * width;
            if row_bits % bits != 0 {
                return Err(BitmapError::InvalidArgument(alloc::format!(
                    "{} bpp row does not divide into {bits}-bit elements",
                    dib.bpp()
                )));
            }
            Ok(row_bits / bits)
        }
    }
}

impl Bitmap {
    /// Read-only typed view of one row. Row 0 is the bottom of the image.
    pub fn scanline<T: PixelElement>(&self, row: u32) -> Result<PixelView<'_, T>, BitmapError> {
        let len = row_elements::<T>(self)?;
        PixelView::new(self.row_bytes(row)?, len)
    }

    /// Mutable typed view of one row.
    pub fn scanline_mut<T: PixelElement>(
        &mut self,
        row: u32,
    ) -> Result<PixelViewMut<'_, T>, BitmapError> {
        let len = row_elements::<T>(self)?;
        PixelViewMut::new(self.row_bytes_mut(row)?, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Bit1, Nibble4};
    use crate::palette::RgbTriple;

    #[test]
    fn sub_byte_rows_span_width() {
        let dib = Bitmap::allocate(10, 3, 1).unwrap();
        assert_eq!(dib.scanline::<Bit1>(0).unwrap().len(), 10);

        let dib = Bitmap::allocate(5, 3, 4).unwrap();
        assert_eq!(dib.scanline::<Nibble4>(2).unwrap().len(), 5);
        // A byte view covers the packed line, nibble pairs included.
        assert_eq!(dib.scanline::<u8>(0).unwrap().len(), 3);
    }

    #[test]
    fn aligned_rows_divide_by_element() {
        let dib = Bitmap::allocate(6, 2, 24).unwrap();
        assert_eq!(dib.scanline::<RgbTriple>(0).unwrap().len(), 6);
        assert_eq!(dib.scanline::<u8>(0).unwrap().len(), 18);
        // 24-bit rows do not divide into 32-bit words for odd widths.
        assert!(dib.scanline::<u32>(1).is_err());

        let dib = Bitmap::allocate(4, 1, 16).unwrap();
        assert_eq!(dib.scanline::<u16>(0).unwrap().len(), 4);
    }

    #[test]
    fn row_bounds_checked() {
        let mut dib = Bitmap::allocate(4, 2, 8).unwrap();
        assert!(matches!(
            dib.scanline::<u8>(2),
            Err(BitmapError::OutOfRange { index: 2, len: 2 })
        ));
        assert!(dib.scanline_mut::<u8>(1).is_ok());
    }

    #[test]
    fn writes_land_in_row_storage() {
        let mut dib = Bitmap::allocate(3, 2, 8).unwrap();
        dib.scanline_mut::<u8>(1)
            .unwrap()
            .set_range(0, &[7, 8, 9])
            .unwrap();
        assert_eq!(dib.row_bytes(1).unwrap(), &[7, 8, 9]);
        assert_eq!(dib.row_bytes(0).unwrap(), &[0, 0, 0]);
    }
}
