//! The owned device-independent bitmap.
//!
//! Pixel rows are stored bottom-up (row 0 is the bottom of the image) and
//! padded so every row starts on a 4-byte boundary. All views handed out by
//! [`Bitmap`] borrow this storage.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::BitmapError;
use crate::limits::Limits;
use crate::metadata::Metadata;
use crate::palette::{greyscale_ramp, PaletteView, PaletteViewMut, RgbQuad};
use crate::pixel::ImageType;

/// 16-bit 5-5-5 channel masks.
pub const RED_MASK_555: u32 = 0x7C00;
pub const GREEN_MASK_555: u32 = 0x03E0;
pub const BLUE_MASK_555: u32 = 0x001F;

/// 16-bit 5-6-5 channel masks.
pub const RED_MASK_565: u32 = 0xF800;
pub const GREEN_MASK_565: u32 = 0x07E0;
pub const BLUE_MASK_565: u32 = 0x001F;

/// Classification of how a bitmap's pixels encode color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorType {
    /// Greyscale palette, darkest entry first.
    MinIsBlack,
    /// Greyscale palette, brightest entry first.
    MinIsWhite,
    /// Arbitrary color palette.
    Palette,
    /// Truecolor without meaningful alpha.
    Rgb,
    /// Truecolor with an alpha channel in use.
    RgbAlpha,
}

/// An owned DIB: header fields, bottom-up padded pixel storage, optional
/// color table, and opaque metadata.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    bpp: u32,
    image_type: ImageType,
    pitch: usize,
    data: Vec<u8>,
    /// 4 bytes per entry, empty unless bpp <= 8.
    palette: Vec<u8>,
    red_mask: u32,
    green_mask: u32,
    blue_mask: u32,
    metadata: Metadata,
}

impl Bitmap {
    /// Allocate a standard bitmap. For 16 bpp the default masks are 5-5-5;
    /// use [`Bitmap::allocate_with_masks`] for 5-6-5.
    ///
    /// Palette depths (1, 4, 8 bpp) start with a full-size linear greyscale
    /// color table.
    pub fn allocate(width: u32, height: u32, bpp: u32) -> Result<Self, BitmapError> {
        let (r, g, b) = match bpp {
            16 => (RED_MASK_555, GREEN_MASK_555, BLUE_MASK_555),
            _ => (0, 0, 0),
        };
        Self::allocate_with_masks(width, height, bpp, r, g, b)
    }

    /// Allocate a standard bitmap with explicit 16-bit channel masks.
    pub fn allocate_with_masks(
        width: u32,
        height: u32,
        bpp: u32,
        red_mask: u32,
        green_mask: u32,
        blue_mask: u32,
    ) -> Result<Self, BitmapError> {
        if !matches!(bpp, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(BitmapError::InvalidArgument(alloc::format!(
                "unsupported bit depth {bpp}"
            )));
        }
        let mut dib = Self::build(width, height, bpp, ImageType::Bitmap)?;
        if bpp <= 8 {
            dib.palette = quads_to_bytes(&greyscale_ramp(1usize << bpp));
        }
        if bpp == 16 {
            dib.red_mask = red_mask;
            dib.green_mask = green_mask;
            dib.blue_mask = blue_mask;
        }
        Ok(dib)
    }

    /// Allocate an extended-type bitmap (integer, float, complex, or
    /// wide-channel pixels). [`ImageType::Bitmap`] is rejected: standard
    /// bitmaps carry their depth as an argument to [`Bitmap::allocate`].
    pub fn allocate_typed(
        width: u32,
        height: u32,
        image_type: ImageType,
    ) -> Result<Self, BitmapError> {
        match image_type.fixed_bits_per_pixel() {
            Some(bits) => Self::build(width, height, bits, image_type),
            None => Err(BitmapError::InvalidArgument(alloc::format!(
                "{image_type:?} carries no fixed depth; use allocate with an explicit bpp"
            ))),
        }
    }

    /// Allocate with resource limits enforced before any memory is reserved.
    pub fn allocate_with_limits(
        width: u32,
        height: u32,
        bpp: u32,
        limits: &Limits,
    ) -> Result<Self, BitmapError> {
        limits.check(width, height, bpp)?;
        Self::allocate(width, height, bpp)
    }

    fn build(
        width: u32,
        height: u32,
        bpp: u32,
        image_type: ImageType,
    ) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::InvalidArgument(alloc::format!(
                "zero dimension: {width}x{height}"
            )));
        }
        let line = bits_to_line(bpp, width)?;
        let pitch = pad_to_pitch(line);
        let size = pitch
            .checked_mul(height as usize)
            .ok_or(BitmapError::DimensionsTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            bpp,
            image_type,
            pitch,
            data: vec![0u8; size],
            palette: Vec::new(),
            red_mask: 0,
            green_mask: 0,
            blue_mask: 0,
            metadata: Metadata::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bpp(&self) -> u32 {
        self.bpp
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Bytes per row without padding.
    pub fn line(&self) -> usize {
        (self.bpp as usize * self.width as usize).div_ceil(8)
    }

    /// Bytes per row including padding to the 4-byte boundary.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// 16-bit channel masks `(red, green, blue)`; zero for other depths.
    pub fn masks(&self) -> (u32, u32, u32) {
        (self.red_mask, self.green_mask, self.blue_mask)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Unpadded bytes of one row. Row 0 is the bottom of the image.
    pub fn row_bytes(&self, row: u32) -> Result<&[u8], BitmapError> {
        self.check_row(row)?;
        let start = row as usize * self.pitch;
        Ok(&self.data[start..start + self.line()])
    }

    pub fn row_bytes_mut(&mut self, row: u32) -> Result<&mut [u8], BitmapError> {
        self.check_row(row)?;
        let start = row as usize * self.pitch;
        let line = self.line();
        Ok(&mut self.data[start..start + line])
    }

    pub(crate) fn check_row(&self, row: u32) -> Result<(), BitmapError> {
        if row >= self.height {
            return Err(BitmapError::OutOfRange {
                index: row as usize,
                len: self.height as usize,
            });
        }
        Ok(())
    }

    /// Number of palette entries; 0 for depths above 8 bpp.
    pub fn colors_used(&self) -> usize {
        self.palette.len() / 4
    }

    pub fn palette(&self) -> Option<PaletteView<'_>> {
        if self.palette.is_empty() {
            None
        } else {
            Some(PaletteView::new(&self.palette))
        }
    }

    pub fn palette_mut(&mut self) -> Option<PaletteViewMut<'_>> {
        if self.palette.is_empty() {
            None
        } else {
            Some(PaletteViewMut::new(&mut self.palette))
        }
    }

    /// Replace the color table. Only valid for palette depths, and the entry
    /// count may not exceed `2^bpp`.
    pub fn set_palette(&mut self, entries: &[RgbQuad]) -> Result<(), BitmapError> {
        if self.bpp > 8 {
            return Err(BitmapError::InvalidArgument(alloc::format!(
                "{} bpp bitmaps have no palette",
                self.bpp
            )));
        }
        let max = 1usize << self.bpp;
        if entries.is_empty() || entries.len() > max {
            return Err(BitmapError::OutOfRange {
                index: entries.len(),
                len: max,
            });
        }
        self.palette = quads_to_bytes(entries);
        Ok(())
    }

    /// Classify the pixel encoding: palette depths are inspected for
    /// greyscale ramps, 32 bpp scans for a live alpha channel.
    pub fn color_type(&self) -> ColorType {
        match self.image_type {
            ImageType::Bitmap => {}
            ImageType::Rgba16 | ImageType::RgbaF => return ColorType::RgbAlpha,
            ImageType::Rgb16 | ImageType::RgbF => return ColorType::Rgb,
            _ => return ColorType::MinIsBlack,
        }
        match self.bpp {
            1 | 4 | 8 => {
                let pal = self.palette().expect("palette depths carry a table");
                if !pal.is_greyscale() {
                    return ColorType::Palette;
                }
                let first = pal.get(0).map(|e| e.r).unwrap_or(0);
                let last = pal.get(pal.len() - 1).map(|e| e.r).unwrap_or(255);
                if first > last {
                    ColorType::MinIsWhite
                } else {
                    ColorType::MinIsBlack
                }
            }
            32 => {
                // Alpha counts as in use only when the channel carries
                // information: all-0xFF (opaque) and all-zero (never
                // written) both classify as plain RGB.
                let mut any_opaque = false;
                let mut any_zero = false;
                let mut any_partial = false;
                for row in 0..self.height {
                    let bytes = self.row_bytes(row).expect("row in range");
                    for px in bytes.chunks_exact(4) {
                        match px[3] {
                            0xFF => any_opaque = true,
                            0 => any_zero = true,
                            _ => any_partial = true,
                        }
                    }
                }
                if any_partial || (any_opaque && any_zero) {
                    ColorType::RgbAlpha
                } else {
                    ColorType::Rgb
                }
            }
            _ => ColorType::Rgb,
        }
    }

    /// Whether the bitmap is greyscale: a grey palette ramp for palette
    /// depths, always false for truecolor.
    pub fn is_greyscale(&self) -> bool {
        matches!(
            self.color_type(),
            ColorType::MinIsBlack | ColorType::MinIsWhite
        )
    }

    pub(crate) fn pixel_data(&self) -> &[u8] {
        &self.data
    }
}

pub(crate) fn quads_to_bytes(entries: &[RgbQuad]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(entries.len() * 4);
    for e in entries {
        bytes.extend_from_slice(&[e.b, e.g, e.r, e.reserved]);
    }
    bytes
}

pub(crate) fn bits_to_line(bpp: u32, width: u32) -> Result<usize, BitmapError> {
    (bpp as usize)
        .checked_mul(width as usize)
        .map(|bits| bits.div_ceil(8))
        .ok_or(BitmapError::DimensionsTooLarge { width, height: 0 })
}

pub(crate) fn pad_to_pitch(line: usize) -> usize {
    (line + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_word_aligned() {
        let dib = Bitmap::allocate(3, 2, 24).unwrap();
        assert_eq!(dib.line(), 9);
        assert_eq!(dib.pitch(), 12);

        let dib = Bitmap::allocate(17, 1, 1).unwrap();
        assert_eq!(dib.line(), 3);
        assert_eq!(dib.pitch(), 4);
    }

    #[test]
    fn palette_depths_get_grey_ramp() {
        let dib = Bitmap::allocate(4, 4, 4).unwrap();
        assert_eq!(dib.colors_used(), 16);
        assert!(dib.is_greyscale());
        assert_eq!(dib.color_type(), ColorType::MinIsBlack);

        let dib = Bitmap::allocate(4, 4, 24).unwrap();
        assert!(dib.palette().is_none());
        assert_eq!(dib.color_type(), ColorType::Rgb);
    }

    #[test]
    fn inverted_ramp_is_min_is_white() {
        let mut dib = Bitmap::allocate(2, 2, 1).unwrap();
        dib.set_palette(&[RgbQuad::new(255, 255, 255), RgbQuad::new(0, 0, 0)])
            .unwrap();
        assert_eq!(dib.color_type(), ColorType::MinIsWhite);
    }

    #[test]
    fn alpha_scan_classifies_32bpp() {
        let mut dib = Bitmap::allocate(2, 1, 32).unwrap();
        assert_eq!(dib.color_type(), ColorType::Rgb);
        dib.row_bytes_mut(0).unwrap()[3] = 128;
        assert_eq!(dib.color_type(), ColorType::RgbAlpha);
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            Bitmap::allocate(0, 5, 8),
            Err(BitmapError::InvalidArgument(_))
        ));
        assert!(matches!(
            Bitmap::allocate(5, 5, 13),
            Err(BitmapError::InvalidArgument(_))
        ));
    }

    #[test]
    fn limits_enforced_at_allocation() {
        let limits = Limits {
            max_pixels: Some(4),
            ..Default::default()
        };
        assert!(Bitmap::allocate_with_limits(2, 2, 8, &limits).is_ok());
        assert!(matches!(
            Bitmap::allocate_with_limits(3, 2, 8, &limits),
            Err(BitmapError::LimitExceeded(_))
        ));
    }

    #[test]
    fn typed_allocation_uses_fixed_width() {
        let dib = Bitmap::allocate_typed(3, 1, ImageType::Rgb16).unwrap();
        assert_eq!(dib.bpp(), 48);
        assert_eq!(dib.line(), 18);
        assert_eq!(dib.image_type(), ImageType::Rgb16);
        assert_eq!(dib.color_type(), ColorType::Rgb);
    }

    #[test]
    fn typed_allocation_rejects_the_standard_type() {
        assert!(matches!(
            Bitmap::allocate_typed(3, 1, ImageType::Bitmap),
            Err(BitmapError::InvalidArgument(_))
        ));
    }
}
