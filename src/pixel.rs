/// Pixel storage type of a bitmap.
///
/// `Bitmap` covers the standard 1/4/8/16/24/32 bpp layouts; the remaining
/// variants are the extended per-pixel encodings, each with a fixed size.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// Standard bitmap; bit depth carried separately (1, 4, 8, 16, 24, 32).
    Bitmap,
    /// 16-bit unsigned integer per pixel.
    UInt16,
    /// 16-bit signed integer per pixel.
    Int16,
    /// 32-bit unsigned integer per pixel.
    UInt32,
    /// 32-bit signed integer per pixel.
    Int32,
    /// 32-bit float per pixel.
    Float,
    /// 64-bit float per pixel.
    Double,
    /// Complex number per pixel (two 64-bit floats).
    Complex,
    /// 48-bit channel triple (three 16-bit values).
    Rgb16,
    /// 64-bit channel quad (four 16-bit values).
    Rgba16,
    /// 96-bit float triple.
    RgbF,
    /// 128-bit float quad.
    RgbaF,
}

impl ImageType {
    /// Bits per pixel for the extended types; `None` for [`ImageType::Bitmap`],
    /// whose depth is a property of the bitmap, not the type tag.
    pub fn fixed_bits_per_pixel(self) -> Option<u32> {
        match self {
            Self::Bitmap => None,
            Self::UInt16 | Self::Int16 => Some(16),
            Self::UInt32 | Self::Int32 | Self::Float => Some(32),
            Self::Double => Some(64),
            Self::Complex | Self::RgbaF => Some(128),
            Self::Rgb16 => Some(48),
            Self::Rgba16 => Some(64),
            Self::RgbF => Some(96),
        }
    }
}

/// Complex-valued pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

/// 48-bit pixel: three 16-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

/// 64-bit pixel: four 16-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

/// 96-bit pixel: three float channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RgbF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// 128-bit pixel: four float channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RgbaF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}
