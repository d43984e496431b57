use alloc::string::String;

/// Errors from bitmap allocation, pixel views, conversion, and quantization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BitmapError {
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation requires a standard bitmap, got {0:?}")]
    UnsupportedImageType(crate::ImageType),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("palette size must be between 2 and 256, got {0}")]
    InvalidPaletteSize(u32),

    #[error("quantization requires a 24-bit truecolor source, got {bpp} bpp")]
    NotTruecolor { bpp: u32 },
}
