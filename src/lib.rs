//! # zendib
//!
//! In-memory DIB (device-independent bitmap) pixel engine: typed pixel
//! buffers, palettes, depth conversion, color quantization, and pixel
//! statistics. No file formats, no rendering — this crate is the layer
//! codecs and imaging pipelines sit on.
//!
//! ## Model
//!
//! A [`Bitmap`] is a bottom-up DIB: row 0 is the bottom of the image, rows
//! are padded to 4-byte boundaries, palette depths (1/4/8 bpp) carry a color
//! table of [`RgbQuad`] entries, 16 bpp carries 555 or 565 channel masks.
//! Depths above 8 bpp store pixels in blue-green-red channel order.
//!
//! Sub-byte pixels are reached through typed scanline views:
//! [`Bitmap::scanline`] hands back a [`PixelView`] over any
//! [`PixelElement`], from packed [`Bit1`] up to [`RgbaF`].
//!
//! ## Conversion
//!
//! [`convert`] moves a bitmap between depths. Downsampling to 8 bpp runs a
//! color quantizer ([`QuantizerKind::Wu`] by default), 1 bpp offers
//! thresholding and dithering, and a conversion that would change nothing
//! reports [`ConvertOutcome::Unchanged`] instead of copying.
//!
//! ```
//! use zendib::{convert, Bitmap, ConvertOptions, ConvertOutcome, TargetDepth};
//!
//! let mut src = Bitmap::allocate(4, 1, 24)?;
//! src.row_bytes_mut(0)?
//!     .copy_from_slice(&[0, 0, 255, 0, 255, 0, 255, 0, 0, 0, 0, 0]);
//!
//! let out = convert(&src, TargetDepth::EightBit, &ConvertOptions::new())?;
//! let ConvertOutcome::Converted(dst) = out else {
//!     unreachable!("depth changed");
//! };
//! assert_eq!(dst.bpp(), 8);
//! assert!(dst.palette().is_some());
//! # Ok::<(), zendib::BitmapError>(())
//! ```
//!
//! ## Non-Goals
//!
//! - Loading or saving any file format
//! - Geometry (scaling, rotation, cropping)
//! - ICC / color management

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod analysis;
mod bitmap;
mod buffer;
mod compare;
mod convert;
mod error;
mod limits;
mod metadata;
mod palette;
mod pixel;
mod quantize;
mod scanline;

// Re-exports
pub use analysis::{count_unique_colors, histogram, Channel};
pub use bitmap::{
    Bitmap, ColorType, BLUE_MASK_555, BLUE_MASK_565, GREEN_MASK_555, GREEN_MASK_565, RED_MASK_555,
    RED_MASK_565,
};
pub use buffer::{Bit1, Nibble4, PixelElement, PixelView, PixelViewMut};
pub use compare::{compare, CompareFlags};
pub use convert::{
    convert, convert_replacing, ConvertOptions, ConvertOutcome, DitherKind, TargetDepth,
};
pub use error::BitmapError;
pub use limits::Limits;
pub use metadata::{Metadata, TagValue};
pub use palette::{PaletteView, PaletteViewMut, RgbQuad, RgbTriple};
pub use pixel::{Complex, ImageType, Rgb16, RgbF, Rgba16, RgbaF};
pub use quantize::{quantize, QuantizerKind};
