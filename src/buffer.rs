//! Typed views over packed pixel memory.
//!
//! [`PixelView`] and [`PixelViewMut`] give bounds-checked element access to a
//! contiguous packed pixel region. The element type selects the packing: the
//! byte-aligned types compile down to plain byte moves, while [`Bit1`] and
//! [`Nibble4`] carry the sub-byte bit arithmetic. Views borrow the bitmap's
//! pixel memory, so a view can never outlive a reallocation.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::error::BitmapError;
use crate::palette::{RgbQuad, RgbTriple};
use crate::pixel::{Complex, Rgb16, Rgba16, RgbF, RgbaF};

/// A fixed-size pixel element with a known packed layout.
///
/// `read`/`write` assume the index has already been bounds-checked by the
/// owning view and that the byte slice covers the element.
pub trait PixelElement: Copy + PartialEq {
    /// Packed size in bits: 1, 4, or a multiple of 8.
    const BITS: usize;

    fn read(bytes: &[u8], index: usize) -> Self;
    fn write(bytes: &mut [u8], index: usize, value: Self);
}

/// One bit, packed MSB-first: element `i` lives in bit `7 - i % 8` of byte
/// `i / 8`. Any nonzero value stores as 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bit1(pub u8);

impl PixelElement for Bit1 {
    const BITS: usize = 1;

    fn read(bytes: &[u8], index: usize) -> Self {
        let mask = 0x80 >> (index & 7);
        Bit1(u8::from(bytes[index >> 3] & mask != 0))
    }

    fn write(bytes: &mut [u8], index: usize, value: Self) {
        let mask = 0x80 >> (index & 7);
        if value.0 != 0 {
            bytes[index >> 3] |= mask;
        } else {
            bytes[index >> 3] &= !mask;
        }
    }
}

/// Four bits, high nibble first: element `i` is the high nibble of byte
/// `i / 2` when `i` is even, the low nibble when odd. Values store masked
/// to `0x0F`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Nibble4(pub u8);

impl PixelElement for Nibble4 {
    const BITS: usize = 4;

    fn read(bytes: &[u8], index: usize) -> Self {
        let byte = bytes[index >> 1];
        if index & 1 == 0 {
            Nibble4(byte >> 4)
        } else {
            Nibble4(byte & 0x0F)
        }
    }

    fn write(bytes: &mut [u8], index: usize, value: Self) {
        let slot = &mut bytes[index >> 1];
        if index & 1 == 0 {
            *slot = (*slot & 0x0F) | (value.0 << 4);
        } else {
            *slot = (*slot & 0xF0) | (value.0 & 0x0F);
        }
    }
}

macro_rules! le_scalar_element {
    ($($t:ty),*) => {$(
        impl PixelElement for $t {
            const BITS: usize = size_of::<$t>() * 8;

            fn read(bytes: &[u8], index: usize) -> Self {
                let off = index * size_of::<$t>();
                <$t>::from_le_bytes(bytes[off..off + size_of::<$t>()].try_into().unwrap())
            }

            fn write(bytes: &mut [u8], index: usize, value: Self) {
                let off = index * size_of::<$t>();
                bytes[off..off + size_of::<$t>()].copy_from_slice(&value.to_le_bytes());
            }
        }
    )*};
}

le_scalar_element!(u8, u16, i16, u32, i32, f32, f64);

impl PixelElement for Complex {
    const BITS: usize = 128;

    fn read(bytes: &[u8], index: usize) -> Self {
        let off = index * 16;
        Complex {
            re: f64::from_le_bytes(bytes[off..off + 8].try_into().unwrap()),
            im: f64::from_le_bytes(bytes[off + 8..off + 16].try_into().unwrap()),
        }
    }

    fn write(bytes: &mut [u8], index: usize, value: Self) {
        let off = index * 16;
        bytes[off..off + 8].copy_from_slice(&value.re.to_le_bytes());
        bytes[off + 8..off + 16].copy_from_slice(&value.im.to_le_bytes());
    }
}

macro_rules! channel_element {
    ($t:ty, $ch:ty, [$($field:ident),+]) => {
        impl PixelElement for $t {
            const BITS: usize = size_of::<$ch>() * 8 * channel_element!(@count $($field)+);

            fn read(bytes: &[u8], index: usize) -> Self {
                let ch = size_of::<$ch>();
                let mut off = index * (Self::BITS / 8);
                $(
                    let $field = <$ch>::from_le_bytes(bytes[off..off + ch].try_into().unwrap());
                    off += ch;
                )+
                let _ = off;
                Self { $($field),+ }
            }

            fn write(bytes: &mut [u8], index: usize, value: Self) {
                let ch = size_of::<$ch>();
                let mut off = index * (Self::BITS / 8);
                $(
                    bytes[off..off + ch].copy_from_slice(&value.$field.to_le_bytes());
                    off += ch;
                )+
                let _ = off;
            }
        }
    };
    (@count $x:ident) => { 1 };
    (@count $x:ident $($rest:ident)+) => { 1 + channel_element!(@count $($rest)+) };
}

channel_element!(Rgb16, u16, [r, g, b]);
channel_element!(Rgba16, u16, [r, g, b, a]);
channel_element!(RgbF, f32, [r, g, b]);
channel_element!(RgbaF, f32, [r, g, b, a]);

impl PixelElement for RgbTriple {
    const BITS: usize = 24;

    fn read(bytes: &[u8], index: usize) -> Self {
        let off = index * 3;
        RgbTriple {
            b: bytes[off],
            g: bytes[off + 1],
            r: bytes[off + 2],
        }
    }

    fn write(bytes: &mut [u8], index: usize, value: Self) {
        let off = index * 3;
        bytes[off] = value.b;
        bytes[off + 1] = value.g;
        bytes[off + 2] = value.r;
    }
}

impl PixelElement for RgbQuad {
    const BITS: usize = 32;

    fn read(bytes: &[u8], index: usize) -> Self {
        let off = index * 4;
        RgbQuad {
            b: bytes[off],
            g: bytes[off + 1],
            r: bytes[off + 2],
            reserved: bytes[off + 3],
        }
    }

    fn write(bytes: &mut [u8], index: usize, value: Self) {
        let off = index * 4;
        bytes[off] = value.b;
        bytes[off + 1] = value.g;
        bytes[off + 2] = value.r;
        bytes[off + 3] = value.reserved;
    }
}

/// Packed byte length of `len` elements of `T`.
pub(crate) fn byte_len<T: PixelElement>(len: usize) -> usize {
    (len * T::BITS).div_ceil(8)
}

fn check_index(index: usize, len: usize) -> Result<(), BitmapError> {
    if index < len {
        Ok(())
    } else {
        Err(BitmapError::OutOfRange { index, len })
    }
}

fn check_range(start: usize, count: usize, len: usize) -> Result<(), BitmapError> {
    let end = start.checked_add(count).ok_or(BitmapError::OutOfRange {
        index: usize::MAX,
        len,
    })?;
    if end <= len {
        Ok(())
    } else {
        Err(BitmapError::OutOfRange { index: end, len })
    }
}

/// Compare two packed regions holding `len` elements of `T`, masking any
/// trailing bits of a partial final byte.
pub(crate) fn packed_eq<T: PixelElement>(a: &[u8], b: &[u8], len: usize) -> bool {
    let total_bits = len * T::BITS;
    let full = total_bits / 8;
    if a[..full] != b[..full] {
        return false;
    }
    let rem = total_bits % 8;
    if rem == 0 {
        return true;
    }
    let mask = 0xFFu8 << (8 - rem);
    (a[full] & mask) == (b[full] & mask)
}

/// Read-only view over packed pixel elements.
#[derive(Debug)]
pub struct PixelView<'a, T: PixelElement> {
    bytes: &'a [u8],
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: PixelElement> PixelView<'a, T> {
    /// Bind a view to `len` elements at the start of `bytes`.
    pub fn new(bytes: &'a [u8], len: usize) -> Result<Self, BitmapError> {
        let need = byte_len::<T>(len);
        if bytes.len() < need {
            return Err(BitmapError::LengthMismatch {
                expected: need,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: &bytes[..need],
            len,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Result<T, BitmapError> {
        check_index(index, self.len)?;
        Ok(T::read(self.bytes, index))
    }

    pub fn get_range(&self, start: usize, count: usize) -> Result<Vec<T>, BitmapError> {
        check_range(start, count, self.len)?;
        Ok((start..start + count)
            .map(|i| T::read(self.bytes, i))
            .collect())
    }

    /// Copy `count` elements into `dest`, starting at `src_start` here and
    /// `dest_start` there.
    pub fn copy_to(
        &self,
        dest: &mut PixelViewMut<'_, T>,
        src_start: usize,
        dest_start: usize,
        count: usize,
    ) -> Result<(), BitmapError> {
        check_range(src_start, count, self.len)?;
        check_range(dest_start, count, dest.len)?;
        for i in 0..count {
            let v = T::read(self.bytes, src_start + i);
            T::write(dest.bytes, dest_start + i, v);
        }
        Ok(())
    }

    /// The exact packed representation, sub-byte lengths rounded up to whole
    /// bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(|i| T::read(self.bytes, i))
    }
}

impl<T: PixelElement> PartialEq for PixelView<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && packed_eq::<T>(self.bytes, other.bytes, self.len)
    }
}

/// Mutable view over packed pixel elements. Writes go straight to the
/// underlying bitmap memory; there is no copy-on-write.
#[derive(Debug)]
pub struct PixelViewMut<'a, T: PixelElement> {
    bytes: &'a mut [u8],
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: PixelElement> PixelViewMut<'a, T> {
    pub fn new(bytes: &'a mut [u8], len: usize) -> Result<Self, BitmapError> {
        let need = byte_len::<T>(len);
        if bytes.len() < need {
            return Err(BitmapError::LengthMismatch {
                expected: need,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: &mut bytes[..need],
            len,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Result<T, BitmapError> {
        check_index(index, self.len)?;
        Ok(T::read(self.bytes, index))
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), BitmapError> {
        check_index(index, self.len)?;
        T::write(self.bytes, index, value);
        Ok(())
    }

    pub fn get_range(&self, start: usize, count: usize) -> Result<Vec<T>, BitmapError> {
        check_range(start, count, self.len)?;
        Ok((start..start + count)
            .map(|i| T::read(self.bytes, i))
            .collect())
    }

    pub fn set_range(&mut self, start: usize, values: &[T]) -> Result<(), BitmapError> {
        check_range(start, values.len(), self.len)?;
        for (i, v) in values.iter().enumerate() {
            T::write(self.bytes, start + i, *v);
        }
        Ok(())
    }

    /// Copy `count` elements out of `src`, starting at `src_start` there and
    /// `dest_start` here.
    pub fn copy_from(
        &mut self,
        src: &PixelView<'_, T>,
        src_start: usize,
        dest_start: usize,
        count: usize,
    ) -> Result<(), BitmapError> {
        check_range(src_start, count, src.len)?;
        check_range(dest_start, count, self.len)?;
        for i in 0..count {
            let v = T::read(src.bytes, src_start + i);
            T::write(self.bytes, dest_start + i, v);
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(|i| T::read(self.bytes, i))
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> PixelView<'_, T> {
        PixelView {
            bytes: self.bytes,
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<T: PixelElement> PartialEq for PixelViewMut<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && packed_eq::<T>(self.bytes, other.bytes, self.len)
    }
}
