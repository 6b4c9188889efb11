//! Element format definitions shared across the ring buffer workspace.
//!
//! This crate is the registry of the twelve fixed-width numeric element kinds
//! the ring buffer, the typed array adapter and the concatenation helper can
//! carry. Every format is identified by the one-character tag used by C-style
//! buffer descriptors and carries its byte width, numeric kind and range as
//! constant data. Nothing here is mutable, so the table is shared freely
//! between threads.

#![cfg_attr(not(test), no_std)]

use core::ffi::{
    c_int, c_long, c_longlong, c_schar, c_short, c_uchar, c_uint, c_ulong, c_ulonglong, c_ushort,
};
use core::fmt;
use core::mem::size_of;

/// Numeric limits of the native C types backing each format.
///
/// Names and semantics follow `<limits.h>` and `<float.h>`. In particular
/// `FLT_MIN` and `DBL_MIN` are the smallest positive normal values, not the
/// most negative ones.
pub mod limits {
    use core::ffi::{
        c_int, c_long, c_longlong, c_schar, c_short, c_uchar, c_uint, c_ulong, c_ulonglong,
        c_ushort,
    };

    pub const SCHAR_MIN: c_schar = c_schar::MIN;
    pub const SCHAR_MAX: c_schar = c_schar::MAX;
    pub const UCHAR_MAX: c_uchar = c_uchar::MAX;
    pub const SHRT_MIN: c_short = c_short::MIN;
    pub const SHRT_MAX: c_short = c_short::MAX;
    pub const USHRT_MAX: c_ushort = c_ushort::MAX;
    pub const INT_MIN: c_int = c_int::MIN;
    pub const INT_MAX: c_int = c_int::MAX;
    pub const UINT_MAX: c_uint = c_uint::MAX;
    pub const LONG_MIN: c_long = c_long::MIN;
    pub const LONG_MAX: c_long = c_long::MAX;
    pub const ULONG_MAX: c_ulong = c_ulong::MAX;
    pub const LLONG_MIN: c_longlong = c_longlong::MIN;
    pub const LLONG_MAX: c_longlong = c_longlong::MAX;
    pub const ULLONG_MAX: c_ulonglong = c_ulonglong::MAX;
    pub const FLT_MIN: f32 = f32::MIN_POSITIVE;
    pub const FLT_MAX: f32 = f32::MAX;
    pub const DBL_MIN: f64 = f64::MIN_POSITIVE;
    pub const DBL_MAX: f64 = f64::MAX;
}

/// Element format tag.
///
/// The discriminant of each variant is the ASCII tag character, so a format
/// round-trips through `u8`/`char` without a lookup.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `signed char`
    SChar = b'b',
    /// `unsigned char`
    UChar = b'B',
    /// `short`
    Short = b'h',
    /// `unsigned short`
    UShort = b'H',
    /// `int`
    Int = b'i',
    /// `unsigned int`
    UInt = b'I',
    /// `long`, whose width follows the target's C ABI.
    Long = b'l',
    /// `unsigned long`
    ULong = b'L',
    /// `long long`
    LongLong = b'q',
    /// `unsigned long long`
    ULongLong = b'Q',
    /// IEEE-754 binary32.
    Float = b'f',
    /// IEEE-754 binary64.
    Double = b'd',
}

/// Numeric family of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Signed,
    Unsigned,
    Float,
}

/// A bound of a format's numeric range, widened to the largest type of its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Limit {
    /// The bound as `f64`. Lossy for 64-bit integers.
    pub fn as_f64(self) -> f64 {
        match self {
            Limit::Signed(v) => v as f64,
            Limit::Unsigned(v) => v as f64,
            Limit::Float(v) => v,
        }
    }
}

impl Format {
    /// Every supported format, in tag order.
    pub const ALL: [Format; 12] = [
        Format::SChar,
        Format::UChar,
        Format::Short,
        Format::UShort,
        Format::Int,
        Format::UInt,
        Format::Long,
        Format::ULong,
        Format::LongLong,
        Format::ULongLong,
        Format::Float,
        Format::Double,
    ];

    /// Looks up a format by its tag character.
    ///
    /// Returns `None` for any character outside `bBhHiIlLqQfd`.
    pub const fn from_tag(tag: char) -> Option<Format> {
        Some(match tag {
            'b' => Format::SChar,
            'B' => Format::UChar,
            'h' => Format::Short,
            'H' => Format::UShort,
            'i' => Format::Int,
            'I' => Format::UInt,
            'l' => Format::Long,
            'L' => Format::ULong,
            'q' => Format::LongLong,
            'Q' => Format::ULongLong,
            'f' => Format::Float,
            'd' => Format::Double,
            _ => return None,
        })
    }

    #[inline(always)]
    pub const fn tag(self) -> char {
        self as u8 as char
    }

    /// Width of one element in bytes.
    #[inline(always)]
    pub const fn itemsize(self) -> usize {
        match self {
            Format::SChar => size_of::<c_schar>(),
            Format::UChar => size_of::<c_uchar>(),
            Format::Short => size_of::<c_short>(),
            Format::UShort => size_of::<c_ushort>(),
            Format::Int => size_of::<c_int>(),
            Format::UInt => size_of::<c_uint>(),
            Format::Long => size_of::<c_long>(),
            Format::ULong => size_of::<c_ulong>(),
            Format::LongLong => size_of::<c_longlong>(),
            Format::ULongLong => size_of::<c_ulonglong>(),
            Format::Float => size_of::<f32>(),
            Format::Double => size_of::<f64>(),
        }
    }

    pub const fn kind(self) -> Kind {
        match self {
            Format::SChar | Format::Short | Format::Int | Format::Long | Format::LongLong => {
                Kind::Signed
            }
            Format::UChar | Format::UShort | Format::UInt | Format::ULong | Format::ULongLong => {
                Kind::Unsigned
            }
            Format::Float | Format::Double => Kind::Float,
        }
    }

    /// Smallest representable value (the most negative finite value for floats).
    pub const fn min(self) -> Limit {
        match self {
            Format::SChar => Limit::Signed(c_schar::MIN as i64),
            Format::Short => Limit::Signed(c_short::MIN as i64),
            Format::Int => Limit::Signed(c_int::MIN as i64),
            Format::Long => Limit::Signed(c_long::MIN as i64),
            Format::LongLong => Limit::Signed(c_longlong::MIN as i64),
            Format::UChar
            | Format::UShort
            | Format::UInt
            | Format::ULong
            | Format::ULongLong => Limit::Unsigned(0),
            Format::Float => Limit::Float(f32::MIN as f64),
            Format::Double => Limit::Float(f64::MIN),
        }
    }

    /// Largest representable finite value.
    pub const fn max(self) -> Limit {
        match self {
            Format::SChar => Limit::Signed(c_schar::MAX as i64),
            Format::Short => Limit::Signed(c_short::MAX as i64),
            Format::Int => Limit::Signed(c_int::MAX as i64),
            Format::Long => Limit::Signed(c_long::MAX as i64),
            Format::LongLong => Limit::Signed(c_longlong::MAX as i64),
            Format::UChar => Limit::Unsigned(c_uchar::MAX as u64),
            Format::UShort => Limit::Unsigned(c_ushort::MAX as u64),
            Format::UInt => Limit::Unsigned(c_uint::MAX as u64),
            Format::ULong => Limit::Unsigned(c_ulong::MAX as u64),
            Format::ULongLong => Limit::Unsigned(c_ulonglong::MAX as u64),
            Format::Float => Limit::Float(f32::MAX as f64),
            Format::Double => Limit::Float(f64::MAX),
        }
    }

    /// Whether elements of `other` share this format's kind and width.
    ///
    /// `Long` and `LongLong` are layout compatible on LP64 targets, `Long`
    /// and `Int` on LLP64 targets. Formats that are layout compatible can
    /// exchange elements with a plain byte copy.
    #[inline(always)]
    pub const fn is_layout_compatible(self, other: Format) -> bool {
        self.itemsize() == other.itemsize() && self.kind() as u8 == other.kind() as u8
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.tag())
    }
}

mod private {
    pub trait Sealed {}
}

/// A Rust type that stores one element of a [`Format`].
///
/// # Safety
///
/// Implementors must be plain-old-data: every bit pattern of
/// `FORMAT.itemsize()` bytes is a valid value, there is no padding, and
/// `align_of::<Self>() <= size_of::<Self>() == FORMAT.itemsize()`. The trait is
/// sealed and implemented only for the primitive numeric types.
pub unsafe trait Element:
    Copy + PartialEq + Default + fmt::Debug + Send + Sync + 'static + private::Sealed
{
    /// Format this type is stored as.
    const FORMAT: Format;

    /// Saturating conversion from `f64`, used to synthesize test signals.
    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;
}

macro_rules! impl_element {
    ($($ty:ty => $format:ident),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            unsafe impl Element for $ty {
                const FORMAT: Format = Format::$format;

                #[inline(always)]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                #[inline(always)]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_element! {
    i8 => SChar,
    u8 => UChar,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => LongLong,
    u64 => ULongLong,
    f32 => Float,
    f64 => Double,
}

/// Runs `$body` with `$ty` bound to the native Rust type of `$format`.
///
/// ```
/// use ringbuf_common::{with_element, Format};
///
/// let width = with_element!(Format::Short, T => core::mem::size_of::<T>());
/// assert_eq!(width, 2);
/// ```
#[macro_export]
macro_rules! with_element {
    ($format:expr, $ty:ident => $body:expr) => {
        match $format {
            $crate::Format::SChar => {
                type $ty = ::core::ffi::c_schar;
                $body
            }
            $crate::Format::UChar => {
                type $ty = ::core::ffi::c_uchar;
                $body
            }
            $crate::Format::Short => {
                type $ty = ::core::ffi::c_short;
                $body
            }
            $crate::Format::UShort => {
                type $ty = ::core::ffi::c_ushort;
                $body
            }
            $crate::Format::Int => {
                type $ty = ::core::ffi::c_int;
                $body
            }
            $crate::Format::UInt => {
                type $ty = ::core::ffi::c_uint;
                $body
            }
            $crate::Format::Long => {
                type $ty = ::core::ffi::c_long;
                $body
            }
            $crate::Format::ULong => {
                type $ty = ::core::ffi::c_ulong;
                $body
            }
            $crate::Format::LongLong => {
                type $ty = ::core::ffi::c_longlong;
                $body
            }
            $crate::Format::ULongLong => {
                type $ty = ::core::ffi::c_ulonglong;
                $body
            }
            $crate::Format::Float => {
                type $ty = f32;
                $body
            }
            $crate::Format::Double => {
                type $ty = f64;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for format in Format::ALL {
            assert_eq!(Format::from_tag(format.tag()), Some(format));
        }
        assert_eq!(Format::from_tag('x'), None);
        assert_eq!(Format::from_tag('e'), None);
    }

    #[test]
    fn itemsizes_match_native_types() {
        assert_eq!(Format::SChar.itemsize(), 1);
        assert_eq!(Format::UChar.itemsize(), 1);
        assert_eq!(Format::Short.itemsize(), 2);
        assert_eq!(Format::UShort.itemsize(), 2);
        assert_eq!(Format::Int.itemsize(), 4);
        assert_eq!(Format::UInt.itemsize(), 4);
        assert_eq!(Format::Long.itemsize(), size_of::<c_long>());
        assert_eq!(Format::ULong.itemsize(), size_of::<c_ulong>());
        assert_eq!(Format::LongLong.itemsize(), 8);
        assert_eq!(Format::ULongLong.itemsize(), 8);
        assert_eq!(Format::Float.itemsize(), 4);
        assert_eq!(Format::Double.itemsize(), 8);
    }

    #[test]
    fn with_element_binds_matching_type() {
        for format in Format::ALL {
            let (width, compatible) = with_element!(format, T => (
                size_of::<T>(),
                <T as Element>::FORMAT.is_layout_compatible(format),
            ));
            assert_eq!(width, format.itemsize());
            assert!(compatible, "{format}");
        }
    }

    #[test]
    fn ranges_follow_limits() {
        assert_eq!(Format::SChar.min(), Limit::Signed(limits::SCHAR_MIN as i64));
        assert_eq!(Format::UShort.max(), Limit::Unsigned(limits::USHRT_MAX as u64));
        assert_eq!(Format::Long.max(), Limit::Signed(limits::LONG_MAX as i64));
        assert_eq!(Format::ULongLong.max(), Limit::Unsigned(u64::MAX));
        assert_eq!(Format::Double.max(), Limit::Float(limits::DBL_MAX));
        assert_eq!(Format::Float.min(), Limit::Float(-(limits::FLT_MAX as f64)));
    }

    #[test]
    fn layout_compatibility() {
        assert!(Format::Int.is_layout_compatible(Format::Int));
        assert!(!Format::Int.is_layout_compatible(Format::UInt));
        assert!(!Format::Int.is_layout_compatible(Format::Float));
        assert!(!Format::LongLong.is_layout_compatible(Format::Double));
        if size_of::<c_long>() == 8 {
            assert!(Format::Long.is_layout_compatible(Format::LongLong));
        }
    }
}
