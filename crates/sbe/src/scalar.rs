// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Fixed-width little-endian primitive codec.
//!
//! Every SBE primitive occupies a fixed number of bytes at a fixed offset within its block.
//! Reads and writes never touch bytes outside `[offset, offset + width)`.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::{SbeError, SbeResult};

/// SBE primitive type of a fixed-width field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum ScalarKind {
    #[strum(to_string = "int8")]
    Int8,
    #[strum(to_string = "uint8")]
    UInt8,
    #[strum(to_string = "int16")]
    Int16,
    #[strum(to_string = "uint16")]
    UInt16,
    #[strum(to_string = "int32")]
    Int32,
    #[strum(to_string = "uint32")]
    UInt32,
    #[strum(to_string = "int64")]
    Int64,
    #[strum(to_string = "uint64")]
    UInt64,
    #[strum(to_string = "float", serialize = "float32")]
    Float,
    #[strum(to_string = "double", serialize = "float64")]
    Double,
}

impl ScalarKind {
    /// Parses an SBE primitive type name (`int8`, `uint16`, `double`, ...).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKind` if the name is not a known primitive.
    pub fn parse(name: &str) -> SbeResult<Self> {
        Self::from_str(name).map_err(|_| SbeError::UnsupportedKind(name.to_string()))
    }

    /// Encoded width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
        }
    }

    /// Returns the SBE null value for this kind.
    ///
    /// Signed integers use `MIN`, unsigned integers use `MAX` and floats use NaN.
    #[must_use]
    pub const fn null_value(self) -> ScalarValue {
        match self {
            Self::Int8 => ScalarValue::Int8(i8::MIN),
            Self::UInt8 => ScalarValue::UInt8(u8::MAX),
            Self::Int16 => ScalarValue::Int16(i16::MIN),
            Self::UInt16 => ScalarValue::UInt16(u16::MAX),
            Self::Int32 => ScalarValue::Int32(i32::MIN),
            Self::UInt32 => ScalarValue::UInt32(u32::MAX),
            Self::Int64 => ScalarValue::Int64(i64::MIN),
            Self::UInt64 => ScalarValue::UInt64(u64::MAX),
            Self::Float => ScalarValue::Float(f32::NAN),
            Self::Double => ScalarValue::Double(f64::NAN),
        }
    }

    /// Returns the unsigned width for this kind, if it is an unsigned integer.
    #[must_use]
    pub const fn as_uint_width(self) -> Option<UintWidth> {
        match self {
            Self::UInt8 => Some(UintWidth::U8),
            Self::UInt16 => Some(UintWidth::U16),
            Self::UInt32 => Some(UintWidth::U32),
            Self::UInt64 => Some(UintWidth::U64),
            _ => None,
        }
    }
}

/// A decoded (or to-be-encoded) primitive value, one variant per [`ScalarKind`].
///
/// Equality is bitwise for floats, so a NaN null equals itself.
#[derive(Clone, Copy, Debug)]
pub enum ScalarValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::UInt8(a), Self::UInt8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::UInt16(a), Self::UInt16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl ScalarValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Int8(_) => ScalarKind::Int8,
            Self::UInt8(_) => ScalarKind::UInt8,
            Self::Int16(_) => ScalarKind::Int16,
            Self::UInt16(_) => ScalarKind::UInt16,
            Self::Int32(_) => ScalarKind::Int32,
            Self::UInt32(_) => ScalarKind::UInt32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::UInt64(_) => ScalarKind::UInt64,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
        }
    }

    /// Returns true if this is the SBE null value for its kind.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Float(v) => v.is_nan(),
            Self::Double(v) => v.is_nan(),
            other => *other == other.kind().null_value(),
        }
    }

    /// Returns the value widened to `i64`, if it is an integer that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int8(v) => Some(i64::from(v)),
            Self::UInt8(v) => Some(i64::from(v)),
            Self::Int16(v) => Some(i64::from(v)),
            Self::UInt16(v) => Some(i64::from(v)),
            Self::Int32(v) => Some(i64::from(v)),
            Self::UInt32(v) => Some(i64::from(v)),
            Self::Int64(v) => Some(v),
            Self::UInt64(v) => i64::try_from(v).ok(),
            Self::Float(_) | Self::Double(_) => None,
        }
    }

    /// Returns the value widened to `u64`, if it is a non-negative integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::UInt8(v) => Some(u64::from(v)),
            Self::UInt16(v) => Some(u64::from(v)),
            Self::UInt32(v) => Some(u64::from(v)),
            Self::UInt64(v) => Some(v),
            Self::Float(_) | Self::Double(_) => None,
            signed => signed.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    /// Returns the value as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int8(v) => f64::from(v),
            Self::UInt8(v) => f64::from(v),
            Self::Int16(v) => f64::from(v),
            Self::UInt16(v) => f64::from(v),
            Self::Int32(v) => f64::from(v),
            Self::UInt32(v) => f64::from(v),
            Self::Int64(v) => v as f64,
            Self::UInt64(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }

    fn put_le(&self, dst: &mut [u8]) {
        match *self {
            Self::Int8(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::UInt8(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Int16(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::UInt16(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Int32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::UInt32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Int64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::UInt64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Float(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Self::Double(v) => dst.copy_from_slice(&v.to_le_bytes()),
        }
    }
}

macro_rules! impl_scalar_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<ScalarValue> for $ty {
                type Error = SbeError;

                fn try_from(value: ScalarValue) -> Result<Self, Self::Error> {
                    match value {
                        ScalarValue::$variant(v) => Ok(v),
                        other => Err(SbeError::ValueKindMismatch {
                            expected: ScalarKind::$variant,
                            actual: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_scalar_conversions!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
);

/// Width of an unsigned length, count or header field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum UintWidth {
    #[strum(to_string = "uint8")]
    U8,
    #[strum(to_string = "uint16")]
    U16,
    #[strum(to_string = "uint32")]
    U32,
    #[strum(to_string = "uint64")]
    U64,
}

impl UintWidth {
    /// Parses an unsigned SBE primitive type name.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKind` if the name is not `uint8`, `uint16`, `uint32` or `uint64`.
    pub fn parse(name: &str) -> SbeResult<Self> {
        Self::from_str(name).map_err(|_| SbeError::UnsupportedKind(name.to_string()))
    }

    /// Encoded width in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Largest value representable at this width.
    #[must_use]
    pub const fn max_value(self) -> u64 {
        match self {
            Self::U8 => u8::MAX as u64,
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
            Self::U64 => u64::MAX,
        }
    }

    /// Returns true if `value` is representable at this width.
    #[must_use]
    pub const fn fits(self, value: u64) -> bool {
        value <= self.max_value()
    }

    /// Returns the matching scalar kind.
    #[must_use]
    pub const fn kind(self) -> ScalarKind {
        match self {
            Self::U8 => ScalarKind::UInt8,
            Self::U16 => ScalarKind::UInt16,
            Self::U32 => ScalarKind::UInt32,
            Self::U64 => ScalarKind::UInt64,
        }
    }

    /// Reads an unsigned value of this width at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooShort` if the field would run past the buffer.
    pub fn read(self, buf: &[u8], offset: usize) -> SbeResult<u64> {
        let bytes = field_slice(buf, offset, self.size())?;
        let mut raw = [0u8; 8];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Appends `value` in little-endian order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if `value` does not fit this width. Callers with a more
    /// specific error check [`UintWidth::fits`] first.
    pub fn append(self, out: &mut Vec<u8>, value: u64) -> SbeResult<()> {
        if !self.fits(value) {
            return Err(SbeError::InvalidHeader(format!(
                "value {value} does not fit {self}"
            )));
        }
        out.extend_from_slice(&value.to_le_bytes()[..self.size()]);
        Ok(())
    }
}

#[inline]
fn field_slice(buf: &[u8], offset: usize, width: usize) -> SbeResult<&[u8]> {
    match offset.checked_add(width) {
        Some(end) if end <= buf.len() => Ok(&buf[offset..end]),
        end => Err(SbeError::BufferTooShort {
            expected: end.unwrap_or(usize::MAX),
            actual: buf.len(),
        }),
    }
}

#[inline]
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut raw = [0u8; N];
    raw.copy_from_slice(bytes);
    raw
}

/// Reads a scalar of `kind` at `offset`.
///
/// Returns the value and the number of bytes read.
///
/// # Errors
///
/// Returns `BufferTooShort` if `offset + width(kind)` exceeds the buffer.
pub fn read_scalar(buf: &[u8], offset: usize, kind: ScalarKind) -> SbeResult<(ScalarValue, usize)> {
    let width = kind.width();
    let bytes = field_slice(buf, offset, width)?;

    let value = match kind {
        ScalarKind::Int8 => ScalarValue::Int8(i8::from_le_bytes(le_array(bytes))),
        ScalarKind::UInt8 => ScalarValue::UInt8(bytes[0]),
        ScalarKind::Int16 => ScalarValue::Int16(i16::from_le_bytes(le_array(bytes))),
        ScalarKind::UInt16 => ScalarValue::UInt16(u16::from_le_bytes(le_array(bytes))),
        ScalarKind::Int32 => ScalarValue::Int32(i32::from_le_bytes(le_array(bytes))),
        ScalarKind::UInt32 => ScalarValue::UInt32(u32::from_le_bytes(le_array(bytes))),
        ScalarKind::Int64 => ScalarValue::Int64(i64::from_le_bytes(le_array(bytes))),
        ScalarKind::UInt64 => ScalarValue::UInt64(u64::from_le_bytes(le_array(bytes))),
        ScalarKind::Float => ScalarValue::Float(f32::from_le_bytes(le_array(bytes))),
        ScalarKind::Double => ScalarValue::Double(f64::from_le_bytes(le_array(bytes))),
    };

    Ok((value, width))
}

/// Writes `value` as `kind` at `offset`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns `ValueKindMismatch` if `value` is not of `kind`, or `BufferTooShort` if
/// `offset + width(kind)` exceeds the buffer.
pub fn write_scalar(
    buf: &mut [u8],
    offset: usize,
    kind: ScalarKind,
    value: ScalarValue,
) -> SbeResult<usize> {
    if value.kind() != kind {
        return Err(SbeError::ValueKindMismatch {
            expected: kind,
            actual: value.kind(),
        });
    }

    let width = kind.width();
    let len = buf.len();
    match offset.checked_add(width) {
        Some(end) if end <= len => {
            value.put_le(&mut buf[offset..end]);
            Ok(width)
        }
        end => Err(SbeError::BufferTooShort {
            expected: end.unwrap_or(usize::MAX),
            actual: len,
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(ScalarKind::Int8, 1)]
    #[case(ScalarKind::UInt8, 1)]
    #[case(ScalarKind::Int16, 2)]
    #[case(ScalarKind::UInt16, 2)]
    #[case(ScalarKind::Int32, 4)]
    #[case(ScalarKind::UInt32, 4)]
    #[case(ScalarKind::Int64, 8)]
    #[case(ScalarKind::UInt64, 8)]
    #[case(ScalarKind::Float, 4)]
    #[case(ScalarKind::Double, 8)]
    fn test_kind_widths(#[case] kind: ScalarKind, #[case] width: usize) {
        assert_eq!(kind.width(), width);
    }

    #[rstest]
    #[case("int8", ScalarKind::Int8)]
    #[case("uint64", ScalarKind::UInt64)]
    #[case("float", ScalarKind::Float)]
    #[case("float32", ScalarKind::Float)]
    #[case("double", ScalarKind::Double)]
    #[case("float64", ScalarKind::Double)]
    fn test_parse_kind(#[case] name: &str, #[case] expected: ScalarKind) {
        assert_eq!(ScalarKind::parse(name).unwrap(), expected);
    }

    #[rstest]
    fn test_parse_unsupported_kind() {
        let err = ScalarKind::parse("int128").unwrap_err();
        assert_eq!(err, SbeError::UnsupportedKind("int128".to_string()));
    }

    #[rstest]
    fn test_display_round_trips_through_parse() {
        for kind in ScalarKind::iter() {
            assert_eq!(ScalarKind::parse(&kind.to_string()).unwrap(), kind);
        }
    }

    #[rstest]
    fn test_read_u16_little_endian() {
        let buf = [0x34, 0x12];
        let (value, read) = read_scalar(&buf, 0, ScalarKind::UInt16).unwrap();
        assert_eq!(value, ScalarValue::UInt16(0x1234));
        assert_eq!(read, 2);
    }

    #[rstest]
    fn test_read_i8_negative() {
        let buf = [0x7F, 0x80];
        assert_eq!(
            read_scalar(&buf, 1, ScalarKind::Int8).unwrap().0,
            ScalarValue::Int8(-128)
        );
    }

    #[rstest]
    fn test_write_touches_only_field_bytes() {
        let mut buf = [0xAAu8; 12];
        let written = write_scalar(&mut buf, 2, ScalarKind::Int64, ScalarValue::Int64(-2)).unwrap();

        assert_eq!(written, 8);
        assert_eq!(&buf[..2], &[0xAA, 0xAA]);
        assert_eq!(&buf[2..10], &(-2i64).to_le_bytes());
        assert_eq!(&buf[10..], &[0xAA, 0xAA]);
    }

    #[rstest]
    fn test_read_past_end_fails() {
        let buf = [0u8; 7];
        let err = read_scalar(&buf, 0, ScalarKind::Double).unwrap_err();
        assert_eq!(
            err,
            SbeError::BufferTooShort {
                expected: 8,
                actual: 7
            }
        );
    }

    #[rstest]
    fn test_write_past_end_fails() {
        let mut buf = [0u8; 4];
        let err = write_scalar(&mut buf, 2, ScalarKind::UInt32, ScalarValue::UInt32(1)).unwrap_err();
        assert_eq!(
            err,
            SbeError::BufferTooShort {
                expected: 6,
                actual: 4
            }
        );
        assert_eq!(buf, [0u8; 4]);
    }

    #[rstest]
    fn test_offset_overflow_fails() {
        let buf = [0u8; 4];
        let err = read_scalar(&buf, usize::MAX, ScalarKind::UInt16).unwrap_err();
        assert!(matches!(err, SbeError::BufferTooShort { .. }));
    }

    #[rstest]
    fn test_write_kind_mismatch() {
        let mut buf = [0u8; 8];
        let err = write_scalar(&mut buf, 0, ScalarKind::Int64, ScalarValue::Int32(5)).unwrap_err();
        assert_eq!(
            err,
            SbeError::ValueKindMismatch {
                expected: ScalarKind::Int64,
                actual: ScalarKind::Int32,
            }
        );
    }

    #[rstest]
    #[case(ScalarValue::Int8(i8::MIN))]
    #[case(ScalarValue::UInt8(u8::MAX))]
    #[case(ScalarValue::Int16(-300))]
    #[case(ScalarValue::UInt16(65_000))]
    #[case(ScalarValue::Int32(-123_456))]
    #[case(ScalarValue::UInt32(4_000_000_000))]
    #[case(ScalarValue::Int64(i64::MAX))]
    #[case(ScalarValue::UInt64(u64::MAX - 1))]
    #[case(ScalarValue::Float(1.5))]
    #[case(ScalarValue::Double(-0.000_125))]
    fn test_round_trip(#[case] value: ScalarValue) {
        let mut buf = [0u8; 16];
        let kind = value.kind();
        write_scalar(&mut buf, 3, kind, value).unwrap();
        assert_eq!(read_scalar(&buf, 3, kind).unwrap(), (value, kind.width()));
    }

    #[rstest]
    fn test_null_values() {
        for kind in ScalarKind::iter() {
            assert!(kind.null_value().is_null(), "{kind} null value");
        }
        assert!(!ScalarValue::Int64(0).is_null());
        assert!(!ScalarValue::Double(0.0).is_null());
    }

    #[rstest]
    fn test_null_floats_equal_themselves() {
        for kind in [ScalarKind::Float, ScalarKind::Double] {
            let mut buf = [0u8; 8];
            write_scalar(&mut buf, 0, kind, kind.null_value()).unwrap();
            let (decoded, _) = read_scalar(&buf, 0, kind).unwrap();
            assert_eq!(decoded, kind.null_value());
        }
        assert_eq!(ScalarValue::Double(f64::NAN), ScalarValue::Double(f64::NAN));
        assert_ne!(ScalarValue::Double(0.0), ScalarValue::Double(-0.0));
        assert_ne!(ScalarValue::Float(1.0), ScalarValue::Double(1.0));
    }

    #[rstest]
    fn test_try_from_scalar() {
        assert_eq!(i64::try_from(ScalarValue::Int64(7)).unwrap(), 7);
        assert!(matches!(
            u8::try_from(ScalarValue::Int8(7)),
            Err(SbeError::ValueKindMismatch { .. })
        ));
    }

    #[rstest]
    fn test_widening() {
        assert_eq!(ScalarValue::UInt32(7).as_i64(), Some(7));
        assert_eq!(ScalarValue::Int8(-1).as_u64(), None);
        assert_eq!(ScalarValue::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(ScalarValue::Float(f32::NAN).as_i64(), None);
        assert!((ScalarValue::Int16(-2).as_f64() + 2.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(UintWidth::U8, 1, 255)]
    #[case(UintWidth::U16, 2, 65_535)]
    #[case(UintWidth::U32, 4, 4_294_967_295)]
    fn test_uint_width(#[case] width: UintWidth, #[case] size: usize, #[case] max: u64) {
        assert_eq!(width.size(), size);
        assert_eq!(width.max_value(), max);
        assert!(width.fits(max));
        assert!(!width.fits(max + 1));
        assert_eq!(width.kind().width(), size);
        assert_eq!(width.kind().as_uint_width(), Some(width));
    }

    #[rstest]
    fn test_uint_width_append_and_read() {
        let mut out = Vec::new();
        UintWidth::U32.append(&mut out, 7).unwrap();
        UintWidth::U16.append(&mut out, 0x0102).unwrap();

        assert_eq!(out, vec![7, 0, 0, 0, 0x02, 0x01]);
        assert_eq!(UintWidth::U32.read(&out, 0).unwrap(), 7);
        assert_eq!(UintWidth::U16.read(&out, 4).unwrap(), 0x0102);
        assert!(UintWidth::U8.append(&mut out, 256).is_err());
    }
}
