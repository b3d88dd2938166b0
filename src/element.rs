//! Element kinds and typed element buffers.
//!
//! The engine never reinterprets memory. Host values hand their storage to the I/O layer as an
//! [`Elements`] / [`ElementsMut`] value: a correctly typed slice selected by an explicit `match`
//! over the element kind. Byte-tagged buffers ([`crate::dense::DenseBuffer`]) use the
//! [`Elements::Packed`] variant, which carries the [`DataType`] tag next to native-endian bytes.
//!
//! Fixed-width kinds convert between the two representations with [`FixedWidth::write_ne`] /
//! [`FixedWidth::read_ne`], a byte copy per element.
use std::{borrow::Cow, fmt};

use crate::{dtype::DataType, error::ArrayError};

/// Single-byte character element.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Char(pub u8);

/// A scalar type the engine knows how to store.
///
/// Implemented for every [`DataType`] except [`DataType::Nothing`].
pub trait Element: Clone + Default + fmt::Debug + 'static {
    const TYPE: DataType;

    fn elements(slice: &[Self]) -> Elements<'_>;

    fn elements_mut(slice: &mut [Self]) -> ElementsMut<'_>;
}

/// An [`Element`] with a fixed byte width.
pub trait FixedWidth: Element + Copy {
    const WIDTH: usize;

    /// Write the native-endian representation into `out` (`out.len() == WIDTH`).
    fn write_ne(self, out: &mut [u8]);

    /// Read a value from its native-endian representation (`bytes.len() == WIDTH`).
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_numeric_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const TYPE: DataType = DataType::$variant;

            fn elements(slice: &[Self]) -> Elements<'_> {
                Elements::$variant(slice)
            }

            fn elements_mut(slice: &mut [Self]) -> ElementsMut<'_> {
                ElementsMut::$variant(slice)
            }
        }

        impl FixedWidth for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn write_ne(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_ne_bytes());
            }

            fn read_ne(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(buf)
            }
        }
    };
}

impl_numeric_element!(f32, F32);
impl_numeric_element!(f64, F64);
impl_numeric_element!(i8, I8);
impl_numeric_element!(i16, I16);
impl_numeric_element!(i32, I32);
impl_numeric_element!(i64, I64);
impl_numeric_element!(u8, U8);
impl_numeric_element!(u16, U16);
impl_numeric_element!(u32, U32);
impl_numeric_element!(u64, U64);

impl Element for bool {
    const TYPE: DataType = DataType::Bool;

    fn elements(slice: &[Self]) -> Elements<'_> {
        Elements::Bool(slice)
    }

    fn elements_mut(slice: &mut [Self]) -> ElementsMut<'_> {
        ElementsMut::Bool(slice)
    }
}

impl FixedWidth for bool {
    const WIDTH: usize = 1;

    fn write_ne(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    fn read_ne(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl Element for Char {
    const TYPE: DataType = DataType::Char;

    fn elements(slice: &[Self]) -> Elements<'_> {
        Elements::Char(slice)
    }

    fn elements_mut(slice: &mut [Self]) -> ElementsMut<'_> {
        ElementsMut::Char(slice)
    }
}

impl FixedWidth for Char {
    const WIDTH: usize = 1;

    fn write_ne(self, out: &mut [u8]) {
        out[0] = self.0;
    }

    fn read_ne(bytes: &[u8]) -> Self {
        Char(bytes[0])
    }
}

impl Element for String {
    const TYPE: DataType = DataType::String;

    fn elements(slice: &[Self]) -> Elements<'_> {
        Elements::String(slice)
    }

    fn elements_mut(slice: &mut [Self]) -> ElementsMut<'_> {
        ElementsMut::String(slice)
    }
}

/// Borrowed, read-only element storage of a host value.
#[derive(Debug, Clone, Copy)]
pub enum Elements<'a> {
    Bool(&'a [bool]),
    Char(&'a [Char]),
    F32(&'a [f32]),
    F64(&'a [f64]),
    I8(&'a [i8]),
    I16(&'a [i16]),
    I32(&'a [i32]),
    I64(&'a [i64]),
    U8(&'a [u8]),
    U16(&'a [u16]),
    U32(&'a [u32]),
    U64(&'a [u64]),
    String(&'a [String]),
    /// `len` elements of a fixed-width kind as native-endian bytes.
    Packed {
        data_type: DataType,
        len: usize,
        bytes: &'a [u8],
    },
}

/// Borrowed, writable element storage of a host value.
#[derive(Debug)]
pub enum ElementsMut<'a> {
    Bool(&'a mut [bool]),
    Char(&'a mut [Char]),
    F32(&'a mut [f32]),
    F64(&'a mut [f64]),
    I8(&'a mut [i8]),
    I16(&'a mut [i16]),
    I32(&'a mut [i32]),
    I64(&'a mut [i64]),
    U8(&'a mut [u8]),
    U16(&'a mut [u16]),
    U32(&'a mut [u32]),
    U64(&'a mut [u64]),
    String(&'a mut [String]),
    /// `len` elements of a fixed-width kind as native-endian bytes.
    Packed {
        data_type: DataType,
        len: usize,
        bytes: &'a mut [u8],
    },
}

fn pack<T: FixedWidth>(values: &[T]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * T::WIDTH];
    for (value, chunk) in values.iter().zip(out.chunks_exact_mut(T::WIDTH)) {
        value.write_ne(chunk);
    }
    out
}

fn unpack<T: FixedWidth>(bytes: &[u8], out: &mut [T]) {
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::WIDTH)) {
        *value = T::read_ne(chunk);
    }
}

/// A numeric element widened for conversion between kinds.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

trait Numeric: FixedWidth {
    fn widen(self) -> Number;

    /// Integers saturate at the bounds of `Self`; floats truncate towards zero.
    fn narrow(number: Number) -> Self;
}

macro_rules! impl_int_numeric {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn widen(self) -> Number {
                    Number::Int(self as i128)
                }

                fn narrow(number: Number) -> Self {
                    match number {
                        Number::Int(v) => <$ty>::try_from(v)
                            .unwrap_or(if v < 0 { <$ty>::MIN } else { <$ty>::MAX }),
                        Number::Float(v) => v as $ty,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_float_numeric {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn widen(self) -> Number {
                    Number::Float(self as f64)
                }

                fn narrow(number: Number) -> Self {
                    match number {
                        Number::Int(v) => v as $ty,
                        Number::Float(v) => v as $ty,
                    }
                }
            }
        )*
    };
}

impl_int_numeric!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_float_numeric!(f32, f64);

fn widen_all<T: Numeric>(bytes: &[u8]) -> Vec<Number> {
    bytes
        .chunks_exact(T::WIDTH)
        .map(|chunk| T::read_ne(chunk).widen())
        .collect()
}

fn narrow_all<T: Numeric>(values: &[Number]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * T::WIDTH];
    for (value, chunk) in values.iter().zip(out.chunks_exact_mut(T::WIDTH)) {
        T::narrow(*value).write_ne(chunk);
    }
    out
}

/// Convert native-endian `bytes` of numeric kind `from` into kind `to`.
///
/// # Errors
/// [`ArrayError::DataTypeMismatch`] unless both kinds are numeric.
pub(crate) fn convert_packed(
    from: DataType,
    bytes: &[u8],
    to: DataType,
) -> Result<Vec<u8>, ArrayError> {
    let mismatch = || ArrayError::DataTypeMismatch {
        expected: from,
        actual: to,
    };
    let values = match from {
        DataType::F32 => widen_all::<f32>(bytes),
        DataType::F64 => widen_all::<f64>(bytes),
        DataType::I8 => widen_all::<i8>(bytes),
        DataType::I16 => widen_all::<i16>(bytes),
        DataType::I32 => widen_all::<i32>(bytes),
        DataType::I64 => widen_all::<i64>(bytes),
        DataType::U8 => widen_all::<u8>(bytes),
        DataType::U16 => widen_all::<u16>(bytes),
        DataType::U32 => widen_all::<u32>(bytes),
        DataType::U64 => widen_all::<u64>(bytes),
        _ => return Err(mismatch()),
    };
    let converted = match to {
        DataType::F32 => narrow_all::<f32>(&values),
        DataType::F64 => narrow_all::<f64>(&values),
        DataType::I8 => narrow_all::<i8>(&values),
        DataType::I16 => narrow_all::<i16>(&values),
        DataType::I32 => narrow_all::<i32>(&values),
        DataType::I64 => narrow_all::<i64>(&values),
        DataType::U8 => narrow_all::<u8>(&values),
        DataType::U16 => narrow_all::<u16>(&values),
        DataType::U32 => narrow_all::<u32>(&values),
        DataType::U64 => narrow_all::<u64>(&values),
        _ => return Err(mismatch()),
    };
    Ok(converted)
}

impl<'a> Elements<'a> {
    pub fn data_type(&self) -> DataType {
        match self {
            Elements::Bool(_) => DataType::Bool,
            Elements::Char(_) => DataType::Char,
            Elements::F32(_) => DataType::F32,
            Elements::F64(_) => DataType::F64,
            Elements::I8(_) => DataType::I8,
            Elements::I16(_) => DataType::I16,
            Elements::I32(_) => DataType::I32,
            Elements::I64(_) => DataType::I64,
            Elements::U8(_) => DataType::U8,
            Elements::U16(_) => DataType::U16,
            Elements::U32(_) => DataType::U32,
            Elements::U64(_) => DataType::U64,
            Elements::String(_) => DataType::String,
            Elements::Packed { data_type, .. } => *data_type,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Elements::Bool(s) => s.len(),
            Elements::Char(s) => s.len(),
            Elements::F32(s) => s.len(),
            Elements::F64(s) => s.len(),
            Elements::I8(s) => s.len(),
            Elements::I16(s) => s.len(),
            Elements::I32(s) => s.len(),
            Elements::I64(s) => s.len(),
            Elements::U8(s) => s.len(),
            Elements::U16(s) => s.len(),
            Elements::U32(s) => s.len(),
            Elements::U64(s) => s.len(),
            Elements::String(s) => s.len(),
            Elements::Packed { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Native-endian bytes of a fixed-width buffer.
    ///
    /// Borrows for [`Elements::Packed`], encodes a copy for typed slices.
    ///
    /// # Errors
    /// Returns [`ArrayError::UnsupportedVariableWidth`] for string elements.
    pub fn to_packed(&self) -> Result<Cow<'a, [u8]>, ArrayError> {
        let packed = match *self {
            Elements::Bool(s) => pack(s),
            Elements::Char(s) => pack(s),
            Elements::F32(s) => pack(s),
            Elements::F64(s) => pack(s),
            Elements::I8(s) => pack(s),
            Elements::I16(s) => pack(s),
            Elements::I32(s) => pack(s),
            Elements::I64(s) => pack(s),
            Elements::U8(s) => pack(s),
            Elements::U16(s) => pack(s),
            Elements::U32(s) => pack(s),
            Elements::U64(s) => pack(s),
            Elements::String(_) => return Err(ArrayError::UnsupportedVariableWidth),
            Elements::Packed { bytes, .. } => return Ok(Cow::Borrowed(bytes)),
        };
        Ok(Cow::Owned(packed))
    }

    pub fn as_strings(&self) -> Option<&'a [String]> {
        match *self {
            Elements::String(s) => Some(s),
            _ => None,
        }
    }
}

impl ElementsMut<'_> {
    pub fn data_type(&self) -> DataType {
        self.as_elements().data_type()
    }

    pub fn len(&self) -> usize {
        self.as_elements().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrow as a read-only view.
    pub fn as_elements(&self) -> Elements<'_> {
        match self {
            ElementsMut::Bool(s) => Elements::Bool(s),
            ElementsMut::Char(s) => Elements::Char(s),
            ElementsMut::F32(s) => Elements::F32(s),
            ElementsMut::F64(s) => Elements::F64(s),
            ElementsMut::I8(s) => Elements::I8(s),
            ElementsMut::I16(s) => Elements::I16(s),
            ElementsMut::I32(s) => Elements::I32(s),
            ElementsMut::I64(s) => Elements::I64(s),
            ElementsMut::U8(s) => Elements::U8(s),
            ElementsMut::U16(s) => Elements::U16(s),
            ElementsMut::U32(s) => Elements::U32(s),
            ElementsMut::U64(s) => Elements::U64(s),
            ElementsMut::String(s) => Elements::String(s),
            ElementsMut::Packed {
                data_type,
                len,
                bytes,
            } => Elements::Packed {
                data_type: *data_type,
                len: *len,
                bytes,
            },
        }
    }

    /// Overwrite every element from native-endian `bytes`.
    ///
    /// # Errors
    /// - [`ArrayError::UnsupportedVariableWidth`] for string elements
    /// - [`ArrayError::WrongElementCount`] if `bytes` doesn't hold exactly `len()` elements
    pub fn unpack_from(&mut self, bytes: &[u8]) -> Result<(), ArrayError> {
        let data_type = self.data_type();
        if data_type.is_variable_sized() {
            return Err(ArrayError::UnsupportedVariableWidth);
        }
        let expected = self.len();
        let width = data_type.width();
        if expected * width != bytes.len() {
            return Err(ArrayError::WrongElementCount {
                expected,
                actual: bytes.len().checked_div(width).unwrap_or(0),
            });
        }

        match self {
            ElementsMut::Bool(s) => unpack(bytes, s),
            ElementsMut::Char(s) => unpack(bytes, s),
            ElementsMut::F32(s) => unpack(bytes, s),
            ElementsMut::F64(s) => unpack(bytes, s),
            ElementsMut::I8(s) => unpack(bytes, s),
            ElementsMut::I16(s) => unpack(bytes, s),
            ElementsMut::I32(s) => unpack(bytes, s),
            ElementsMut::I64(s) => unpack(bytes, s),
            ElementsMut::U8(s) => unpack(bytes, s),
            ElementsMut::U16(s) => unpack(bytes, s),
            ElementsMut::U32(s) => unpack(bytes, s),
            ElementsMut::U64(s) => unpack(bytes, s),
            ElementsMut::String(_) => return Err(ArrayError::UnsupportedVariableWidth),
            ElementsMut::Packed { bytes: dst, .. } => dst.copy_from_slice(bytes),
        }
        Ok(())
    }

    pub fn as_strings_mut(&mut self) -> Option<&mut [String]> {
        match self {
            ElementsMut::String(s) => Some(&mut **s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_slices_report_their_kind() {
        let values = [1.5f64, -2.0];
        let elements = f64::elements(&values);
        assert_eq!(elements.data_type(), DataType::F64);
        assert_eq!(elements.len(), 2);

        let strings = vec!["a".to_string()];
        assert_eq!(String::elements(&strings).data_type(), DataType::String);
    }

    #[test]
    fn pack_then_unpack_into_other_kind_of_buffer() {
        let values = [1i16, -7, 300];
        let packed = i16::elements(&values).to_packed().unwrap();
        assert_eq!(packed.len(), 6);

        let mut out = [0i16; 3];
        i16::elements_mut(&mut out).unpack_from(&packed).unwrap();
        assert_eq!(out, values);

        let mut raw = vec![0u8; 6];
        ElementsMut::Packed {
            data_type: DataType::I16,
            len: 3,
            bytes: &mut raw,
        }
        .unpack_from(&packed)
        .unwrap();
        assert_eq!(&raw[..], &packed[..]);
    }

    #[test]
    fn bools_and_chars_are_single_bytes() {
        let packed = bool::elements(&[true, false, true]).to_packed().unwrap();
        assert_eq!(&packed[..], &[1, 0, 1]);

        let mut chars = [Char::default(); 2];
        Char::elements_mut(&mut chars).unpack_from(b"hi").unwrap();
        assert_eq!(chars, [Char(b'h'), Char(b'i')]);
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        let mut out = [0u32; 2];
        let err = u32::elements_mut(&mut out).unpack_from(&[0u8; 4]).unwrap_err();
        assert!(matches!(
            err,
            ArrayError::WrongElementCount {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn numeric_kinds_convert() {
        let doubles = f64::elements(&[1.0, 2.0, 3.7, -1.5]).to_packed().unwrap();
        let converted = convert_packed(DataType::F64, &doubles, DataType::I32).unwrap();
        let mut ints = [0i32; 4];
        i32::elements_mut(&mut ints).unpack_from(&converted).unwrap();
        assert_eq!(ints, [1, 2, 3, -1]);

        let wide = i32::elements(&[300, -5, 7]).to_packed().unwrap();
        let narrow = convert_packed(DataType::I32, &wide, DataType::U8).unwrap();
        assert_eq!(narrow, vec![255, 0, 7]);

        let back = convert_packed(DataType::U8, &narrow, DataType::F32).unwrap();
        let mut floats = [0f32; 3];
        f32::elements_mut(&mut floats).unpack_from(&back).unwrap();
        assert_eq!(floats, [255.0, 0.0, 7.0]);
    }

    #[test]
    fn non_numeric_kinds_do_not_convert() {
        let bools = bool::elements(&[true]).to_packed().unwrap();
        assert!(matches!(
            convert_packed(DataType::Bool, &bools, DataType::U8),
            Err(ArrayError::DataTypeMismatch { .. })
        ));
        assert!(matches!(
            convert_packed(DataType::U8, &[65], DataType::Char),
            Err(ArrayError::DataTypeMismatch { .. })
        ));
    }

    #[test]
    fn strings_cannot_be_packed() {
        let strings = vec!["x".to_string()];
        assert!(matches!(
            String::elements(&strings).to_packed(),
            Err(ArrayError::UnsupportedVariableWidth)
        ));
    }
}
