use super::dtype::Dtype;
use crate::array::nest;
use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use num_traits::ToPrimitive;
use serde_json::{Number, Value as JsonValue};

/// Element data of a decoded array, one variant per [`Dtype`].
///
/// Elements are stored in row-major (C) order.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    /// `<f8`
    F64(Vec<f64>),
    /// `<f4`
    F32(Vec<f32>),
    /// `<f2`
    F16(Vec<f16>),
    /// `<i8`
    I64(Vec<i64>),
    /// `<i4`
    I32(Vec<i32>),
    /// `<i2`
    I16(Vec<i16>),
    /// `<i1`
    I8(Vec<i8>),
    /// `|u8`
    U64(Vec<u64>),
    /// `|u4`
    U32(Vec<u32>),
    /// `|u2`
    U16(Vec<u16>),
    /// `|u1`
    U8(Vec<u8>),
}

/// Evaluates `$body` with `$v` bound to the `Vec` inside any variant.
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::F64($v) => $body,
            ArrayData::F32($v) => $body,
            ArrayData::F16($v) => $body,
            ArrayData::I64($v) => $body,
            ArrayData::I32($v) => $body,
            ArrayData::I16($v) => $body,
            ArrayData::I8($v) => $body,
            ArrayData::U64($v) => $body,
            ArrayData::U32($v) => $body,
            ArrayData::U16($v) => $body,
            ArrayData::U8($v) => $body,
        }
    };
}

/// Reads `len` little-endian elements with a `ByteOrder::read_*_into` method.
macro_rules! read_le_into {
    ($read:ident, $bytes:expr, $len:expr, $zero:expr) => {{
        let mut out = vec![$zero; $len];
        LittleEndian::$read($bytes, &mut out);
        out
    }};
}

impl ArrayData {
    /// Decodes densely packed little-endian elements of type `dtype`.
    ///
    /// `bytes.len()` must be a multiple of `dtype.width()`.
    pub(crate) fn from_le_bytes(dtype: Dtype, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len() % dtype.width(), 0);
        let len = bytes.len() / dtype.width();
        match dtype {
            Dtype::F64 => Self::F64(read_le_into!(read_f64_into, bytes, len, 0.)),
            Dtype::F32 => Self::F32(read_le_into!(read_f32_into, bytes, len, 0.)),
            Dtype::F16 => {
                let bits = read_le_into!(read_u16_into, bytes, len, 0);
                Self::F16(bits.into_iter().map(f16::from_bits).collect())
            }
            Dtype::I64 => Self::I64(read_le_into!(read_i64_into, bytes, len, 0)),
            Dtype::I32 => Self::I32(read_le_into!(read_i32_into, bytes, len, 0)),
            Dtype::I16 => Self::I16(read_le_into!(read_i16_into, bytes, len, 0)),
            Dtype::I8 => Self::I8(bytes.iter().map(|&b| b as i8).collect()),
            Dtype::U64 => Self::U64(read_le_into!(read_u64_into, bytes, len, 0)),
            Dtype::U32 => Self::U32(read_le_into!(read_u32_into, bytes, len, 0)),
            Dtype::U16 => Self::U16(read_le_into!(read_u16_into, bytes, len, 0)),
            Dtype::U8 => Self::U8(bytes.to_vec()),
        }
    }

    /// The element type.
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::F64(_) => Dtype::F64,
            Self::F32(_) => Dtype::F32,
            Self::F16(_) => Dtype::F16,
            Self::I64(_) => Dtype::I64,
            Self::I32(_) => Dtype::I32,
            Self::I16(_) => Dtype::I16,
            Self::I8(_) => Dtype::I8,
            Self::U64(_) => Dtype::U64,
            Self::U32(_) => Dtype::U32,
            Self::U16(_) => Dtype::U16,
            Self::U8(_) => Dtype::U8,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn to_nested(&self, shape: &[usize]) -> JsonValue {
        with_data!(self, v => nest(v, shape))
    }
}

/// A Rust type that the elements of some [`Dtype`] decode to.
///
/// Implemented for `f64`, `f32`, [`half::f16`], `i64`, `i32`, `i16`, `i8`,
/// `u64`, `u32`, `u16` and `u8`.
pub trait Element: Copy + Sized + 'static {
    /// The element type stored in `.npy` files.
    const DTYPE: Dtype;

    /// Takes the elements out of `data`, or hands `data` back if it holds a
    /// different element type.
    fn from_data(data: ArrayData) -> Result<Vec<Self>, ArrayData>;

    /// Wraps elements of this type.
    fn into_data(vec: Vec<Self>) -> ArrayData;

    /// JSON number for the element; `null` for NaN and infinities.
    fn to_json(self) -> JsonValue;
}

fn float_to_json<T: ToPrimitive>(x: T) -> JsonValue {
    x.to_f64().and_then(Number::from_f64).map_or(JsonValue::Null, JsonValue::Number)
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident, $to_json:expr;)*) => {$(
        impl Element for $ty {
            const DTYPE: Dtype = Dtype::$variant;

            fn from_data(data: ArrayData) -> Result<Vec<Self>, ArrayData> {
                match data {
                    ArrayData::$variant(vec) => Ok(vec),
                    data => Err(data),
                }
            }

            fn into_data(vec: Vec<Self>) -> ArrayData {
                ArrayData::$variant(vec)
            }

            fn to_json(self) -> JsonValue {
                $to_json(self)
            }
        }
    )*};
}

impl_element! {
    f64 => F64, float_to_json;
    f32 => F32, float_to_json;
    f16 => F16, float_to_json;
    i64 => I64, JsonValue::from;
    i32 => I32, JsonValue::from;
    i16 => I16, JsonValue::from;
    i8 => I8, JsonValue::from;
    u64 => U64, JsonValue::from;
    u32 => U32, JsonValue::from;
    u16 => U16, JsonValue::from;
    u8 => U8, JsonValue::from;
}
