use std::{fmt, str::FromStr};
use thiserror::Error;

/// Numeric kind of an element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// IEEE 754 floating point.
    Float,
    /// Two's complement signed integer.
    Signed,
    /// Unsigned integer.
    Unsigned,
}

/// Element type of an `.npy` array.
///
/// This is the closed set of type descriptors understood by this crate. All
/// multi-byte types are little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// `<f8`
    F64,
    /// `<f4`
    F32,
    /// `<f2`, IEEE 754 half precision.
    F16,
    /// `<i8`
    I64,
    /// `<i4`
    I32,
    /// `<i2`
    I16,
    /// `<i1`
    I8,
    /// `|u8`
    U64,
    /// `|u4`
    U32,
    /// `|u2`
    U16,
    /// `|u1`
    U8,
}

impl Dtype {
    /// Every supported element type.
    pub const ALL: [Dtype; 11] = [
        Dtype::F64,
        Dtype::F32,
        Dtype::F16,
        Dtype::I64,
        Dtype::I32,
        Dtype::I16,
        Dtype::I8,
        Dtype::U64,
        Dtype::U32,
        Dtype::U16,
        Dtype::U8,
    ];

    /// The canonical type descriptor, e.g. `<f8`.
    pub const fn code(self) -> &'static str {
        match self {
            Dtype::F64 => "<f8",
            Dtype::F32 => "<f4",
            Dtype::F16 => "<f2",
            Dtype::I64 => "<i8",
            Dtype::I32 => "<i4",
            Dtype::I16 => "<i2",
            Dtype::I8 => "<i1",
            Dtype::U64 => "|u8",
            Dtype::U32 => "|u4",
            Dtype::U16 => "|u2",
            Dtype::U8 => "|u1",
        }
    }

    /// Size of one element in bytes.
    pub const fn width(self) -> usize {
        match self {
            Dtype::F64 | Dtype::I64 | Dtype::U64 => 8,
            Dtype::F32 | Dtype::I32 | Dtype::U32 => 4,
            Dtype::F16 | Dtype::I16 | Dtype::U16 => 2,
            Dtype::I8 | Dtype::U8 => 1,
        }
    }

    /// Numeric kind of the element.
    pub const fn kind(self) -> Kind {
        match self {
            Dtype::F64 | Dtype::F32 | Dtype::F16 => Kind::Float,
            Dtype::I64 | Dtype::I32 | Dtype::I16 | Dtype::I8 => Kind::Signed,
            Dtype::U64 | Dtype::U32 | Dtype::U16 | Dtype::U8 => Kind::Unsigned,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The type descriptor is not one of the supported element types.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown type descriptor: {0:?}")]
pub struct UnknownDtype(pub String);

impl FromStr for Dtype {
    type Err = UnknownDtype;

    /// Parses a type descriptor. Only the codes returned by [`Dtype::code`]
    /// are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s {
            "<f8" => Dtype::F64,
            "<f4" => Dtype::F32,
            "<f2" => Dtype::F16,
            "<i8" => Dtype::I64,
            "<i4" => Dtype::I32,
            "<i2" => Dtype::I16,
            "<i1" => Dtype::I8,
            "|u8" => Dtype::U64,
            "|u4" => Dtype::U32,
            "|u2" => Dtype::U16,
            "|u1" => Dtype::U8,
            _ => return Err(UnknownDtype(s.to_string())),
        };
        Ok(dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_through_from_str() {
        for dtype in Dtype::ALL {
            assert_eq!(dtype.code().parse::<Dtype>(), Ok(dtype));
        }
    }

    #[test]
    fn width_matches_code_suffix() {
        for dtype in Dtype::ALL {
            let digit = dtype.code()[2..].parse::<usize>().unwrap();
            assert_eq!(dtype.width(), digit);
        }
    }

    #[test]
    fn rejects_unsupported_descriptors() {
        for s in [">f8", "<c16", "|b1", "<U3", "f8", "", "<u4", "<u8", "<u1", "|i1", "<u2"] {
            assert_eq!(s.parse::<Dtype>(), Err(UnknownDtype(s.to_string())));
        }
    }

    #[test]
    fn kinds() {
        assert_eq!(Dtype::F16.kind(), Kind::Float);
        assert_eq!(Dtype::I8.kind(), Kind::Signed);
        assert_eq!(Dtype::U64.kind(), Kind::Unsigned);
    }
}
