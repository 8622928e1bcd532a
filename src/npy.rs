mod dtype;
mod elements;
mod header;
mod metadata;

pub use self::{
    dtype::{Dtype, Kind, UnknownDtype},
    elements::{ArrayData, Element},
    header::ParseHeaderError,
    metadata::ParseDictError,
};
use self::header::Header;
use crate::DecodedArray;
use log::{debug, trace};
use std::{fs, io, path::Path};
use thiserror::Error;

/// Decodes a complete `.npy` file held in memory.
///
/// The buffer must hold exactly one array: the bytes after the header have to
/// match the declared shape and element type, with nothing left over.
///
/// # Example
///
/// ```
/// use npy_reader::{decode, ArrayData, Dtype};
///
/// let dict = b"{'descr': '<f8', 'fortran_order': False, 'shape': (2,), }\n";
/// let mut buf = b"\x93NUMPY\x01\x00".to_vec();
/// buf.extend_from_slice(&(dict.len() as u16).to_le_bytes());
/// buf.extend_from_slice(dict);
/// buf.extend_from_slice(&1.0f64.to_le_bytes());
/// buf.extend_from_slice(&(-0.5f64).to_le_bytes());
///
/// let arr = decode(&buf)?;
/// assert_eq!(arr.dtype(), Dtype::F64);
/// assert_eq!(arr.shape(), [2]);
/// assert_eq!(arr.data(), &ArrayData::F64(vec![1.0, -0.5]));
/// # Ok::<_, npy_reader::ReadNpyError>(())
/// ```
pub fn decode(buf: &[u8]) -> Result<DecodedArray, ReadNpyError> {
    let (header, payload) = Header::from_bytes(buf)?;
    debug!("parsed .npy header: {header}");
    if header.fortran_order {
        return Err(ReadNpyError::FortranOrder);
    }
    let len = shape_length_checked(&header.shape).ok_or(ReadNpyError::LengthOverflow)?;
    let dtype = header.descr.parse::<Dtype>()?;
    let expected = len.checked_mul(dtype.width()).ok_or(ReadNpyError::LengthOverflow)?;
    if payload.len() != expected {
        return Err(ReadNpyError::SizeMismatch { expected, actual: payload.len() });
    }
    let data = ArrayData::from_le_bytes(dtype, payload);
    trace!("decoded {len} elements of {dtype}");
    Ok(DecodedArray::new(header.shape, data))
}

/// Reads `reader` to the end and decodes the `.npy` data in it.
pub fn read_npy_from<R: io::Read>(mut reader: R) -> Result<DecodedArray, ReadNpyError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    decode(&buf)
}

/// Read an `.npy` file located at the specified path.
///
/// This is a convenience function for reading the whole file followed by
/// [`decode`].
///
/// # Example
///
/// ```no_run
/// use npy_reader::read_npy;
///
/// let arr = read_npy("array.npy")?;
/// println!("{}", arr.to_json());
/// # Ok::<_, npy_reader::ReadNpyError>(())
/// ```
pub fn read_npy<P: AsRef<Path>>(path: P) -> Result<DecodedArray, ReadNpyError> {
    let path = path.as_ref();
    debug!("reading {}", path.display());
    decode(&fs::read(path)?)
}

/// Number of elements for `shape`; an empty shape is a scalar.
///
/// Returns `None` if the number of elements overflows `usize`. Any zero axis
/// makes the array empty, whatever the other axes are.
fn shape_length_checked(shape: &[usize]) -> Option<usize> {
    if shape.contains(&0) {
        return Some(0);
    }
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// An error reading a `.npy` file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadNpyError {
    /// An error caused by I/O.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The buffer ends before the header does.
    #[error("buffer of {len} bytes is too short, the header needs {needed}")]
    Truncated {
        /// Bytes needed to continue reading the header.
        needed: usize,
        /// Bytes available.
        len: usize,
    },
    /// The start of the file does not match the magic string.
    #[error("start does not match magic string, not a .npy file")]
    MagicString,
    /// The version number is not 1.0.
    #[error("unsupported version number: {major}.{minor}")]
    Version {
        /// Major version number.
        major: u8,
        /// Minor version number.
        minor: u8,
    },
    /// An error parsing the metadata dictionary of the header.
    #[error("error parsing header: {0}")]
    ParseHeader(#[from] ParseHeaderError),
    /// The array is stored in Fortran (column-major) order.
    #[error("fortran_order is not supported")]
    FortranOrder,
    /// The type descriptor is not supported.
    #[error("{0}")]
    UnknownDtype(#[from] UnknownDtype),
    /// Overflow while computing the length of the array (in units of bytes or
    /// the number of elements) from the shape described in the file header.
    #[error("overflow computing length from shape")]
    LengthOverflow,
    /// The data does not have the size declared by the shape and dtype.
    #[error("declared shape and dtype need {expected} bytes of data, found {actual}")]
    SizeMismatch {
        /// Byte length implied by the header.
        expected: usize,
        /// Byte length following the header.
        actual: usize,
    },
    /// The element type requested does not match the data.
    #[error("expected elements of type {expected}, found {found}")]
    WrongDtype {
        /// The requested element type.
        expected: Dtype,
        /// The element type of the data.
        found: Dtype,
    },
    /// An error caused by incorrect `Dimension` type.
    #[cfg(feature = "ndarray")]
    #[error("ndim {1} of array did not match Dimension type with NDIM = {0:?}")]
    WrongNdim(Option<usize>, usize),
}
