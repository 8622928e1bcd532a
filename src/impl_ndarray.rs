use crate::{read_npy_from, ArrayData, DecodedArray, Dtype, Element, ReadNpyError};
use half::f16;
use ndarray::{prelude::*, DataOwned};
use std::io;

/// Extension trait for reading `Array` from `.npy` files.
///
/// # Example
///
/// ```no_run
/// use ndarray::Array2;
/// use npy_reader::ReadNpyExt;
/// use std::fs::File;
/// # use npy_reader::ReadNpyError;
///
/// let reader = File::open("array.npy")?;
/// let arr = Array2::<i32>::read_npy(reader)?;
/// # println!("arr = {}", arr);
/// # Ok::<_, ReadNpyError>(())
/// ```
pub trait ReadNpyExt: Sized {
    /// Reads the array from `reader` in [`.npy`
    /// format](https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html).
    fn read_npy<R: io::Read>(reader: R) -> Result<Self, ReadNpyError>;
}

impl<A, S, D> ReadNpyExt for ArrayBase<S, D>
where
    A: Element,
    S: DataOwned<Elem = A>,
    D: Dimension,
{
    fn read_npy<R: io::Read>(reader: R) -> Result<Self, ReadNpyError> {
        read_npy_from(reader)?.into_ndarray()
    }
}

/// A decoded array as an `ndarray` array of its own element type.
#[derive(Clone, Debug, PartialEq)]
pub enum DynArray {
    /// `<f8`
    F64(ArrayD<f64>),
    /// `<f4`
    F32(ArrayD<f32>),
    /// `<f2`
    F16(ArrayD<f16>),
    /// `<i8`
    I64(ArrayD<i64>),
    /// `<i4`
    I32(ArrayD<i32>),
    /// `<i2`
    I16(ArrayD<i16>),
    /// `<i1`
    I8(ArrayD<i8>),
    /// `|u8`
    U64(ArrayD<u64>),
    /// `|u4`
    U32(ArrayD<u32>),
    /// `|u2`
    U16(ArrayD<u16>),
    /// `|u1`
    U8(ArrayD<u8>),
}

impl DynArray {
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

    /// Length of each axis.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F64(a) => a.shape(),
            Self::F32(a) => a.shape(),
            Self::F16(a) => a.shape(),
            Self::I64(a) => a.shape(),
            Self::I32(a) => a.shape(),
            Self::I16(a) => a.shape(),
            Self::I8(a) => a.shape(),
            Self::U64(a) => a.shape(),
            Self::U32(a) => a.shape(),
            Self::U16(a) => a.shape(),
            Self::U8(a) => a.shape(),
        }
    }
}

impl DecodedArray {
    /// Converts into an owned array with element type `A` and dimension `D`.
    ///
    /// Fails with [`ReadNpyError::WrongDtype`] if the elements are not of
    /// type `A`, and with [`ReadNpyError::WrongNdim`] if the number of axes
    /// does not fit `D`.
    pub fn into_ndarray<A, S, D>(self) -> Result<ArrayBase<S, D>, ReadNpyError>
    where
        A: Element,
        S: DataOwned<Elem = A>,
        D: Dimension,
    {
        let ndim = self.ndim();
        let (shape, data) = self.into_parts();
        let found = data.dtype();
        let data = A::from_data(data)
            .map_err(|_| ReadNpyError::WrongDtype { expected: A::DTYPE, found })?;
        let arr = ArrayBase::<S, IxDyn>::from_shape_vec(IxDyn(&shape), data)
            .map_err(|_| ReadNpyError::LengthOverflow)?;
        arr.into_dimensionality()
            .map_err(|_| ReadNpyError::WrongNdim(D::NDIM, ndim))
    }

    /// Converts into a dynamic-dimensional array of whatever element type the
    /// file holds.
    pub fn into_dyn_array(self) -> Result<DynArray, ReadNpyError> {
        let (shape, data) = self.into_parts();
        let shape = IxDyn(&shape);
        let arr = match data {
            ArrayData::F64(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::F64),
            ArrayData::F32(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::F32),
            ArrayData::F16(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::F16),
            ArrayData::I64(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::I64),
            ArrayData::I32(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::I32),
            ArrayData::I16(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::I16),
            ArrayData::I8(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::I8),
            ArrayData::U64(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::U64),
            ArrayData::U32(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::U32),
            ArrayData::U16(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::U16),
            ArrayData::U8(v) => ArrayD::from_shape_vec(shape, v).map(DynArray::U8),
        };
        arr.map_err(|_| ReadNpyError::LengthOverflow)
    }
}
