#![doc = include_str!("../README.md")]
//! ## Reading .npy Files
//!
//! - [`decode`] decodes a complete file held in memory (e.g. a memory-mapped
//!   file)
//! - [`read_npy_from`] reads from any [`std::io::Read`]
//! - [`read_npy`] convenience function for a file path
//!
//! All three produce a [`DecodedArray`]: the shape plus an [`ArrayData`]
//! holding a `Vec` of the element type named by the file's [`Dtype`].
//!
//! ## Consuming a DecodedArray
//!
//! - [`DecodedArray::into_vec`] for a concrete [`Element`] type
//! - [`DecodedArray::to_nested`] / [`DecodedArray::to_json`] for nested lists
//!   following the shape
//! - With the `ndarray` feature, `ReadNpyExt` and
//!   `DecodedArray::into_ndarray` / `DecodedArray::into_dyn_array`
//!
//! ## Limitations
//!
//! - Only format version 1.0 is read.
//! - Only C (row-major) order is supported; files with
//!   `'fortran_order': True` are rejected.
//! - Supported element types are the little-endian floats `<f8`, `<f4`,
//!   `<f2`, signed integers `<i8`, `<i4`, `<i2`, `<i1`, and unsigned
//!   integers `|u8`, `|u4`, `|u2`, `|u1`.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]

mod array;
mod npy;

#[cfg(feature = "ndarray")]
mod impl_ndarray;

pub use crate::{
    array::DecodedArray,
    npy::{
        decode, read_npy, read_npy_from, ArrayData, Dtype, Element, Kind, ParseDictError,
        ParseHeaderError, ReadNpyError, UnknownDtype,
    },
};

#[cfg(feature = "ndarray")]
pub use crate::impl_ndarray::{DynArray, ReadNpyExt};

/// Half-precision float type used for `<f2` elements.
pub use half::f16;
