use crate::{ArrayData, Dtype, Element, ReadNpyError};
use serde_json::Value as JsonValue;

/// A shaped array decoded from an `.npy` file.
///
/// The number of elements always equals the product of the shape; an empty
/// shape describes a scalar holding one element.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl DecodedArray {
    pub(crate) fn new(shape: Vec<usize>, data: ArrayData) -> Self {
        debug_assert!(if shape.contains(&0) {
            data.is_empty()
        } else {
            shape.iter().product::<usize>() == data.len()
        });
        Self { shape, data }
    }

    /// Length of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes; zero for a scalar.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if some axis has length zero.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The element type.
    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    /// The elements in row-major order.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Splits the array into its shape and elements.
    pub fn into_parts(self) -> (Vec<usize>, ArrayData) {
        (self.shape, self.data)
    }

    /// Takes the elements in row-major order, provided they are of type `T`.
    ///
    /// ```
    /// # use npy_reader::{decode, ReadNpyError};
    /// # let dict = b"{'descr': '<i4', 'fortran_order': False, 'shape': (2,), }";
    /// # let mut buf = b"\x93NUMPY\x01\x00".to_vec();
    /// # buf.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    /// # buf.extend_from_slice(dict);
    /// # buf.extend_from_slice(&[1, 0, 0, 0, 2, 0, 0, 0]);
    /// let arr = decode(&buf)?;
    /// assert!(matches!(
    ///     arr.clone().into_vec::<f64>(),
    ///     Err(ReadNpyError::WrongDtype { .. })
    /// ));
    /// assert_eq!(arr.into_vec::<i32>()?, [1, 2]);
    /// # Ok::<_, ReadNpyError>(())
    /// ```
    pub fn into_vec<T: Element>(self) -> Result<Vec<T>, ReadNpyError> {
        T::from_data(self.data).map_err(|data| ReadNpyError::WrongDtype {
            expected: T::DTYPE,
            found: data.dtype(),
        })
    }

    /// Nested JSON arrays following the shape, e.g. `[[1, 2, 3], [4, 5, 6]]`
    /// for shape `[2, 3]`. A scalar becomes a bare number.
    ///
    /// Floats without a JSON representation (NaN and infinities) become
    /// `null`.
    pub fn to_nested(&self) -> JsonValue {
        self.data.to_nested(&self.shape)
    }

    /// JSON text of [`Self::to_nested`].
    pub fn to_json(&self) -> String {
        self.to_nested().to_string()
    }
}

/// Nests `items`, which hold exactly `product(shape)` elements, into arrays.
pub(crate) fn nest<T: Element>(items: &[T], shape: &[usize]) -> JsonValue {
    let Some((&len, rest)) = shape.split_first() else {
        return items.first().map_or(JsonValue::Null, |&x| x.to_json());
    };
    // Empty arrays collapse to `[]`; the outer axes may be too long to list.
    if items.is_empty() {
        return JsonValue::Array(Vec::new());
    }
    let stride = items.len() / len;
    JsonValue::Array(
        (0..len)
            .map(|i| nest(&items[i * stride..(i + 1) * stride], rest))
            .collect(),
    )
}
