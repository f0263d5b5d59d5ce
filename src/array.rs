use bytes::Bytes;
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};

use crate::error::{CodecError, CodecResult};
use crate::types::{bytes_to_elements, elements_to_bytes, DataType, Element};

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

/// Number of elements in `shape`, or `None` on overflow.
pub fn checked_element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Number of bytes an array of `shape` and `dtype` occupies, or `None` on overflow.
pub fn checked_byte_len(shape: &[usize], dtype: DataType) -> Option<usize> {
    checked_element_count(shape)?.checked_mul(dtype.byte_size())
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// A shaped, typed, contiguous buffer of numeric elements.
///
/// Elements are stored little-endian in C (row-major) order, and
/// `data.len() == product(shape) * dtype.byte_size()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array {
    shape: Vec<usize>,
    dtype: DataType,
    data: Bytes,
}

impl Array {
    pub fn new(shape: Vec<usize>, dtype: DataType, data: impl Into<Bytes>) -> CodecResult<Self> {
        let data = data.into();
        let expected = checked_byte_len(&shape, dtype).ok_or_else(|| {
            CodecError::InvalidArray(format!("Shape {shape:?} overflows the address space"))
        })?;
        if data.len() != expected {
            return Err(CodecError::InvalidArray(format!(
                "Shape {shape:?} of {dtype} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, dtype, data })
    }

    pub fn zeros(shape: Vec<usize>, dtype: DataType) -> CodecResult<Self> {
        let len = checked_byte_len(&shape, dtype).ok_or_else(|| {
            CodecError::InvalidArray(format!("Shape {shape:?} overflows the address space"))
        })?;
        Self::new(shape, dtype, vec![0u8; len])
    }

    pub fn from_vec<T: Element>(shape: Vec<usize>, values: Vec<T>) -> CodecResult<Self> {
        Self::new(shape, T::DATA_TYPE, elements_to_bytes(&values))
    }

    /// Array of `shape` with every element set to `value`.
    pub fn filled<T: Element>(shape: Vec<usize>, value: T) -> CodecResult<Self> {
        let count = checked_element_count(&shape).ok_or_else(|| {
            CodecError::InvalidArray(format!("Shape {shape:?} overflows the address space"))
        })?;
        Self::from_vec(shape, vec![value; count])
    }

    /// Copy an ndarray (possibly a strided or transposed view) into a
    /// contiguous row-major `Array`.
    pub fn from_ndarray<T, S, D>(array: &ArrayBase<S, D>) -> Self
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let values: Vec<T> = array.iter().copied().collect();
        Self {
            shape: array.shape().to_vec(),
            dtype: T::DATA_TYPE,
            data: Bytes::from(elements_to_bytes(&values)),
        }
    }

    pub fn to_ndarray<T: Element>(&self) -> CodecResult<ArrayD<T>> {
        let values = self.to_vec::<T>()?;
        ArrayD::from_shape_vec(IxDyn(&self.shape), values)
            .map_err(|e| CodecError::InvalidArray(format!("ndarray conversion failed: {e}")))
    }

    /// Decode the elements as `T`; fails if `T` does not match the dtype.
    pub fn to_vec<T: Element>(&self) -> CodecResult<Vec<T>> {
        if T::DATA_TYPE != self.dtype {
            return Err(CodecError::InvalidArray(format!(
                "Array holds {}, requested {}",
                self.dtype,
                T::DATA_TYPE
            )));
        }
        bytes_to_elements(&self.data)
    }

    /// Same data under a different shape with the same element count.
    pub fn reshape(&self, shape: Vec<usize>) -> CodecResult<Self> {
        Self::new(shape, self.dtype, self.data.clone())
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len() / self.dtype.byte_size()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw little-endian element bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
