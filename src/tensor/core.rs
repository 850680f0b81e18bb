//! Core Tensor type

use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::cpu::helpers::dispatch_dtype;
use std::fmt;

/// N-dimensional, contiguous, row-major array
///
/// A `Tensor` is the host-side array handed to and returned from the
/// samplers. It consists of:
/// - **Storage**: an untyped element buffer
/// - **Layout**: shape and strides
/// - **DType**: element type (determined at runtime)
#[derive(Clone)]
pub struct Tensor {
    storage: Storage,
    layout: Layout,
}

impl Tensor {
    /// Create a tensor from storage and layout
    pub(crate) fn from_parts(storage: Storage, layout: Layout) -> Self {
        debug_assert_eq!(storage.len(), layout.elem_count());
        Self { storage, layout }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    ///
    /// # Example
    ///
    /// ```
    /// use numr_random::tensor::Tensor;
    /// let t = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]);
    /// assert_eq!(t.shape(), &[2, 2]);
    /// ```
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Self {
        Self::try_from_slice(data, shape).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions.
    pub fn try_from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::shape_mismatch(&[data.len()], shape));
        }

        Ok(Self::from_parts(
            Storage::from_slice(data),
            Layout::contiguous(shape),
        ))
    }

    /// Create a 0-dimensional tensor holding a single value
    pub fn scalar<T: Element>(value: T) -> Self {
        Self::from_parts(Storage::from_slice(&[value]), Layout::scalar())
    }

    /// Allocate a zero-initialized tensor
    pub fn empty(shape: &[usize], dtype: DType) -> Self {
        let layout = Layout::contiguous(shape);
        Self::from_parts(Storage::zeroed(layout.elem_count(), dtype), layout)
    }

    /// Create a tensor filled with `value`, converted to `dtype`
    ///
    /// Integer dtypes saturate at their bounds.
    pub fn full_scalar(shape: &[usize], dtype: DType, value: f64) -> Self {
        let mut out = Self::empty(shape, dtype);
        dispatch_dtype!(dtype, T => {
            out.storage.as_mut_slice::<T>().fill(T::from_f64(value));
        });
        out
    }

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutable access to the element buffer
    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Whether this is a 0-dimensional tensor
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.layout.is_scalar()
    }

    /// Copy the elements into a `Vec<T>`
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the tensor dtype.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        self.storage.as_slice::<T>().to_vec()
    }

    /// Copy the elements into a `Vec<f64>`, converting from any dtype
    pub fn to_f64_vec(&self) -> Vec<f64> {
        dispatch_dtype!(self.dtype(), T => {
            self.storage.as_slice::<T>().iter().map(|&v| v.to_f64()).collect()
        })
    }

    /// Read one element as f64
    pub fn get_f64(&self, index: &[usize]) -> Result<f64> {
        let offset = self.checked_offset(index)?;
        Ok(dispatch_dtype!(self.dtype(), T => {
            self.storage.as_slice::<T>()[offset].to_f64()
        }))
    }

    /// Write one element, converting `value` to the tensor dtype
    pub fn set_f64(&mut self, index: &[usize], value: f64) -> Result<()> {
        let offset = self.checked_offset(index)?;
        dispatch_dtype!(self.dtype(), T => {
            self.storage.as_mut_slice::<T>()[offset] = T::from_f64(value);
        });
        Ok(())
    }

    fn checked_offset(&self, index: &[usize]) -> Result<usize> {
        self.layout
            .index(index)
            .ok_or_else(|| Error::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape().to_vec(),
            })
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("dtype", &self.dtype())
            .finish()
    }
}
