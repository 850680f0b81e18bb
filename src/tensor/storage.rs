//! Storage: host memory for tensor data

use crate::dtype::{DType, Element};

/// Untyped, 8-byte aligned element buffer
///
/// Elements are kept in a `Vec<u64>` so any supported element type can be
/// viewed through `bytemuck` casts without alignment violations.
#[derive(Clone)]
pub struct Storage {
    words: Vec<u64>,
    /// Number of elements (not bytes)
    len: usize,
    dtype: DType,
}

impl Storage {
    /// Allocate zero-initialized storage for `len` elements of `dtype`
    pub fn zeroed(len: usize, dtype: DType) -> Self {
        let size_bytes = len * dtype.size_in_bytes();
        Self {
            words: vec![0u64; size_bytes.div_ceil(8)],
            len,
            dtype,
        }
    }

    /// Create storage by copying `data`; the dtype is inferred from `T`
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        let mut storage = Self::zeroed(data.len(), T::DTYPE);
        storage.as_mut_slice::<T>().copy_from_slice(data);
        storage
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the storage holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Size in bytes of the live elements
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }

    /// Typed view of the elements
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the storage dtype.
    pub fn as_slice<T: Element>(&self) -> &[T] {
        assert_eq!(
            T::DTYPE,
            self.dtype,
            "storage holds {} elements, requested {}",
            self.dtype,
            T::DTYPE
        );
        &bytemuck::cast_slice::<u64, T>(&self.words)[..self.len]
    }

    /// Mutable typed view of the elements
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the storage dtype.
    pub fn as_mut_slice<T: Element>(&mut self) -> &mut [T] {
        assert_eq!(
            T::DTYPE,
            self.dtype,
            "storage holds {} elements, requested {}",
            self.dtype,
            T::DTYPE
        );
        &mut bytemuck::cast_slice_mut::<u64, T>(&mut self.words)[..self.len]
    }
}
