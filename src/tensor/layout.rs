//! Layout: shape and strides for contiguous tensors and broadcast views

use smallvec::SmallVec;
use std::fmt;

/// Stack allocation threshold for dimensions
/// Most tensors have 4 or fewer dimensions, so we stack-allocate up to 4
const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a tensor
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides type: element offsets between consecutive elements along each dimension
/// NOTE: Strides are in ELEMENTS, not bytes
pub type Strides = SmallVec<[usize; STACK_DIMS]>;

/// Layout describes how a multi-index maps into the element buffer
///
/// Address of element at indices [i0, i1, ..., in]:
///   i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
///
/// Broadcast views use stride 0 along stretched dimensions.
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
}

impl Layout {
    /// Create a new contiguous (row-major/C-order) layout from a shape
    ///
    /// # Example
    /// ```
    /// use numr_random::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let shape: Shape = shape.iter().copied().collect();
        let strides = Self::compute_contiguous_strides(&shape);
        Self { shape, strides }
    }

    /// Create a scalar (0-dimensional) layout
    pub fn scalar() -> Self {
        Self {
            shape: SmallVec::new(),
            strides: SmallVec::new(),
        }
    }

    /// Compute contiguous strides for a given shape (row-major order)
    fn compute_contiguous_strides(shape: &[usize]) -> Strides {
        let mut strides: Strides = SmallVec::with_capacity(shape.len());
        let mut stride = 1usize;

        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim;
        }

        strides.reverse();
        strides
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if the tensor is a scalar (0 dimensions)
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Compute the buffer offset for a multi-index, or None when out of bounds
    pub fn index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }

        let mut linear = 0;
        for ((&idx, &dim), &stride) in indices.iter().zip(self.shape.iter()).zip(&self.strides) {
            if idx >= dim {
                return None;
            }
            linear += idx * stride;
        }

        Some(linear)
    }

    /// Buffer offset of the element at row-major position `linear` of this
    /// layout's shape
    ///
    /// For a contiguous layout this is the identity; for a broadcast view it
    /// folds stretched dimensions onto their single source element.
    pub fn offset_of(&self, mut linear: usize) -> usize {
        let mut offset = 0;
        for (&dim, &stride) in self.shape.iter().zip(&self.strides).rev() {
            if dim == 0 {
                return 0;
            }
            offset += (linear % dim) * stride;
            linear /= dim;
        }
        offset
    }

    /// Create a broadcast layout to a target shape
    ///
    /// Returns None if this shape cannot be stretched into `target`.
    pub fn broadcast_to(&self, target: &[usize]) -> Option<Self> {
        if target.len() < self.ndim() {
            return None;
        }

        let mut new_shape = Shape::new();
        let mut new_strides = Strides::new();

        // Pad with leading 1s
        let pad = target.len() - self.ndim();
        for &t in &target[..pad] {
            new_shape.push(t);
            new_strides.push(0);
        }

        for ((&s, &st), &t) in self
            .shape
            .iter()
            .zip(self.strides.iter())
            .zip(&target[pad..])
        {
            if s == t {
                new_shape.push(t);
                new_strides.push(st);
            } else if s == 1 {
                new_shape.push(t);
                new_strides.push(0);
            } else {
                return None;
            }
        }

        Some(Self {
            shape: new_shape,
            strides: new_strides,
        })
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {{ shape: {:?}, strides: {:?} }}",
            self.shape.as_slice(),
            self.strides.as_slice()
        )
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.shape.as_slice())
    }
}
