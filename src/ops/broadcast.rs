//! Shape broadcasting for distribution parameters
//!
//! Shapes are aligned from the trailing dimension. A size-1 dimension
//! stretches to match; any other size must match exactly. Parameters are
//! broadcast *into* the requested output shape, which is never widened.

use crate::error::{Error, Result};
use crate::tensor::{Layout, Shape, Strides};

/// Compute the broadcast shape of two shapes
///
/// Returns `None` when some aligned dimension holds two distinct sizes that
/// are both greater than one.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Shape> {
    let max_ndim = a.len().max(b.len());
    let mut result = Shape::with_capacity(max_ndim);

    // Iterate from right to left
    for i in 0..max_ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else if b_dim == 1 {
            result.push(a_dim);
        } else {
            return None;
        }
    }

    result.reverse();
    Some(result)
}

/// Whether `shape` can be read as a view of `target` without widening it
pub fn is_expandable(shape: &[usize], target: &[usize]) -> bool {
    shape.len() <= target.len()
        && shape
            .iter()
            .rev()
            .zip(target.iter().rev())
            .all(|(&s, &t)| s == t || s == 1)
}

/// Resolve the output shape for parameters of `shapes` and the requested `target`
///
/// Every parameter shape must be expandable into `target`. On success the
/// result equals `target`.
///
/// # Errors
///
/// `ShapeMismatch` naming the first offending parameter shape.
pub fn broadcast(shapes: &[&[usize]], target: &[usize]) -> Result<Shape> {
    for shape in shapes {
        if !is_expandable(shape, target) {
            return Err(Error::shape_mismatch(shape, target));
        }
    }
    log::trace!("broadcast {:?} into {:?}", shapes, target);
    Ok(Shape::from_slice(target))
}

/// Strides that read a contiguous tensor of `shape` as if it had `target` shape
///
/// Stretched and prepended dimensions get stride 0.
pub fn broadcast_strides(shape: &[usize], target: &[usize]) -> Option<Strides> {
    Layout::contiguous(shape)
        .broadcast_to(target)
        .map(|view| Strides::from_slice(view.strides()))
}
