//! Helper functions for CPU sampling operations
//!
//! This module contains the dtype dispatch macro and the broadcast parameter
//! view shared by every sampler.

use crate::error::{Error, Result};
use crate::tensor::{Layout, Tensor};

// ============================================================================
// DType Dispatch Macro
// ============================================================================

/// Macro for dtype dispatch to typed code
///
/// Matches on dtype and evaluates the block with `$T` bound to the Rust type.
/// Usage: `dispatch_dtype!(dtype, T => { code using T })`
///
/// The macro is an expression; every arm must produce the same type.
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F16 => {
                type $T = ::half::f16;
                $body
            }
            $crate::dtype::DType::BF16 => {
                type $T = ::half::bf16;
                $body
            }
            $crate::dtype::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::I16 => {
                type $T = i16;
                $body
            }
            $crate::dtype::DType::I8 => {
                type $T = i8;
                $body
            }
            $crate::dtype::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::dtype::DType::U32 => {
                type $T = u32;
                $body
            }
            $crate::dtype::DType::U16 => {
                type $T = u16;
                $body
            }
            $crate::dtype::DType::U8 => {
                type $T = u8;
                $body
            }
        }
    };
}

pub(crate) use dispatch_dtype;

// ============================================================================
// Broadcast Parameter Views
// ============================================================================

/// A distribution parameter resolved against the output shape
///
/// Values are converted to f64 once; `get(i)` returns the parameter value
/// that lines up with row-major output position `i`.
pub(crate) struct ParamView {
    name: &'static str,
    values: Vec<f64>,
    view: Layout,
    scalar: Option<f64>,
}

impl ParamView {
    /// Resolve `tensor` against `out_shape`
    pub(crate) fn new(name: &'static str, tensor: &Tensor, out_shape: &[usize]) -> Result<Self> {
        let view = tensor
            .layout()
            .broadcast_to(out_shape)
            .ok_or_else(|| Error::shape_mismatch(tensor.shape(), out_shape))?;
        let values = tensor.to_f64_vec();
        let scalar = (values.len() == 1).then(|| values[0]);
        Ok(Self {
            name,
            values,
            view,
            scalar,
        })
    }

    /// Parameter name, used in error messages
    #[inline]
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// Parameter value at output position `i`
    #[inline]
    pub(crate) fn get(&self, i: usize) -> f64 {
        match self.scalar {
            Some(v) => v,
            None => self.values[self.view.offset_of(i)],
        }
    }

    /// The distinct source values (not broadcast)
    #[inline]
    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }

    /// Fail with `InvalidParameter` if any non-NaN value violates `valid`
    ///
    /// NaN is a per-element condition handled by the samplers, not an error.
    pub(crate) fn check(&self, requirement: &str, valid: impl Fn(f64) -> bool) -> Result<()> {
        match self.values.iter().find(|v| !v.is_nan() && !valid(**v)) {
            Some(bad) => Err(Error::invalid_parameter(
                self.name,
                format!("{} requires {}, got {}", self.name, requirement, bad),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_view_scalar() {
        let t = Tensor::scalar(3.0f32);
        let view = ParamView::new("a", &t, &[2, 2]).unwrap();
        assert!((0..4).all(|i| view.get(i) == 3.0));
    }

    #[test]
    fn test_param_view_broadcast_rows() {
        let t = Tensor::from_slice(&[1.0f64, 2.0, 3.0], &[3]);
        let view = ParamView::new("loc", &t, &[2, 3]).unwrap();
        let got: Vec<f64> = (0..6).map(|i| view.get(i)).collect();
        assert_eq!(got, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_param_view_rejects_unexpandable() {
        let t = Tensor::from_slice(&[1.0f64, 2.0], &[2]);
        let err = ParamView::new("loc", &t, &[2, 3]).err().unwrap();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_check_skips_nan() {
        let t = Tensor::from_slice(&[1.0f64, f64::NAN], &[2]);
        let view = ParamView::new("scale", &t, &[2]).unwrap();
        assert!(view.check("scale >= 0", |v| v >= 0.0).is_ok());

        let t = Tensor::from_slice(&[1.0f64, -1.0], &[2]);
        let view = ParamView::new("scale", &t, &[2]).unwrap();
        let err = view.check("scale >= 0", |v| v >= 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { arg: "scale", .. }));
    }
}
