//! Projection of f64 work values into storage dtypes
//!
//! Samplers compute in f64. Each distribution declares which output dtypes it
//! can produce through a [`DTypePolicy`]; [`project_into`] then converts the
//! work buffer into a tensor of the requested dtype.

use super::{DType, DTypeSet};
use crate::error::{Error, Result};
use crate::runtime::cpu::helpers::dispatch_dtype;
use crate::tensor::Tensor;

/// Output dtypes accepted by one operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DTypePolicy {
    op: &'static str,
    allowed: DTypeSet,
}

impl DTypePolicy {
    /// Policy for `op` accepting exactly `allowed`
    pub const fn new(op: &'static str, allowed: DTypeSet) -> Self {
        Self { op, allowed }
    }

    /// Operation name reported in errors
    pub const fn op(&self) -> &'static str {
        self.op
    }

    /// Whether `dtype` is an accepted output dtype
    pub const fn allows(&self, dtype: DType) -> bool {
        self.allowed.contains(dtype)
    }

    /// Fail with `UnsupportedDType` unless `dtype` is accepted
    pub fn check(&self, dtype: DType) -> Result<()> {
        if self.allows(dtype) {
            Ok(())
        } else {
            Err(Error::unsupported_dtype(dtype, self.op))
        }
    }
}

/// Project one work value into `dtype`'s value set
///
/// Floats pass through unchanged (the narrowing itself happens on store).
/// Integer targets round half away from zero and reject NaN or values that
/// do not fit.
pub fn project(raw: f64, dtype: DType) -> Result<f64> {
    if dtype.is_float() {
        return Ok(raw);
    }
    let rounded = raw.round();
    if rounded.is_nan() || rounded < dtype.min_value() || rounded > dtype.max_value() {
        return Err(Error::unsupported_dtype(dtype, "project"));
    }
    Ok(rounded)
}

/// Build a contiguous tensor of `shape` and `dtype` from row-major work values
pub fn project_into(raw: &[f64], shape: &[usize], dtype: DType) -> Result<Tensor> {
    let mut out = Tensor::empty(shape, dtype);
    if out.numel() != raw.len() {
        return Err(Error::shape_mismatch(&[raw.len()], shape));
    }

    dispatch_dtype!(dtype, T => {
        let dst = out.storage_mut().as_mut_slice::<T>();
        for (d, &v) in dst.iter_mut().zip(raw) {
            *d = <T as crate::dtype::Element>::from_f64(project(v, dtype)?);
        }
    });
    Ok(out)
}
