//! Common test utilities
#![allow(dead_code)]

use numr_random::dtype::DType;
use numr_random::generator::Generator;
use numr_random::runtime::cpu::CpuClient;
use numr_random::tensor::Tensor;

/// f64 and f32: the dtypes every distribution can produce
pub const REGULAR_FLOAT_DTYPES: [DType; 2] = [DType::F64, DType::F32];

/// Every float dtype, usable for parameter tensors of any distribution
pub const FLOAT_DTYPES: [DType; 4] = [DType::F64, DType::F32, DType::F16, DType::BF16];

/// Every integer dtype
pub const INT_DTYPES: [DType; 8] = [
    DType::I64,
    DType::I32,
    DType::I16,
    DType::I8,
    DType::U64,
    DType::U32,
    DType::U16,
    DType::U8,
];

/// Output shapes exercised by the broadcast grids
pub const OUT_SHAPES: [&[usize]; 2] = [&[4, 3, 2], &[3, 2]];

/// Parameter shapes that broadcast into every `OUT_SHAPES` entry
pub const PARAM_SHAPES: [&[usize]; 2] = [&[], &[3, 2]];

/// Create a CPU client and a generator for testing
pub fn create_cpu_client(seed: i64) -> (CpuClient, Generator) {
    (CpuClient::new(), Generator::new(seed).unwrap())
}

/// Tensor of `shape` and `dtype` filled with `value`
pub fn filled(shape: &[usize], dtype: DType, value: f64) -> Tensor {
    Tensor::full_scalar(shape, dtype, value)
}

/// Mean and population variance
pub fn mean_var(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert that two tensors hold bit-identical values
pub fn assert_same_bits(a: &Tensor, b: &Tensor, msg: &str) {
    assert_eq!(a.shape(), b.shape(), "{}: shape mismatch", msg);
    assert_eq!(a.dtype(), b.dtype(), "{}: dtype mismatch", msg);
    let bits = |t: &Tensor| -> Vec<u64> { t.to_f64_vec().iter().map(|v| v.to_bits()).collect() };
    assert_eq!(bits(a), bits(b), "{}: values differ", msg);
}
