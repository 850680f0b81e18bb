//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::Pod;

/// Trait for types that can be elements of a tensor
///
/// Connects Rust's type system to the runtime dtype system. Samplers compute
/// in f64 and convert through `from_f64` when writing the output.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - basic requirements for parallel writes
/// - `Pod` - safe casting of the untyped storage buffer (bytemuck)
/// - `PartialOrd` - range checks in tests and validation
pub trait Element: Copy + Send + Sync + Pod + PartialOrd + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    ///
    /// Integer conversions saturate at the type bounds and map NaN to zero,
    /// so callers that care must range-check first.
    fn from_f64(v: f64) -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

macro_rules! impl_int_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $ty
                }
            }
        )*
    };
}

impl_int_element!(
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
);
