//! # numr-random
//!
//! **Counter-based random distribution sampling for n-dimensional arrays.**
//!
//! numr-random draws tensors from named probability distributions with
//! broadcast parameters, reproducibly and in parallel.
//!
//! ## Features
//!
//! - **Distributions**: uniform, normal, standard_normal, lognormal, gumbel,
//!   laplace, beta, dirichlet, binomial, gamma, exponential
//! - **Broadcasting**: scalar or array parameters stretched into the output shape
//! - **Reproducible parallelism**: every output lane draws from its own
//!   Philox4x32-10 stream, so results do not depend on the thread count
//! - **Multiple dtypes**: f64, f32, f16, bf16 and all integer widths, as
//!   each distribution allows
//!
//! ## Quick Start
//!
//! ```
//! use numr_random::prelude::*;
//!
//! let client = CpuClient::new();
//! let generator = Generator::new(42)?;
//!
//! let loc = Tensor::from_slice(&[0.0f64, 10.0, 100.0], &[3]);
//! let scale = Tensor::scalar(1.0f64);
//! let x = client.normal(&generator, &loc, &scale, &[2, 3], DType::F32)?;
//! assert_eq!(x.shape(), &[2, 3]);
//!
//! // Same seed, same position: same values
//! let replay = Generator::new(42)?;
//! let y = client.normal(&replay, &loc, &scale, &[2, 3], DType::F32)?;
//! assert_eq!(x.to_vec::<f32>(), y.to_vec::<f32>());
//! # Ok::<(), numr_random::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded lane evaluation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub mod generator;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::generator::Generator;
    pub use crate::ops::{Distribution, DistributionOps, Params};
    pub use crate::runtime::cpu::{CpuClient, ParallelismConfig};
    pub use crate::tensor::Tensor;
}
