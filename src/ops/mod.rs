//! Sampling operations
//!
//! Operations are defined as traits implemented by a backend client. The
//! client supplies execution resources; the [`Generator`](crate::generator::Generator)
//! passed to each call supplies the random state.
//!
//! ```text
//! CpuClient
//!   └── implements DistributionOps
//!         ├── uniform, normal, standard_normal, lognormal
//!         ├── gumbel, laplace, exponential, gamma
//!         ├── beta, binomial
//!         ├── dirichlet        (one lane per vector)
//!         └── sample / sample_with (by name)
//! ```
//!
//! # Broadcasting
//!
//! Parameter tensors are aligned with the requested output shape from the
//! trailing dimension; size-1 and missing leading dimensions stretch. The
//! output shape is exactly the requested one, so a parameter that would
//! widen it is a [`ShapeMismatch`](crate::error::Error::ShapeMismatch).

mod broadcast;
pub(crate) mod cpu;
mod distribution;
mod traits;

pub use broadcast::{broadcast, broadcast_shape, broadcast_strides, is_expandable};
pub use distribution::Distribution;
pub use traits::{DistributionOps, Params};
