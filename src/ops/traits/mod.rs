//! Operation traits for sampling.
//!
//! Implementations are in the backend-specific modules (cpu/).

mod distributions;

pub use distributions::{DistributionOps, Params};
