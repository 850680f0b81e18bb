//! CPU runtime implementation
//!
//! Sampling runs on the host: every output lane draws from its own Philox
//! stream, and lanes are spread over rayon worker threads when the `rayon`
//! feature is enabled. Parameter tensors are read through stride-0 broadcast
//! views, so they are never materialized at the output shape.

mod client;
pub(crate) mod helpers;
pub(crate) mod kernels;

pub use client::{CpuClient, ParallelismConfig};
pub use kernels::PhiloxStream;
