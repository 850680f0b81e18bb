//! Tensor types
//!
//! This module provides the host-side `Tensor` used for distribution
//! parameters and sampled outputs.

mod core;
mod layout;
mod storage;

pub use core::Tensor;
pub use layout::{Layout, Shape, Strides};
pub use storage::Storage;
