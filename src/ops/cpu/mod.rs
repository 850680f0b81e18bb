//! CPU implementation of sampling operations.

pub mod distributions;
