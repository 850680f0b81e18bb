//! Runtime backends for sampling
//!
//! Only the CPU backend exists. A backend is a client type implementing
//! [`DistributionOps`](crate::ops::DistributionOps); it owns the execution
//! resources (thread pool, chunking policy) but no random state, which lives
//! in [`Generator`](crate::generator::Generator).

pub mod cpu;
