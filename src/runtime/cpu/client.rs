//! CPU client and parallelism configuration

use crate::error::{Error, Result};
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Default minimum number of output values handed to one rayon task
const DEFAULT_MIN_LEN: usize = 1024;

/// How sampling work is spread over threads
///
/// `min_len` bounds how finely the output is split; `num_threads` requests a
/// dedicated pool instead of rayon's global one. Neither setting changes the
/// sampled values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelismConfig {
    min_len: usize,
    num_threads: Option<usize>,
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            num_threads: None,
        }
    }
}

impl ParallelismConfig {
    /// Minimum number of output values per parallel task (clamped to 1)
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len.max(1);
        self
    }

    /// Run on a dedicated pool of `num_threads` threads
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Minimum number of output values per parallel task
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Requested dedicated thread count, if any
    pub fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }
}

/// CPU client for operation dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    config: ParallelismConfig,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for CpuClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuClient {
    /// Create a client that runs on rayon's global pool
    pub fn new() -> Self {
        Self {
            config: ParallelismConfig::default(),
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    /// Create a client from an explicit configuration
    ///
    /// Fails with `Error::Backend` if a dedicated pool cannot be built.
    pub fn with_config(config: ParallelismConfig) -> Result<Self> {
        #[cfg(feature = "rayon")]
        let pool = match config.num_threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| Error::Backend(format!("failed to build thread pool: {}", e)))?;
                Some(Arc::new(pool))
            }
            None => None,
        };

        #[cfg(not(feature = "rayon"))]
        if config.num_threads.is_some_and(|n| n > 1) {
            return Err(Error::Backend(
                "multi-threaded sampling requires the `rayon` feature".to_string(),
            ));
        }

        Ok(Self {
            config,
            #[cfg(feature = "rayon")]
            pool,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ParallelismConfig {
        &self.config
    }

    /// Minimum chunk length for rayon iterators
    #[inline]
    pub(crate) fn rayon_min_len(&self) -> usize {
        self.config.min_len
    }

    /// Run `op` inside the dedicated pool when one is configured
    #[cfg(feature = "rayon")]
    pub(crate) fn install_parallelism<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let client = CpuClient::new();
        assert_eq!(client.config().min_len(), DEFAULT_MIN_LEN);
        assert_eq!(client.config().num_threads(), None);
    }

    #[test]
    fn test_min_len_clamped() {
        let config = ParallelismConfig::default().with_min_len(0);
        assert_eq!(config.min_len(), 1);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_dedicated_pool() {
        let client =
            CpuClient::with_config(ParallelismConfig::default().with_num_threads(2)).unwrap();
        let threads = client.install_parallelism(rayon::current_num_threads);
        assert_eq!(threads, 2);
    }
}
