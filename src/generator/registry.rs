//! Process-wide default generator
//!
//! The name-based sampling entry point draws from the registry's current
//! generator. Typed entry points always take a generator explicitly.

use super::Generator;
use crate::error::Result;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// Holder of the current default generator
#[derive(Debug)]
pub struct GeneratorRegistry {
    current: RwLock<Arc<Generator>>,
}

impl GeneratorRegistry {
    /// Registry whose current generator is `generator`
    pub fn new(generator: Generator) -> Self {
        Self {
            current: RwLock::new(Arc::new(generator)),
        }
    }

    /// Registry seeded from the thread-local entropy source
    pub fn from_entropy() -> Self {
        // Keep the seed in the non-negative i64 range so `seed` can reproduce it
        let seed = rand::random::<u64>() >> 1;
        log::debug!("default generator seeded from entropy: {}", seed);
        Self::new(Generator::from_seed(seed))
    }

    /// The generator name-based sampling draws from
    pub fn current_generator(&self) -> Arc<Generator> {
        Arc::clone(&self.current.read())
    }

    /// Install `generator` as current, returning the previous one
    pub fn set_current(&self, generator: Arc<Generator>) -> Arc<Generator> {
        std::mem::replace(&mut *self.current.write(), generator)
    }

    /// Reseed the current generator and rewind it to position 0
    pub fn seed(&self, seed: i64) -> Result<()> {
        self.current_generator().reseed(seed)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// The process-wide registry, created on first use
pub fn default_registry() -> &'static GeneratorRegistry {
    static REGISTRY: OnceLock<GeneratorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(GeneratorRegistry::from_entropy)
}

/// Current generator of the process-wide registry
pub fn current_generator() -> Arc<Generator> {
    default_registry().current_generator()
}

/// Reseed the process-wide current generator
pub fn seed(seed: i64) -> Result<()> {
    default_registry().seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_seed_resets_current() {
        let registry = GeneratorRegistry::new(Generator::from_seed(1));
        registry.current_generator().draw_uniform(5);
        registry.seed(99).unwrap();
        let state = registry.current_generator().state();
        assert_eq!(state.seed, 99);
        assert_eq!(state.position, 0);
    }

    #[test]
    fn test_seed_rejects_negative() {
        let registry = GeneratorRegistry::new(Generator::from_seed(1));
        assert_eq!(registry.seed(-2), Err(Error::InvalidSeed { seed: -2 }));
    }

    #[test]
    fn test_set_current_returns_previous() {
        let registry = GeneratorRegistry::new(Generator::from_seed(1));
        let previous = registry.set_current(Arc::new(Generator::from_seed(2)));
        assert_eq!(previous.seed(), 1);
        assert_eq!(registry.current_generator().seed(), 2);
    }

    #[test]
    fn test_shared_handle_sees_advances() {
        let registry = GeneratorRegistry::new(Generator::from_seed(5));
        let handle = registry.current_generator();
        registry.current_generator().draw_normal(3);
        assert_eq!(handle.position(), 3);
    }

    #[test]
    fn test_entropy_seed_is_non_negative() {
        let registry = GeneratorRegistry::from_entropy();
        assert!(i64::try_from(registry.current_generator().seed()).is_ok());
    }
}
