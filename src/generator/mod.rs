//! Stateful random-bit generator
//!
//! A [`Generator`] is a `(seed, position)` pair behind a mutex. Sampling
//! calls lock it, derive one [`PhiloxStream`] per output lane from
//! `position + lane`, and advance the position by the number of lanes they
//! consumed once they succeed. Because every lane's words are a pure function
//! of `(seed, absolute lane)`, results do not depend on thread scheduling.
//!
//! # Example
//!
//! ```
//! use numr_random::generator::Generator;
//!
//! let generator = Generator::new(42)?;
//! let a = generator.draw_uniform(4);
//! assert_eq!(generator.position(), 4);
//!
//! generator.reseed(42)?;
//! assert_eq!(generator.draw_uniform(4), a);
//! # Ok::<(), numr_random::error::Error>(())
//! ```

mod registry;

pub use registry::{GeneratorRegistry, current_generator, default_registry, seed};

use crate::error::{Error, Result};
use crate::runtime::cpu::PhiloxStream;
use crate::runtime::cpu::kernels::transforms::{raw_uniform, standard_normal};
use parking_lot::{Mutex, MutexGuard};

/// Snapshot of a generator's state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    /// Philox key
    pub seed: u64,
    /// Next unused lane
    pub position: u64,
}

/// Shared source of reproducible lane streams
#[derive(Debug)]
pub struct Generator {
    state: Mutex<GeneratorState>,
}

impl Generator {
    /// Create a generator at position 0
    ///
    /// Fails with `InvalidSeed` for negative seeds.
    pub fn new(seed: i64) -> Result<Self> {
        Ok(Self::from_seed(checked_seed(seed)?))
    }

    /// Create a generator from a raw 64-bit key at position 0
    pub fn from_seed(seed: u64) -> Self {
        Self::with_position(seed, 0)
    }

    /// Restore a generator at an explicit position
    pub fn with_position(seed: u64, position: u64) -> Self {
        Self {
            state: Mutex::new(GeneratorState { seed, position }),
        }
    }

    /// Current key
    pub fn seed(&self) -> u64 {
        self.state.lock().seed
    }

    /// Next unused lane
    pub fn position(&self) -> u64 {
        self.state.lock().position
    }

    /// Consistent snapshot of seed and position
    pub fn state(&self) -> GeneratorState {
        *self.state.lock()
    }

    /// Replace the key and rewind to position 0
    pub fn reseed(&self, seed: i64) -> Result<()> {
        let seed = checked_seed(seed)?;
        let mut state = self.state.lock();
        *state = GeneratorState { seed, position: 0 };
        log::trace!("generator reseeded to {}", seed);
        Ok(())
    }

    /// `count` uniforms in [0, 1), element `i` drawn from lane `position + i`
    pub fn draw_uniform(&self, count: usize) -> Vec<f64> {
        self.draw_with(count, raw_uniform)
    }

    /// `count` standard normals, element `i` drawn from lane `position + i`
    pub fn draw_normal(&self, count: usize) -> Vec<f64> {
        self.draw_with(count, standard_normal)
    }

    fn draw_with(&self, count: usize, f: fn(&mut PhiloxStream) -> f64) -> Vec<f64> {
        let mut guard = self.lock();
        let lanes = guard.lanes();
        let out = (0..count).map(|i| f(&mut lanes.stream(i))).collect();
        guard.commit(count);
        out
    }

    /// Acquire exclusive use for the duration of one sampling call
    pub(crate) fn lock(&self) -> GeneratorGuard<'_> {
        GeneratorGuard {
            state: self.state.lock(),
        }
    }
}

fn checked_seed(seed: i64) -> Result<u64> {
    u64::try_from(seed).map_err(|_| Error::InvalidSeed { seed })
}

/// Exclusive access to a generator during one call
///
/// Dropping the guard without `commit` leaves the position untouched, which
/// is how failed calls stay side-effect free.
pub(crate) struct GeneratorGuard<'a> {
    state: MutexGuard<'a, GeneratorState>,
}

impl GeneratorGuard<'_> {
    /// The lane origin for this call
    pub(crate) fn lanes(&self) -> LaneBase {
        LaneBase {
            seed: self.state.seed,
            base: self.state.position,
        }
    }

    /// Advance past the `lanes` positions this call consumed
    pub(crate) fn commit(&mut self, lanes: usize) {
        let from = self.state.position;
        self.state.position = from.wrapping_add(lanes as u64);
        log::trace!(
            "generator position {} -> {} ({} lanes)",
            from,
            self.state.position,
            lanes
        );
    }
}

/// Seed and first lane of a call; `Copy` so worker threads can share it
#[derive(Clone, Copy, Debug)]
pub(crate) struct LaneBase {
    seed: u64,
    base: u64,
}

impl LaneBase {
    /// Stream for relative lane `index`
    #[inline]
    pub(crate) fn stream(&self, index: usize) -> PhiloxStream {
        PhiloxStream::new(self.seed, self.base.wrapping_add(index as u64))
    }

    /// Absolute position of the first lane
    pub(crate) fn base(&self) -> u64 {
        self.base
    }
}
