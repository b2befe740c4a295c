//! Injectable randomness.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex};

/// A shareable random number generator.
///
/// Production code uses [`RandomSource::from_entropy`]; tests pass a seeded
/// generator so flag draws and card heights are reproducible.
#[derive(Clone)]
pub struct RandomSource {
    inner: Arc<Mutex<Box<dyn RngCore + Send>>>,
}

impl RandomSource {
    /// Wrap any generator.
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(rng))),
        }
    }

    /// Deterministic generator for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Run `f` with exclusive access to the generator.
    pub fn with<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        // A panic mid-draw leaves the generator in a valid state.
        let mut rng = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut **rng)
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}
