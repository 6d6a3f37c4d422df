//! Random-choice seam.
//!
//! Grouping picks a display sample per group and image search falls back to
//! one random document. Both go through [`SampleChooser`] so callers can
//! swap in a deterministic stub.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks an index in `0..len`. Never called with `len == 0`.
pub trait SampleChooser {
    fn choose(&mut self, len: usize) -> usize;
}

impl<F> SampleChooser for F
where
    F: FnMut(usize) -> usize,
{
    fn choose(&mut self, len: usize) -> usize {
        self(len)
    }
}

/// Uniform choice backed by a seedable RNG.
pub struct RandomChooser {
    rng: StdRng,
}

impl RandomChooser {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleChooser for RandomChooser {
    fn choose(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Always the same position, clamped to the last element.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedChooser(pub usize);

impl SampleChooser for FixedChooser {
    fn choose(&mut self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

/// Choose an element of `items` through `chooser`, or `None` when empty.
pub fn pick<'a, T>(items: &'a [T], chooser: &mut dyn SampleChooser) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let idx = chooser.choose(items.len()).min(items.len() - 1);
    items.get(idx)
}
