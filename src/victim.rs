//! Victim selection for evictions from a full bucket.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of the slot to kick when inserting into a full bucket.
///
/// Implementations must return a position in `0..slots`, ideally uniformly
/// distributed. Tests can plug in a scripted selector to make evictions
/// deterministic.
pub trait SlotSelector {
    fn select(&mut self, slots: usize) -> usize;
}

impl<S: SlotSelector + ?Sized> SlotSelector for &mut S {
    #[inline]
    fn select(&mut self, slots: usize) -> usize {
        (**self).select(slots)
    }
}

/// Uniform selector backed by [`StdRng`]
#[derive(Clone, Debug)]
pub struct RandomSlots {
    rng: StdRng,
}

impl RandomSlots {
    /// Selector seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Selector with a fixed seed, for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotSelector for RandomSlots {
    #[inline]
    fn select(&mut self, slots: usize) -> usize {
        self.rng.gen_range(0..slots)
    }
}
