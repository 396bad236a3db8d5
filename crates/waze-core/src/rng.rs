//! A small deterministic RNG wrapper used for random node sampling when
//! spawning cars (the Rust equivalent of the original's `math/rand`-backed
//! `randomRequest` helper).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seedable RNG for picking random source/destination nodes.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniform index in `0..len`. Returns `None` for an empty range.
    pub fn gen_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.0.gen_range(0..len))
        }
    }

    /// Sample two distinct uniform indices in `0..len`, retrying until they
    /// differ. Returns `None` if `len < 2`.
    pub fn gen_distinct_pair(&mut self, len: usize) -> Option<(usize, usize)> {
        if len < 2 {
            return None;
        }
        let a = self.0.gen_range(0..len);
        loop {
            let b = self.0.gen_range(0..len);
            if b != a {
                return Some((a, b));
            }
        }
    }
}
