//! Random source used by the generation stages.
//!
//! Stages only need uniform draws in a range; any `rand::Rng` qualifies.
//! Results are deterministic given the seed and the order of calls.

use rand::Rng;

/// Uniform random draws, deterministic given a seed and call order.
pub trait RandomSource {
    /// Uniform integer in `[lo, hi)`. Returns `lo` when the range is empty.
    fn uniform_usize(&mut self, lo: usize, hi: usize) -> usize;

    /// Uniform float in `[lo, hi)`. Returns `lo` when the range is empty.
    fn uniform_f32(&mut self, lo: f32, hi: f32) -> f32;

    /// Seed for a noise generator.
    fn noise_seed(&mut self) -> u32;
}

impl<R: Rng> RandomSource for R {
    fn uniform_usize(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        self.gen_range(lo..hi)
    }

    fn uniform_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if !(hi > lo) {
            return lo;
        }
        self.gen_range(lo..hi)
    }

    fn noise_seed(&mut self) -> u32 {
        self.gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_ranges_return_lower_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(rng.uniform_usize(5, 5), 5);
        assert_eq!(rng.uniform_usize(7, 3), 7);
        assert_eq!(rng.uniform_f32(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_draws_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..1000 {
            let i = rng.uniform_usize(3, 10);
            assert!((3..10).contains(&i));
            let f = rng.uniform_f32(-1.0, 1.0);
            assert!((-1.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(a.uniform_usize(0, 1000), b.uniform_usize(0, 1000));
            assert_eq!(a.noise_seed(), b.noise_seed());
        }
    }
}
