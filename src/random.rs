// src/random.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reproducible row-oriented random sequences
//!
//! Every column of every table is backed by its own linear congruential
//! sequence with a fixed seed and a declared number of draws per row.
//! `finish_row()` always moves the seed by the full per-row budget, so the
//! seed before row `n` is a pure function of `n`. That is what allows a
//! partition to jump straight to its first row with `advance_rows()`.

use crate::error::{GenError, Result};

/// Row accounting shared by sequences and the column generators built on them
pub trait RowRandom {
    /// Close the current row, skipping any draws the row did not consume
    fn finish_row(&mut self);

    /// Skip `rows` complete rows without materializing them
    fn advance_rows(&mut self, rows: u64);
}

/// 32-bit Park-Miller sequence: `seed = seed * 16807 mod (2^31 - 1)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRandomInt {
    seed: i64,
    usage_per_row: u64,
    usage: u64,
}

impl RowRandomInt {
    pub const MULTIPLIER: i64 = 16_807;
    pub const MODULUS: i64 = 2_147_483_647;

    pub fn new(seed: i64, usage_per_row: u64) -> Self {
        Self {
            seed,
            usage_per_row,
            usage: 0,
        }
    }

    /// Draw a value in `[low, high]`
    ///
    /// The value is mapped by scaling `seed / MODULUS` onto the interval and
    /// truncating, so the mapping never rejects and never redraws.
    pub fn next_int(&mut self, low: i64, high: i64) -> Result<i64> {
        if self.usage >= self.usage_per_row {
            return Err(GenError::UsageExceeded {
                limit: self.usage_per_row,
            });
        }
        self.seed = (self.seed * Self::MULTIPLIER) % Self::MODULUS;
        self.usage += 1;

        let interval = high - low + 1;
        let offset = (self.seed as f64 / Self::MODULUS as f64 * interval as f64) as i64;
        Ok(low + offset)
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn usage_per_row(&self) -> u64 {
        self.usage_per_row
    }

    /// Advance the seed by `count` draws in O(log count)
    fn advance_seed(&mut self, mut count: u64) {
        let mut multiplier = Self::MULTIPLIER;
        while count > 0 {
            if count % 2 != 0 {
                self.seed = (multiplier * self.seed) % Self::MODULUS;
            }
            count /= 2;
            multiplier = (multiplier * multiplier) % Self::MODULUS;
        }
    }
}

impl RowRandom for RowRandomInt {
    fn finish_row(&mut self) {
        self.advance_seed(self.usage_per_row - self.usage);
        self.usage = 0;
    }

    fn advance_rows(&mut self, rows: u64) {
        if self.usage != 0 {
            self.finish_row();
        }
        self.advance_seed(self.usage_per_row * rows);
    }
}

/// 64-bit sequence: `seed = seed * MULTIPLIER + 1` with wrapping arithmetic
///
/// Used for keys once the scale factor pushes them past the 32-bit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRandomLong {
    seed: i64,
    usage_per_row: u64,
    usage: u64,
}

impl RowRandomLong {
    pub const MULTIPLIER: i64 = 6_364_136_223_846_793_005;
    pub const INCREMENT: i64 = 1;

    pub fn new(seed: i64, usage_per_row: u64) -> Self {
        Self {
            seed,
            usage_per_row,
            usage: 0,
        }
    }

    /// Draw a value in `[low, high]` as `low + |seed| mod (high - low + 1)`
    pub fn next_long(&mut self, low: i64, high: i64) -> Result<i64> {
        if self.usage >= self.usage_per_row {
            return Err(GenError::UsageExceeded {
                limit: self.usage_per_row,
            });
        }
        self.seed = self
            .seed
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.usage += 1;

        let interval = (high - low + 1) as u64;
        Ok(low + (self.seed.unsigned_abs() % interval) as i64)
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Advance the seed by `count` draws in O(log count)
    ///
    /// Composes the affine step `x -> a*x + c` with itself by squaring:
    /// `(a, c) ∘ (a, c) = (a*a, (a + 1)*c)`.
    fn advance_seed(&mut self, mut count: u64) {
        let mut step_mult = Self::MULTIPLIER;
        let mut step_plus = Self::INCREMENT;
        let mut acc_mult: i64 = 1;
        let mut acc_plus: i64 = 0;
        while count > 0 {
            if count & 1 != 0 {
                acc_mult = acc_mult.wrapping_mul(step_mult);
                acc_plus = acc_plus.wrapping_mul(step_mult).wrapping_add(step_plus);
            }
            step_plus = step_mult.wrapping_add(1).wrapping_mul(step_plus);
            step_mult = step_mult.wrapping_mul(step_mult);
            count >>= 1;
        }
        self.seed = acc_mult.wrapping_mul(self.seed).wrapping_add(acc_plus);
    }
}

impl RowRandom for RowRandomLong {
    fn finish_row(&mut self) {
        self.advance_seed(self.usage_per_row - self.usage);
        self.usage = 0;
    }

    fn advance_rows(&mut self, rows: u64) {
        if self.usage != 0 {
            self.finish_row();
        }
        self.advance_seed(self.usage_per_row * rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_int_first_draws() {
        let mut random = RowRandomInt::new(1, 3);
        assert_eq!(random.next_int(0, i32::MAX as i64).unwrap(), 16_807);
        assert_eq!(random.seed(), 16_807);
        random.next_int(0, 10).unwrap();
        assert_eq!(random.seed(), 16_807 * 16_807);
    }

    #[test]
    fn test_int_values_stay_in_range() {
        let mut random = RowRandomInt::new(121_321_321, 1);
        for _ in 0..10_000 {
            let value = random.next_int(1, 100).unwrap();
            assert!((1..=100).contains(&value));
            random.finish_row();
        }
    }

    #[test]
    fn test_usage_budget_is_enforced() {
        let mut random = RowRandomInt::new(42, 2);
        random.next_int(0, 9).unwrap();
        random.next_int(0, 9).unwrap();
        assert_eq!(
            random.next_int(0, 9),
            Err(GenError::UsageExceeded { limit: 2 })
        );

        let mut long = RowRandomLong::new(42, 1);
        long.next_long(0, 9).unwrap();
        assert!(long.next_long(0, 9).is_err());
        long.finish_row();
        assert!(long.next_long(0, 9).is_ok());
    }

    #[test]
    fn test_finish_row_depends_only_on_row_index() {
        // One row consumes 1 draw, the other all 4; both end up in the same place
        let mut sparse = RowRandomInt::new(7, 4);
        let mut dense = RowRandomInt::new(7, 4);
        sparse.next_int(0, 100).unwrap();
        sparse.finish_row();
        for _ in 0..4 {
            dense.next_int(0, 100).unwrap();
        }
        dense.finish_row();
        assert_eq!(sparse.seed(), dense.seed());
    }

    #[test]
    fn test_int_advance_matches_sequential_draws() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let usage = rng.random_range(1..8u64);
            let rows = rng.random_range(0..5_000u64);
            let seed = rng.random_range(1..RowRandomInt::MODULUS);

            let mut stepped = RowRandomInt::new(seed, usage);
            for _ in 0..rows {
                stepped.next_int(0, 1000).unwrap();
                stepped.finish_row();
            }
            let mut skipped = RowRandomInt::new(seed, usage);
            skipped.advance_rows(rows);

            assert_eq!(stepped.seed(), skipped.seed());
            assert_eq!(
                stepped.next_int(0, 1_000_000).unwrap(),
                skipped.next_int(0, 1_000_000).unwrap()
            );
        }
    }

    #[test]
    fn test_long_advance_matches_sequential_draws() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x10c9);
        for _ in 0..50 {
            let usage = rng.random_range(1..8u64);
            let rows = rng.random_range(0..5_000u64);
            let seed = rng.random_range(i64::MIN..i64::MAX);

            let mut stepped = RowRandomLong::new(seed, usage);
            for _ in 0..rows {
                for _ in 0..usage {
                    stepped.next_long(1, 6_000_000_000).unwrap();
                }
                stepped.finish_row();
            }
            let mut skipped = RowRandomLong::new(seed, usage);
            skipped.advance_rows(rows);

            assert_eq!(stepped.seed(), skipped.seed());
        }
    }

    #[test]
    fn test_advance_finishes_partial_row() {
        let mut partial = RowRandomInt::new(99, 3);
        partial.next_int(0, 5).unwrap();
        partial.advance_rows(2);

        let mut clean = RowRandomInt::new(99, 3);
        clean.advance_rows(3);
        assert_eq!(partial.seed(), clean.seed());
    }

    #[test]
    fn test_long_values_stay_in_range() {
        let mut random = RowRandomLong::new(851_767_375, 1);
        for _ in 0..10_000 {
            let value = random.next_long(1, 4_500_000_000).unwrap();
            assert!((1..=4_500_000_000).contains(&value));
            random.finish_row();
        }
    }
}
