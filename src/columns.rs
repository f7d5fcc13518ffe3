// src/columns.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column value generators
//!
//! Each generator owns one sequence and declares how many draws a row may
//! take from it. Data dependent branches inside a row never change how far
//! the sequence moves per row, because `finish_row()` pads to the budget.

use std::sync::Arc;

use crate::constants::{HIGH_LENGTH_MULTIPLIER, LOW_LENGTH_MULTIPLIER};
use crate::distribution::Distribution;
use crate::error::{GenError, Result};
use crate::random::{RowRandom, RowRandomInt, RowRandomLong};
use crate::text_pool::TextPool;

/// Alphabet of `RandomAlphaNumeric`; exactly 64 characters so 6 bits index it
pub const ALPHA_NUMERIC: &[u8; 64] =
    b"0123456789abcdefghijklmnopqrstuvwxyz ABCDEFGHIJKLMNOPQRSTUVWXYZ,";

/// Draws per row of `RandomAlphaNumeric` (one length plus up to 8 index blocks)
pub const ALPHA_NUMERIC_USAGE_PER_ROW: u64 = 9;

/// Phone country codes wrap after this many nations
pub const NATIONS_MAX: i64 = 90;

fn length_bounds(average_length: f64) -> (i64, i64) {
    (
        (average_length * LOW_LENGTH_MULTIPLIER) as i64,
        (average_length * HIGH_LENGTH_MULTIPLIER) as i64,
    )
}

macro_rules! delegate_row_random {
    ($ty:ty, $field:ident) => {
        impl RowRandom for $ty {
            fn finish_row(&mut self) {
                self.$field.finish_row();
            }

            fn advance_rows(&mut self, rows: u64) {
                self.$field.advance_rows(rows);
            }
        }
    };
}

/// Integer uniformly drawn from a fixed range
#[derive(Debug, Clone)]
pub struct BoundedRandomInt {
    random: RowRandomInt,
    low: i64,
    high: i64,
}

impl BoundedRandomInt {
    pub fn new(seed: i64, usage_per_row: u64, low: i64, high: i64) -> Self {
        Self {
            random: RowRandomInt::new(seed, usage_per_row),
            low,
            high,
        }
    }

    pub fn next_value(&mut self) -> Result<i64> {
        self.random.next_int(self.low, self.high)
    }
}

delegate_row_random!(BoundedRandomInt, random);

#[derive(Debug, Clone)]
enum LongSource {
    Int(RowRandomInt),
    Long(RowRandomLong),
}

/// Key drawn from a range that may exceed what the 32-bit sequence covers
///
/// The 64-bit sequence is only used when asked for, so small scale factors
/// keep the 32-bit values.
#[derive(Debug, Clone)]
pub struct BoundedRandomLong {
    source: LongSource,
    low: i64,
    high: i64,
}

impl BoundedRandomLong {
    pub fn new(use_long: bool, seed: i64, usage_per_row: u64, low: i64, high: i64) -> Self {
        let source = if use_long {
            LongSource::Long(RowRandomLong::new(seed, usage_per_row))
        } else {
            LongSource::Int(RowRandomInt::new(seed, usage_per_row))
        };
        Self { source, low, high }
    }

    pub fn next_value(&mut self) -> Result<i64> {
        match &mut self.source {
            LongSource::Int(random) => random.next_int(self.low, self.high),
            LongSource::Long(random) => random.next_long(self.low, self.high),
        }
    }
}

impl RowRandom for BoundedRandomLong {
    fn finish_row(&mut self) {
        match &mut self.source {
            LongSource::Int(random) => random.finish_row(),
            LongSource::Long(random) => random.finish_row(),
        }
    }

    fn advance_rows(&mut self, rows: u64) {
        match &mut self.source {
            LongSource::Int(random) => random.advance_rows(rows),
            LongSource::Long(random) => random.advance_rows(rows),
        }
    }
}

/// Random string over `ALPHA_NUMERIC`, used for addresses
#[derive(Debug, Clone)]
pub struct RandomAlphaNumeric {
    random: RowRandomInt,
    min_length: i64,
    max_length: i64,
}

impl RandomAlphaNumeric {
    pub fn new(seed: i64, average_length: usize, expected_rows: u64) -> Self {
        let (min_length, max_length) = length_bounds(average_length as f64);
        Self {
            random: RowRandomInt::new(seed, ALPHA_NUMERIC_USAGE_PER_ROW * expected_rows),
            min_length,
            max_length,
        }
    }

    /// One draw yields 31 random bits; five 6-bit characters are taken from
    /// each before drawing again
    pub fn next_value(&mut self) -> Result<String> {
        let length = self.random.next_int(self.min_length, self.max_length)? as usize;
        let mut buffer = Vec::with_capacity(length);
        let mut index: i64 = 0;
        for i in 0..length {
            if i % 5 == 0 {
                index = self.random.next_int(0, i32::MAX as i64)?;
            }
            buffer.push(ALPHA_NUMERIC[(index & 0x3f) as usize]);
            index >>= 6;
        }
        // alphabet is ASCII
        Ok(buffer.into_iter().map(char::from).collect())
    }
}

delegate_row_random!(RandomAlphaNumeric, random);

/// Phone number `CC-NNN-NNN-NNNN` whose country code follows the nation key
#[derive(Debug, Clone)]
pub struct RandomPhoneNumber {
    random: RowRandomInt,
}

impl RandomPhoneNumber {
    pub fn new(seed: i64, expected_rows: u64) -> Self {
        Self {
            random: RowRandomInt::new(seed, 3 * expected_rows),
        }
    }

    pub fn next_value(&mut self, nation_key: i64) -> Result<String> {
        let exchange = self.random.next_int(100, 999)?;
        let prefix = self.random.next_int(100, 999)?;
        let line = self.random.next_int(1000, 9999)?;
        Ok(format!(
            "{:02}-{:03}-{:03}-{:04}",
            10 + nation_key % NATIONS_MAX,
            exchange,
            prefix,
            line
        ))
    }
}

delegate_row_random!(RandomPhoneNumber, random);

/// One weighted term of a distribution
#[derive(Debug, Clone)]
pub struct RandomString {
    random: RowRandomInt,
    distribution: Arc<Distribution>,
}

impl RandomString {
    pub fn new(seed: i64, distribution: Arc<Distribution>, expected_rows: u64) -> Self {
        Self {
            random: RowRandomInt::new(seed, expected_rows),
            distribution,
        }
    }

    pub fn next_value(&mut self) -> Result<String> {
        self.distribution
            .random_value(&mut self.random)
            .map(str::to_string)
    }
}

delegate_row_random!(RandomString, random);

/// `count` distinct terms of a distribution in random order, space separated
#[derive(Debug, Clone)]
pub struct RandomStringSequence {
    random: RowRandomInt,
    count: usize,
    distribution: Arc<Distribution>,
}

impl RandomStringSequence {
    pub fn new(
        seed: i64,
        count: usize,
        distribution: Arc<Distribution>,
        expected_rows: u64,
    ) -> Result<Self> {
        let size = distribution.size();
        if count >= size {
            return Err(GenError::InvalidSequenceLength {
                name: distribution.name().to_string(),
                count,
                size,
            });
        }
        Ok(Self {
            random: RowRandomInt::new(seed, size as u64 * expected_rows),
            count,
            distribution,
        })
    }

    /// Partial Fisher-Yates: only the first `count` positions are shuffled
    pub fn next_value(&mut self) -> Result<String> {
        let terms = self.distribution.terms();
        let mut order: Vec<usize> = (0..terms.len()).collect();
        let last = terms.len() as i64 - 1;
        for i in 0..self.count {
            let j = self.random.next_int(i as i64, last)? as usize;
            order.swap(i, j);
        }

        let picked: Vec<&str> = order[..self.count]
            .iter()
            .map(|&i| terms[i].as_str())
            .collect();
        Ok(picked.join(" "))
    }
}

delegate_row_random!(RandomStringSequence, random);

/// Window of the shared text pool, used for comments
#[derive(Debug, Clone)]
pub struct RandomText {
    random: RowRandomInt,
    pool: Arc<TextPool>,
    min_length: i64,
    max_length: i64,
}

impl RandomText {
    pub fn new(
        seed: i64,
        average_length: f64,
        expected_rows: u64,
        pool: Arc<TextPool>,
    ) -> Result<Self> {
        let (min_length, max_length) = length_bounds(average_length);
        if pool.len() < max_length as usize {
            return Err(GenError::TextPoolTooSmall {
                size: pool.len(),
                required: max_length as usize,
            });
        }
        Ok(Self {
            random: RowRandomInt::new(seed, 2 * expected_rows),
            pool,
            min_length,
            max_length,
        })
    }

    pub fn next_value(&mut self) -> Result<String> {
        let offset = self
            .random
            .next_int(0, self.pool.len() as i64 - self.max_length)?;
        let length = self.random.next_int(self.min_length, self.max_length)?;
        Ok(self
            .pool
            .slice(offset as usize, length as usize)
            .into_owned())
    }
}

delegate_row_random!(RandomText, random);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distributions;

    fn distributions() -> Distributions {
        Distributions::bundled().unwrap()
    }

    /// Values of row `skip` onwards, reached by skipping and by generating
    fn assert_skip_equivalent<G, V, F>(make: impl Fn() -> G, mut next: F, skip: u64)
    where
        G: RowRandom,
        V: PartialEq + std::fmt::Debug,
        F: FnMut(&mut G) -> V,
    {
        let mut stepped = make();
        for _ in 0..skip {
            next(&mut stepped);
            stepped.finish_row();
        }
        let mut skipped = make();
        skipped.advance_rows(skip);
        for _ in 0..5 {
            assert_eq!(next(&mut stepped), next(&mut skipped));
            stepped.finish_row();
            skipped.finish_row();
        }
    }

    #[test]
    fn test_alpha_numeric_length_and_alphabet() {
        let mut address = RandomAlphaNumeric::new(881_155_353, 25, 1);
        for _ in 0..1000 {
            let value = address.next_value().unwrap();
            assert!((10..=40).contains(&value.len()), "length {}", value.len());
            assert!(value.bytes().all(|b| ALPHA_NUMERIC.contains(&b)));
            address.finish_row();
        }
    }

    #[test]
    fn test_alpha_numeric_packs_five_characters_per_draw() {
        let mut address = RandomAlphaNumeric::new(706_178_559, 25, 1);
        let mut reference = RowRandomInt::new(706_178_559, ALPHA_NUMERIC_USAGE_PER_ROW);

        let value = address.next_value().unwrap();
        let length = reference.next_int(10, 40).unwrap() as usize;
        assert_eq!(value.len(), length);

        let mut expected = String::new();
        let mut bits = 0;
        for i in 0..length {
            if i % 5 == 0 {
                bits = reference.next_int(0, i32::MAX as i64).unwrap();
            }
            expected.push(ALPHA_NUMERIC[(bits & 0x3f) as usize] as char);
            bits >>= 6;
        }
        assert_eq!(value, expected);
    }

    #[test]
    fn test_phone_number_format() {
        let mut phone = RandomPhoneNumber::new(1_521_138_112, 1);
        for nation in 0..25 {
            let value = phone.next_value(nation).unwrap();
            let parts: Vec<&str> = value.split('-').collect();
            assert_eq!(parts.len(), 4);
            assert_eq!(parts[0], (10 + nation).to_string());
            assert_eq!(parts[1].len(), 3);
            assert_eq!(parts[2].len(), 3);
            assert_eq!(parts[3].len(), 4);
            phone.finish_row();
        }
    }

    #[test]
    fn test_string_sequence_picks_distinct_terms() {
        let dists = distributions();
        let colors = dists.shared("colors").unwrap();
        let mut name = RandomStringSequence::new(709_314_158, 5, colors.clone(), 1).unwrap();
        for _ in 0..500 {
            let value = name.next_value().unwrap();
            let words: Vec<&str> = value.split(' ').collect();
            assert_eq!(words.len(), 5);
            for (i, word) in words.iter().enumerate() {
                assert!(colors.terms().iter().any(|t| t == word));
                assert!(!words[i + 1..].contains(word));
            }
            name.finish_row();
        }
    }

    #[test]
    fn test_string_sequence_rejects_oversized_count() {
        let dists = distributions();
        let rflag = dists.shared("rflag").unwrap();
        assert!(matches!(
            RandomStringSequence::new(1, 2, rflag, 1),
            Err(GenError::InvalidSequenceLength { count: 2, size: 2, .. })
        ));
    }

    #[test]
    fn test_text_needs_large_enough_pool() {
        let dists = distributions();
        let pool = Arc::new(TextPool::generate(&dists, 100).unwrap());
        assert!(matches!(
            RandomText::new(1, 124.0, 1, pool),
            Err(GenError::TextPoolTooSmall { size: 100, required: 198 })
        ));
    }

    #[test]
    fn test_text_snippet_lengths() {
        let dists = distributions();
        let pool = Arc::new(TextPool::generate(&dists, 64 * 1024).unwrap());
        let mut comment = RandomText::new(1_335_826_707, 73.0, 1, pool).unwrap();
        for _ in 0..1000 {
            let value = comment.next_value().unwrap();
            assert!((29..=116).contains(&value.len()));
            comment.finish_row();
        }
    }

    #[test]
    fn test_budget_exceeded_is_reported() {
        let mut phone = RandomPhoneNumber::new(1, 1);
        phone.next_value(0).unwrap();
        assert_eq!(
            phone.next_value(0),
            Err(GenError::UsageExceeded { limit: 3 })
        );
    }

    #[test]
    fn test_skip_ahead_equivalence() {
        let dists = distributions();
        let pool = Arc::new(TextPool::generate(&dists, 64 * 1024).unwrap());
        let segments = dists.shared("msegmnt").unwrap();
        let colors = dists.shared("colors").unwrap();

        for skip in [0, 1, 7, 150, 4_321] {
            assert_skip_equivalent(
                || BoundedRandomInt::new(298_370_230, 1, -99_999, 999_999),
                |g: &mut BoundedRandomInt| g.next_value().unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || BoundedRandomLong::new(false, 851_767_375, 1, 1, 150_000),
                |g: &mut BoundedRandomLong| g.next_value().unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || BoundedRandomLong::new(true, 851_767_375, 7, 1, 6_000_000_000),
                |g: &mut BoundedRandomLong| g.next_value().unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || RandomAlphaNumeric::new(881_155_353, 25, 1),
                |g: &mut RandomAlphaNumeric| g.next_value().unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || RandomPhoneNumber::new(1_521_138_112, 1),
                |g: &mut RandomPhoneNumber| g.next_value(7).unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || RandomString::new(1_140_279_430, segments.clone(), 1),
                |g: &mut RandomString| g.next_value().unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || RandomStringSequence::new(709_314_158, 5, colors.clone(), 1).unwrap(),
                |g: &mut RandomStringSequence| g.next_value().unwrap(),
                skip,
            );
            assert_skip_equivalent(
                || RandomText::new(1_335_826_707, 73.0, 1, pool.clone()).unwrap(),
                |g: &mut RandomText| g.next_value().unwrap(),
                skip,
            );
        }
    }
}
