// src/distribution.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weighted term lists loaded from a `dists.dss` style definition file
//!
//! ```text
//! # comment
//! begin colors
//! COUNT|92
//! almond|1
//! ...
//! end colors
//! ```
//!
//! A section whose weights are all positive can be sampled: a flattened
//! index holding term `i` exactly `weight[i]` times turns a weighted draw
//! into a single uniform draw. A section with any non-positive weight is an
//! ordinal table (nations, regions) that is only ever read by position.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{GenError, Result};
use crate::random::RowRandomInt;

/// Definition file shipped with the crate
pub const BUNDLED_DISTRIBUTIONS: &str = include_str!("../assets/dists.dss");

/// A named weighted vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    name: String,
    terms: Vec<String>,
    /// Cumulative prefix sums of the declared weights
    weights: Vec<i64>,
    /// Term indices, each repeated by its weight; `None` for ordinal tables
    flattened: Option<Vec<usize>>,
    total_weight: i64,
}

impl Distribution {
    /// Build a distribution from `(term, weight)` pairs
    pub fn new(name: impl Into<String>, entries: Vec<(String, i64)>) -> Self {
        let samplable = !entries.is_empty() && entries.iter().all(|(_, weight)| *weight > 0);
        let total_weight: i64 = entries.iter().map(|(_, weight)| *weight).sum();

        let flattened = samplable.then(|| {
            let mut index = Vec::with_capacity(total_weight as usize);
            for (i, (_, weight)) in entries.iter().enumerate() {
                index.extend(std::iter::repeat(i).take(*weight as usize));
            }
            index
        });

        let mut terms = Vec::with_capacity(entries.len());
        let mut weights = Vec::with_capacity(entries.len());
        let mut running = 0;
        for (term, weight) in entries {
            running += weight;
            terms.push(term);
            weights.push(running);
        }

        Self {
            name: name.into(),
            terms,
            weights,
            flattened,
            total_weight,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of terms
    pub fn size(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_samplable(&self) -> bool {
        self.flattened.is_some()
    }

    /// Sum of all weights, `None` for ordinal tables
    pub fn total_weight(&self) -> Option<i64> {
        self.flattened.as_ref().map(|_| self.total_weight)
    }

    /// Term at ordinal position `index`
    pub fn term(&self, index: usize) -> Result<&str> {
        self.terms
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Cumulative weight up to and including `index`
    pub fn cumulative_weight(&self, index: usize) -> Result<i64> {
        self.weights
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Declared weight of the term at `index`, recovered from the prefix sums
    pub fn weight(&self, index: usize) -> Result<i64> {
        let upto = self.cumulative_weight(index)?;
        let before = if index == 0 { 0 } else { self.weights[index - 1] };
        Ok(upto - before)
    }

    /// Draw one term, weighted by its declared weight
    pub fn random_value(&self, random: &mut RowRandomInt) -> Result<&str> {
        let flattened = self
            .flattened
            .as_ref()
            .ok_or_else(|| GenError::NotSamplable(self.name.clone()))?;
        let index = random.next_int(0, self.total_weight - 1)? as usize;
        Ok(&self.terms[flattened[index]])
    }

    fn out_of_range(&self, index: usize) -> GenError {
        GenError::IndexOutOfRange {
            name: self.name.clone(),
            index,
            size: self.terms.len(),
        }
    }
}

/// Every distribution of a definition file, by name
#[derive(Debug, Clone, Default)]
pub struct Distributions {
    distributions: HashMap<String, Arc<Distribution>>,
}

impl Distributions {
    /// Parse a definition source
    ///
    /// Fails on the first malformed section; nothing is loaded partially.
    pub fn load(source: &str) -> Result<Self> {
        let mut distributions = HashMap::new();
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        while let Some((line_no, line)) = lines.next() {
            let name = match line.split_once(' ') {
                Some((keyword, name)) if keyword.eq_ignore_ascii_case("begin") => name.trim(),
                _ => {
                    return Err(format_error(
                        line_no,
                        format!("expected: begin <name>, found: {}", line),
                    ))
                }
            };
            if name.is_empty() {
                return Err(format_error(line_no, "section without a name".to_string()));
            }

            // count line
            if lines.next().is_none() {
                return Err(format_error(line_no, format!("section '{}' is empty", name)));
            }

            let mut entries = Vec::new();
            let mut terminated = false;
            for (line_no, line) in lines.by_ref() {
                if let Some((keyword, end_name)) = line.split_once(' ') {
                    if keyword.eq_ignore_ascii_case("end") {
                        if end_name.trim() != name {
                            return Err(format_error(
                                line_no,
                                format!("expected: end {}, found: {}", name, line),
                            ));
                        }
                        terminated = true;
                        break;
                    }
                }
                entries.push(parse_entry(line_no, line)?);
            }
            if !terminated {
                return Err(format_error(
                    line_no,
                    format!("section '{}' has no end marker", name),
                ));
            }

            tracing::trace!("Loaded distribution '{}' with {} terms", name, entries.len());
            distributions.insert(name.to_string(), Arc::new(Distribution::new(name, entries)));
        }

        tracing::debug!("Loaded {} distributions", distributions.len());
        Ok(Self { distributions })
    }

    /// Parse a definition file from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GenError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::load(&source)
    }

    /// The definitions shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::load(BUNDLED_DISTRIBUTIONS)
    }

    pub fn get(&self, name: &str) -> Result<&Arc<Distribution>> {
        self.distributions
            .get(name)
            .ok_or_else(|| GenError::MissingDistribution(name.to_string()))
    }

    /// Shared handle to a distribution, for generators that outlive the borrow
    pub fn shared(&self, name: &str) -> Result<Arc<Distribution>> {
        self.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}

fn parse_entry(line_no: usize, line: &str) -> Result<(String, i64)> {
    let mut fields = line.split('|');
    let (term, weight) = match (fields.next(), fields.next(), fields.next()) {
        (Some(term), Some(weight), None) => (term, weight),
        _ => return Err(format_error(line_no, format!("found: {}", line))),
    };
    let weight = weight.trim().parse::<i64>().map_err(|e| {
        format_error(line_no, format!("invalid weight '{}': {}", weight, e))
    })?;
    Ok((term.to_string(), weight))
}

fn format_error(line: usize, message: String) -> GenError {
    GenError::DistributionFormat { line, message }
}
