// src/context.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only state shared by every generator
//!
//! Distributions are parsed when the context is created; the text pool is
//! built on first use because it dominates start-up time. Both are handed
//! out as `Arc`s so generators on different threads read the same copy.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::constants::DEFAULT_TEXT_POOL_SIZE;
use crate::distribution::{Distribution, Distributions};
use crate::error::{GenError, Result};
use crate::text_pool::TextPool;

static SHARED: OnceLock<std::result::Result<GenerationContext, GenError>> = OnceLock::new();

#[derive(Debug)]
pub struct GenerationContext {
    distributions: Arc<Distributions>,
    text_pool_size: usize,
    text_pool: OnceLock<std::result::Result<Arc<TextPool>, GenError>>,
}

impl GenerationContext {
    pub fn new(distributions: Distributions, text_pool_size: usize) -> Self {
        Self {
            distributions: Arc::new(distributions),
            text_pool_size,
            text_pool: OnceLock::new(),
        }
    }

    /// Bundled distributions with a text pool of `text_pool_size` bytes
    pub fn bundled(text_pool_size: usize) -> Result<Self> {
        Ok(Self::new(Distributions::bundled()?, text_pool_size))
    }

    /// Distributions read from a definition file
    pub fn from_path(path: impl AsRef<Path>, text_pool_size: usize) -> Result<Self> {
        Ok(Self::new(Distributions::from_path(path)?, text_pool_size))
    }

    /// Process-wide context: bundled distributions, default pool size
    ///
    /// Initialised exactly once; concurrent first callers wait for the
    /// winner and all observe the same outcome.
    pub fn shared() -> Result<&'static GenerationContext> {
        SHARED
            .get_or_init(|| {
                tracing::info!("Initializing shared generation context");
                Self::bundled(DEFAULT_TEXT_POOL_SIZE)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn distributions(&self) -> &Distributions {
        &self.distributions
    }

    pub fn distribution(&self, name: &str) -> Result<Arc<Distribution>> {
        self.distributions.shared(name)
    }

    pub fn text_pool_size(&self) -> usize {
        self.text_pool_size
    }

    /// The text pool, built on the first call
    pub fn text_pool(&self) -> Result<Arc<TextPool>> {
        self.text_pool
            .get_or_init(|| {
                TextPool::generate(&self.distributions, self.text_pool_size).map(Arc::new)
            })
            .clone()
    }
}

/// Small context shared by the unit tests of every module
#[cfg(test)]
pub(crate) fn test_context() -> &'static GenerationContext {
    static TEST_CONTEXT: OnceLock<GenerationContext> = OnceLock::new();
    TEST_CONTEXT.get_or_init(|| {
        GenerationContext::bundled(1024 * 1024).expect("bundled distributions must parse")
    })
}
