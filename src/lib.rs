// src/lib.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic, partitionable TPC-H data generation
//!
//! This library provides:
//! - Seeded row sequences with O(log n) skip-ahead, so any partition of any
//!   table can be generated on its own
//! - Weighted vocabularies loaded from a `dists.dss` definition file
//! - A shared grammar-generated text pool for comment columns
//! - Row generators for all eight tables, with JSON or `.tbl` output
//! - Parallel generation of partitioned tables on a rayon pool

// Core modules
pub mod columns;
pub mod constants;
pub mod context;
pub mod dates;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod random;
pub mod tables;
pub mod text_pool;

// Re-export main API
pub use context::GenerationContext;
pub use distribution::{Distribution, Distributions};
pub use error::{GenError, Result};
pub use generator::{
    generate_table_simple, GeneratorConfig, PartitionGenerator, RowSource, TableGenerator,
};
pub use random::{RowRandom, RowRandomInt, RowRandomLong};
pub use tables::{Decimal, Partition, RowFormat, RowGenerator, Table, TpchRow};
pub use text_pool::TextPool;
