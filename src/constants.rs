// src/constants.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Default text pool size (300 MiB)
/// Comment and description fields are windows into this buffer
pub const DEFAULT_TEXT_POOL_SIZE: usize = 300 * 1024 * 1024;

/// Longest sentence the text grammar can emit, used to over-allocate the pool
pub const MAX_SENTENCE_LENGTH: usize = 256;

/// Fixed seed of the sequence that drives text pool construction
pub const TEXT_POOL_SEED: i64 = 933_588_178;

/// Random lengths are drawn from [0.4 * average, 1.6 * average]
pub const LOW_LENGTH_MULTIPLIER: f64 = 0.4;
pub const HIGH_LENGTH_MULTIPLIER: f64 = 1.6;

/// Rows per unit of scale factor
pub const CUSTOMER_SCALE_BASE: u64 = 150_000;
pub const ORDER_SCALE_BASE: u64 = 1_500_000;
pub const PART_SCALE_BASE: u64 = 200_000;
pub const SUPPLIER_SCALE_BASE: u64 = 10_000;

/// Scale factor from which keys no longer fit the 32-bit sequence
pub const LONG_KEY_SCALE_FACTOR: f64 = 30_000.0;

/// First order date, encoded as yyddd (1992-01-01)
pub const BASE_DATE: i64 = 92_001;
/// "Today" for return flags and line status, encoded as yyddd (1995-06-17)
pub const CURRENT_DATE: i64 = 95_168;
/// Number of days covered by the date table (1992-01-01 ..= 1998-12-31)
pub const DATE_RANGE: i64 = 2_557;
