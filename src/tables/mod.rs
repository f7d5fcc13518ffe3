// src/tables/mod.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row generators for the eight tables
//!
//! Every generator owns its column generators as named fields. Building a
//! generator for partition `i` of `n` moves all of them to the partition's
//! first row with `advance_rows()`, so partitions can be produced in any
//! order and on any thread.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::constants::{
    CUSTOMER_SCALE_BASE, ORDER_SCALE_BASE, PART_SCALE_BASE, SUPPLIER_SCALE_BASE,
};
use crate::error::{GenError, Result};

/// Append `field|` for every field, the way dbgen writes `.tbl` rows
macro_rules! write_tbl_fields {
    ($out:expr, $($field:expr),+ $(,)?) => {{
        use std::fmt::Write as _;
        $( write!($out, "{}|", $field)?; )+
        Ok(())
    }};
}

pub mod customer;
pub mod lineitem;
pub mod nation;
pub mod orders;
pub mod part;
pub mod partsupp;
pub mod region;
pub mod supplier;

pub use customer::{Customer, CustomerGenerator};
pub use lineitem::{LineItem, LineItemGenerator};
pub use nation::{Nation, NationGenerator};
pub use orders::{Order, OrderGenerator};
pub use part::{part_price, Part, PartGenerator};
pub use partsupp::{select_part_supplier, PartSupp, PartSuppGenerator, SUPPLIERS_PER_PART};
pub use region::{Region, RegionGenerator};
pub use supplier::{Supplier, SupplierGenerator};

/// The tables of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Customer,
    Orders,
    LineItem,
    Part,
    PartSupp,
    Supplier,
    Nation,
    Region,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Customer,
        Table::Orders,
        Table::LineItem,
        Table::Part,
        Table::PartSupp,
        Table::Supplier,
        Table::Nation,
        Table::Region,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Customer => "customer",
            Table::Orders => "orders",
            Table::LineItem => "lineitem",
            Table::Part => "part",
            Table::PartSupp => "partsupp",
            Table::Supplier => "supplier",
            Table::Nation => "nation",
            Table::Region => "region",
        }
    }

    /// Rows per unit of scale factor of the table the partitions are cut from
    ///
    /// Line items are partitioned by order and part suppliers by part.
    /// Nation and region are fixed and return `None`.
    pub fn scale_base(self) -> Option<u64> {
        match self {
            Table::Customer => Some(CUSTOMER_SCALE_BASE),
            Table::Orders | Table::LineItem => Some(ORDER_SCALE_BASE),
            Table::Part | Table::PartSupp => Some(PART_SCALE_BASE),
            Table::Supplier => Some(SUPPLIER_SCALE_BASE),
            Table::Nation | Table::Region => None,
        }
    }

    pub fn is_fixed(self) -> bool {
        self.scale_base().is_none()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|table| table.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenError::UnknownTable(s.to_string()))
    }
}

/// One slice `index` of `count` of a table at a scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    scale_factor: f64,
    index: u32,
    count: u32,
}

impl Partition {
    /// `index` is 1-based and must not exceed `count`
    pub fn new(scale_factor: f64, index: u32, count: u32) -> Result<Self> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(GenError::InvalidScaleFactor(scale_factor));
        }
        let reason = if count == 0 {
            Some("partition count must be at least 1")
        } else if index == 0 || index > count {
            Some("partition index must be within 1..=count")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(GenError::InvalidPartition {
                index,
                count,
                reason,
            }),
            None => Ok(Self {
                scale_factor,
                index,
                count,
            }),
        }
    }

    /// The whole table as a single partition
    pub fn single(scale_factor: f64) -> Result<Self> {
        Self::new(scale_factor, 1, 1)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    fn total_rows(&self, scale_base: u64) -> u64 {
        (scale_base as f64 * self.scale_factor) as u64
    }

    /// Zero-based index of the partition's first row
    pub fn start_row(&self, scale_base: u64) -> u64 {
        self.total_rows(scale_base) / self.count as u64 * (self.index as u64 - 1)
    }

    /// Rows in the partition; the last one also takes the remainder
    pub fn row_count(&self, scale_base: u64) -> u64 {
        let total = self.total_rows(scale_base);
        let rows = total / self.count as u64;
        if self.index == self.count {
            rows + total % self.count as u64
        } else {
            rows
        }
    }

    /// Fixed tables only exist as partition 1 of 1
    pub(crate) fn require_single(&self) -> Result<()> {
        if self.index == 1 && self.count == 1 {
            Ok(())
        } else {
            Err(GenError::InvalidPartition {
                index: self.index,
                count: self.count,
                reason: "fixed tables are generated as a single partition",
            })
        }
    }
}

/// Money value in hundredths, written with exactly two decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Decimal(pub i64);

impl Decimal {
    pub fn hundredths(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Decimal {
    type Err = String;

    /// Accepts `123`, `123.4` and `-123.45`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || format!("invalid decimal '{}'", s);
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty()
            || fraction.len() > 2
            || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid())?,
        };
        let value = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;
        Ok(Decimal(if negative { -value } else { value }))
    }
}

/// Emitted as a bare JSON number so `901.00` keeps its trailing zeros
impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::Error;
        let raw = serde_json::value::RawValue::from_string(self.to_string())
            .map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

/// How rows are turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowFormat {
    /// One JSON object per row, fields in schema order
    #[default]
    Json,
    /// Pipe-delimited line with a trailing `|`
    Tbl,
}

/// A generated record
pub trait TpchRow: Serialize {
    /// Write the row in `.tbl` form, without a line terminator
    fn write_tbl(&self, out: &mut String) -> fmt::Result;

    fn to_tbl(&self) -> String {
        let mut out = String::with_capacity(128);
        // writing to a String cannot fail
        let _ = self.write_tbl(&mut out);
        out
    }

    fn serialize_as(&self, format: RowFormat) -> Result<Bytes> {
        match format {
            RowFormat::Json => Ok(Bytes::from(serde_json::to_vec(self)?)),
            RowFormat::Tbl => Ok(Bytes::from(self.to_tbl())),
        }
    }
}

/// Produces the rows of one partition of one table
pub trait RowGenerator {
    type Row: TpchRow;

    /// The next row, or `None` once the partition is exhausted
    fn next_row(&mut self) -> Result<Option<Self::Row>>;

    /// Total number of rows this generator yields
    fn capacity(&self) -> u64;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_ranges_cover_table() {
        for count in [1, 2, 3, 4, 7] {
            let mut next_start = 0;
            for index in 1..=count {
                let partition = Partition::new(0.01, index, count).unwrap();
                assert_eq!(partition.start_row(CUSTOMER_SCALE_BASE), next_start);
                next_start += partition.row_count(CUSTOMER_SCALE_BASE);
            }
            assert_eq!(next_start, 1500);
        }

        let last = Partition::new(0.001, 7, 7).unwrap();
        assert_eq!(last.start_row(CUSTOMER_SCALE_BASE), 126);
        assert_eq!(last.row_count(CUSTOMER_SCALE_BASE), 21 + 150 % 7);
    }

    #[test]
    fn test_invalid_partitions() {
        assert!(matches!(
            Partition::new(1.0, 0, 1),
            Err(GenError::InvalidPartition { index: 0, .. })
        ));
        assert!(matches!(
            Partition::new(1.0, 3, 2),
            Err(GenError::InvalidPartition { index: 3, count: 2, .. })
        ));
        assert!(matches!(
            Partition::new(1.0, 1, 0),
            Err(GenError::InvalidPartition { count: 0, .. })
        ));
        assert_eq!(
            Partition::new(-1.0, 1, 1),
            Err(GenError::InvalidScaleFactor(-1.0))
        );
        assert!(Partition::new(f64::NAN, 1, 1).is_err());
        assert!(Partition::new(1.0, 2, 2).unwrap().require_single().is_err());
    }

    #[test]
    fn test_decimal_display() {
        assert_eq!(Decimal(90100).to_string(), "901.00");
        assert_eq!(Decimal(5).to_string(), "0.05");
        assert_eq!(Decimal(-50).to_string(), "-0.50");
        assert_eq!(Decimal(-99_999).to_string(), "-999.99");
        assert_eq!(Decimal(0).to_string(), "0.00");
    }

    #[test]
    fn test_decimal_parse() {
        assert_eq!("901.00".parse::<Decimal>(), Ok(Decimal(90100)));
        assert_eq!("-0.5".parse::<Decimal>(), Ok(Decimal(-50)));
        assert_eq!("17".parse::<Decimal>(), Ok(Decimal(1700)));
        for bad in ["", "abc", "1.234", "-", ".5", "1.x", "1e3"] {
            assert!(bad.parse::<Decimal>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_decimal_serializes_as_number() {
        #[derive(Serialize)]
        struct Price {
            price: Decimal,
        }
        let json = serde_json::to_string(&Price {
            price: Decimal(-12_345),
        })
        .unwrap();
        assert_eq!(json, r#"{"price":-123.45}"#);
    }

    #[test]
    fn test_table_names() {
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
        assert_eq!("LINEITEM".parse::<Table>().unwrap(), Table::LineItem);
        assert_eq!(
            "lineitems".parse::<Table>(),
            Err(GenError::UnknownTable("lineitems".to_string()))
        );
        assert_eq!(Table::PartSupp.scale_base(), Some(PART_SCALE_BASE));
        assert!(Table::Region.is_fixed());
    }
}
