// src/tables/partsupp.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use super::{Decimal, Partition, RowGenerator, TpchRow};
use crate::columns::{BoundedRandomInt, RandomText};
use crate::constants::{PART_SCALE_BASE, SUPPLIER_SCALE_BASE};
use crate::context::GenerationContext;
use crate::error::Result;
use crate::random::RowRandom;

/// Rows per part; the generators' row is a part, not a part supplier
pub const SUPPLIERS_PER_PART: u64 = 4;

const AVAILABLE_QUANTITY_MIN: i64 = 1;
const AVAILABLE_QUANTITY_MAX: i64 = 9_999;
const SUPPLY_COST_MIN: i64 = 100;
const SUPPLY_COST_MAX: i64 = 100_000;
const COMMENT_AVERAGE_LENGTH: f64 = 124.0;

/// Key of the `supplier_number`-th supplier of a part
///
/// Spreads the suppliers of one part evenly over the supplier key space.
pub fn select_part_supplier(part_key: i64, supplier_number: i64, scale_factor: f64) -> i64 {
    let suppliers = ((SUPPLIER_SCALE_BASE as f64 * scale_factor) as i64).max(1);
    let stride = suppliers / SUPPLIERS_PER_PART as i64 + (part_key - 1) / suppliers;
    (part_key + supplier_number * stride) % suppliers + 1
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartSupp {
    pub ps_partkey: i64,
    pub ps_suppkey: i64,
    pub ps_availqty: i64,
    pub ps_supplycost: Decimal,
    pub ps_comment: String,
}

impl TpchRow for PartSupp {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.ps_partkey,
            self.ps_suppkey,
            self.ps_availqty,
            self.ps_supplycost,
            self.ps_comment,
        )
    }
}

pub struct PartSuppGenerator {
    scale_factor: f64,
    start: u64,
    part_count: u64,
    parts_done: u64,
    supplier_number: u64,
    available_quantity: BoundedRandomInt,
    supply_cost: BoundedRandomInt,
    comment: RandomText,
}

impl PartSuppGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        let start = partition.start_row(PART_SCALE_BASE);
        let mut generator = Self {
            scale_factor: partition.scale_factor(),
            start,
            part_count: partition.row_count(PART_SCALE_BASE),
            parts_done: 0,
            supplier_number: 0,
            available_quantity: BoundedRandomInt::new(
                1_671_059_989,
                SUPPLIERS_PER_PART,
                AVAILABLE_QUANTITY_MIN,
                AVAILABLE_QUANTITY_MAX,
            ),
            supply_cost: BoundedRandomInt::new(
                1_051_288_424,
                SUPPLIERS_PER_PART,
                SUPPLY_COST_MIN,
                SUPPLY_COST_MAX,
            ),
            comment: RandomText::new(
                1_961_692_154,
                COMMENT_AVERAGE_LENGTH,
                SUPPLIERS_PER_PART,
                ctx.text_pool()?,
            )?,
        };
        for column in generator.columns_mut() {
            column.advance_rows(start);
        }

        tracing::debug!(
            "PartSupp partition {}/{}: start part {}, {} parts",
            partition.index(),
            partition.count(),
            generator.start,
            generator.part_count
        );
        Ok(generator)
    }

    fn columns_mut(&mut self) -> [&mut dyn RowRandom; 3] {
        [
            &mut self.available_quantity,
            &mut self.supply_cost,
            &mut self.comment,
        ]
    }
}

impl RowGenerator for PartSuppGenerator {
    type Row = PartSupp;

    fn next_row(&mut self) -> Result<Option<PartSupp>> {
        if self.parts_done >= self.part_count {
            return Ok(None);
        }

        let part_key = (self.start + self.parts_done + 1) as i64;
        let row = PartSupp {
            ps_partkey: part_key,
            ps_suppkey: select_part_supplier(
                part_key,
                self.supplier_number as i64,
                self.scale_factor,
            ),
            ps_availqty: self.available_quantity.next_value()?,
            ps_supplycost: Decimal(self.supply_cost.next_value()?),
            ps_comment: self.comment.next_value()?,
        };

        self.supplier_number += 1;
        if self.supplier_number >= SUPPLIERS_PER_PART {
            for column in self.columns_mut() {
                column.finish_row();
            }
            self.parts_done += 1;
            self.supplier_number = 0;
        }
        Ok(Some(row))
    }

    fn capacity(&self) -> u64 {
        self.part_count * SUPPLIERS_PER_PART
    }
}
