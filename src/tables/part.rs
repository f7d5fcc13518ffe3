// src/tables/part.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use super::{Decimal, Partition, RowGenerator, TpchRow};
use crate::columns::{BoundedRandomInt, RandomString, RandomStringSequence, RandomText};
use crate::constants::PART_SCALE_BASE;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::random::RowRandom;

const NAME_WORDS: usize = 5;
const MANUFACTURER_MIN: i64 = 1;
const MANUFACTURER_MAX: i64 = 5;
const BRAND_MIN: i64 = 1;
const BRAND_MAX: i64 = 5;
const SIZE_MIN: i64 = 1;
const SIZE_MAX: i64 = 50;
const COMMENT_AVERAGE_LENGTH: f64 = 14.0;

/// Retail price of a part in hundredths, a pure function of its key
///
/// Line items price themselves with this too, so it must not depend on
/// generator state.
pub fn part_price(part_key: i64) -> i64 {
    90_000 + (part_key / 10) % 20_001 + (part_key % 1_000) * 100
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub p_partkey: i64,
    pub p_name: String,
    pub p_mfgr: String,
    pub p_brand: String,
    pub p_type: String,
    pub p_size: i64,
    pub p_container: String,
    pub p_retailprice: Decimal,
    pub p_comment: String,
}

impl TpchRow for Part {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.p_partkey,
            self.p_name,
            self.p_mfgr,
            self.p_brand,
            self.p_type,
            self.p_size,
            self.p_container,
            self.p_retailprice,
            self.p_comment,
        )
    }
}

pub struct PartGenerator {
    start: u64,
    row_count: u64,
    emitted: u64,
    name: RandomStringSequence,
    manufacturer: BoundedRandomInt,
    brand: BoundedRandomInt,
    part_type: RandomString,
    size: BoundedRandomInt,
    container: RandomString,
    comment: RandomText,
}

impl PartGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        let start = partition.start_row(PART_SCALE_BASE);
        let mut generator = Self {
            start,
            row_count: partition.row_count(PART_SCALE_BASE),
            emitted: 0,
            name: RandomStringSequence::new(709_314_158, NAME_WORDS, ctx.distribution("colors")?, 1)?,
            manufacturer: BoundedRandomInt::new(1, 1, MANUFACTURER_MIN, MANUFACTURER_MAX),
            brand: BoundedRandomInt::new(46_831_694, 1, BRAND_MIN, BRAND_MAX),
            part_type: RandomString::new(1_841_581_359, ctx.distribution("p_types")?, 1),
            size: BoundedRandomInt::new(1_193_163_244, 1, SIZE_MIN, SIZE_MAX),
            container: RandomString::new(727_633_698, ctx.distribution("p_cntr")?, 1),
            comment: RandomText::new(804_159_733, COMMENT_AVERAGE_LENGTH, 1, ctx.text_pool()?)?,
        };
        for column in generator.columns_mut() {
            column.advance_rows(start);
        }

        tracing::debug!(
            "Part partition {}/{}: start {}, {} rows",
            partition.index(),
            partition.count(),
            generator.start,
            generator.row_count
        );
        Ok(generator)
    }

    fn columns_mut(&mut self) -> [&mut dyn RowRandom; 7] {
        [
            &mut self.name,
            &mut self.manufacturer,
            &mut self.brand,
            &mut self.part_type,
            &mut self.size,
            &mut self.container,
            &mut self.comment,
        ]
    }
}

impl RowGenerator for PartGenerator {
    type Row = Part;

    fn next_row(&mut self) -> Result<Option<Part>> {
        if self.emitted >= self.row_count {
            return Ok(None);
        }

        let key = (self.start + self.emitted + 1) as i64;
        let manufacturer = self.manufacturer.next_value()?;
        let brand = manufacturer * 10 + self.brand.next_value()?;
        let part = Part {
            p_partkey: key,
            p_name: self.name.next_value()?,
            p_mfgr: format!("Manufacturer#{}", manufacturer),
            p_brand: format!("Brand#{}", brand),
            p_type: self.part_type.next_value()?,
            p_size: self.size.next_value()?,
            p_container: self.container.next_value()?,
            p_retailprice: Decimal(part_price(key)),
            p_comment: self.comment.next_value()?,
        };

        for column in self.columns_mut() {
            column.finish_row();
        }
        self.emitted += 1;
        Ok(Some(part))
    }

    fn capacity(&self) -> u64 {
        self.row_count
    }
}
