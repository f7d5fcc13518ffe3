// src/tables/region.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use serde::Serialize;

use super::{Partition, RowGenerator, TpchRow};
use crate::columns::RandomText;
use crate::context::GenerationContext;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::random::RowRandom;

const COMMENT_AVERAGE_LENGTH: f64 = 72.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub r_regionkey: i64,
    pub r_name: String,
    pub r_comment: String,
}

impl TpchRow for Region {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(out, self.r_regionkey, self.r_name, self.r_comment)
    }
}

pub struct RegionGenerator {
    regions: Arc<Distribution>,
    emitted: usize,
    comment: RandomText,
}

impl RegionGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        partition.require_single()?;
        Ok(Self {
            regions: ctx.distribution("regions")?,
            emitted: 0,
            comment: RandomText::new(1_500_869_201, COMMENT_AVERAGE_LENGTH, 1, ctx.text_pool()?)?,
        })
    }
}

impl RowGenerator for RegionGenerator {
    type Row = Region;

    fn next_row(&mut self) -> Result<Option<Region>> {
        if self.emitted >= self.regions.size() {
            return Ok(None);
        }

        let region = Region {
            r_regionkey: self.emitted as i64,
            r_name: self.regions.term(self.emitted)?.to_string(),
            r_comment: self.comment.next_value()?,
        };
        self.comment.finish_row();
        self.emitted += 1;
        Ok(Some(region))
    }

    fn capacity(&self) -> u64 {
        self.regions.size() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_context;
    use crate::error::GenError;
    use crate::tables::test_support::collect_rows;

    #[test]
    fn test_region_rows() {
        let ctx = test_context();
        let rows = collect_rows(RegionGenerator::new(ctx, Partition::single(0.01).unwrap()).unwrap());
        let names: Vec<&str> = rows.iter().map(|r| r.r_name.as_str()).collect();
        assert_eq!(names, ["AFRICA", "AMERICA", "ASIA", "EUROPE", "MIDDLE EAST"]);
        assert!(rows.iter().all(|r| (28..=115).contains(&r.r_comment.len())));
        assert_eq!(
            rows[4].to_tbl(),
            format!("4|MIDDLE EAST|{}|", rows[4].r_comment)
        );
    }

    #[test]
    fn test_region_rejects_second_partition() {
        let ctx = test_context();
        assert!(matches!(
            RegionGenerator::new(ctx, Partition::new(1.0, 2, 3).unwrap()),
            Err(GenError::InvalidPartition { index: 2, count: 3, .. })
        ));
    }
}
