// src/tables/nation.rs
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
pub struct Nation {
    pub n_nationkey: i64,
    pub n_name: String,
    pub n_regionkey: i64,
    pub n_comment: String,
}

impl TpchRow for Nation {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.n_nationkey,
            self.n_name,
            self.n_regionkey,
            self.n_comment,
        )
    }
}

/// The fixed nation table; the distribution weight of a nation is its region
pub struct NationGenerator {
    nations: Arc<Distribution>,
    emitted: usize,
    comment: RandomText,
}

impl NationGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        partition.require_single()?;
        Ok(Self {
            nations: ctx.distribution("nations")?,
            emitted: 0,
            comment: RandomText::new(606_179_079, COMMENT_AVERAGE_LENGTH, 1, ctx.text_pool()?)?,
        })
    }
}

impl RowGenerator for NationGenerator {
    type Row = Nation;

    fn next_row(&mut self) -> Result<Option<Nation>> {
        if self.emitted >= self.nations.size() {
            return Ok(None);
        }

        let index = self.emitted;
        let nation = Nation {
            n_nationkey: index as i64,
            n_name: self.nations.term(index)?.to_string(),
            // the declared weight is the region key, not the running sum
            n_regionkey: self.nations.weight(index)?,
            n_comment: self.comment.next_value()?,
        };
        self.comment.finish_row();
        self.emitted += 1;
        Ok(Some(nation))
    }

    fn capacity(&self) -> u64 {
        self.nations.size() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use crate::tables::test_support::collect_rows;
    use crate::context::test_context;

    #[test]
    fn test_nation_rows() {
        let ctx = test_context();
        let generator = NationGenerator::new(ctx, Partition::single(1.0).unwrap()).unwrap();
        assert_eq!(generator.capacity(), 25);

        let rows = collect_rows(generator);
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0].n_name, "ALGERIA");
        assert_eq!(rows[0].n_regionkey, 0);
        assert_eq!(rows[1].n_name, "ARGENTINA");
        assert_eq!(rows[1].n_regionkey, 1);
        assert_eq!(rows[24].n_nationkey, 24);
        assert!(rows.iter().all(|n| (0..5).contains(&n.n_regionkey)));
    }

    #[test]
    fn test_nation_rejects_second_partition() {
        let ctx = test_context();
        let result = NationGenerator::new(ctx, Partition::new(1.0, 2, 2).unwrap());
        assert!(matches!(
            result,
            Err(GenError::InvalidPartition { index: 2, count: 2, .. })
        ));
    }
}
