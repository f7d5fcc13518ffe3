// src/tables/supplier.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use super::{Decimal, Partition, RowGenerator, TpchRow};
use crate::columns::{BoundedRandomInt, RandomAlphaNumeric, RandomPhoneNumber, RandomText};
use crate::constants::SUPPLIER_SCALE_BASE;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::random::RowRandom;

const ACCOUNT_BALANCE_MIN: i64 = -99_999;
const ACCOUNT_BALANCE_MAX: i64 = 999_999;
const ADDRESS_AVERAGE_LENGTH: usize = 25;
const COMMENT_AVERAGE_LENGTH: f64 = 63.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Supplier {
    pub s_suppkey: i64,
    pub s_name: String,
    pub s_address: String,
    pub s_nationkey: i64,
    pub s_phone: String,
    pub s_acctbal: Decimal,
    pub s_comment: String,
}

impl TpchRow for Supplier {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.s_suppkey,
            self.s_name,
            self.s_address,
            self.s_nationkey,
            self.s_phone,
            self.s_acctbal,
            self.s_comment,
        )
    }
}

pub struct SupplierGenerator {
    start: u64,
    row_count: u64,
    emitted: u64,
    address: RandomAlphaNumeric,
    nation_key: BoundedRandomInt,
    phone: RandomPhoneNumber,
    account_balance: BoundedRandomInt,
    comment: RandomText,
}

impl SupplierGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        let nations = ctx.distribution("nations")?;
        let start = partition.start_row(SUPPLIER_SCALE_BASE);
        let mut generator = Self {
            start,
            row_count: partition.row_count(SUPPLIER_SCALE_BASE),
            emitted: 0,
            address: RandomAlphaNumeric::new(706_178_559, ADDRESS_AVERAGE_LENGTH, 1),
            nation_key: BoundedRandomInt::new(110_356_601, 1, 0, nations.size() as i64 - 1),
            phone: RandomPhoneNumber::new(884_434_366, 1),
            account_balance: BoundedRandomInt::new(
                962_338_209,
                1,
                ACCOUNT_BALANCE_MIN,
                ACCOUNT_BALANCE_MAX,
            ),
            comment: RandomText::new(1_341_315_363, COMMENT_AVERAGE_LENGTH, 1, ctx.text_pool()?)?,
        };
        for column in generator.columns_mut() {
            column.advance_rows(start);
        }

        tracing::debug!(
            "Supplier partition {}/{}: start {}, {} rows",
            partition.index(),
            partition.count(),
            generator.start,
            generator.row_count
        );
        Ok(generator)
    }

    fn columns_mut(&mut self) -> [&mut dyn RowRandom; 5] {
        [
            &mut self.address,
            &mut self.nation_key,
            &mut self.phone,
            &mut self.account_balance,
            &mut self.comment,
        ]
    }
}

impl RowGenerator for SupplierGenerator {
    type Row = Supplier;

    fn next_row(&mut self) -> Result<Option<Supplier>> {
        if self.emitted >= self.row_count {
            return Ok(None);
        }

        let key = (self.start + self.emitted + 1) as i64;
        let nation_key = self.nation_key.next_value()?;
        let supplier = Supplier {
            s_suppkey: key,
            s_name: format!("Supplier#{:09}", key),
            s_address: self.address.next_value()?,
            s_nationkey: nation_key,
            s_phone: self.phone.next_value(nation_key)?,
            s_acctbal: Decimal(self.account_balance.next_value()?),
            s_comment: self.comment.next_value()?,
        };

        for column in self.columns_mut() {
            column.finish_row();
        }
        self.emitted += 1;
        Ok(Some(supplier))
    }

    fn capacity(&self) -> u64 {
        self.row_count
    }
}
