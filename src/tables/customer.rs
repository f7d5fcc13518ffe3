// src/tables/customer.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use super::{Decimal, Partition, RowGenerator, TpchRow};
use crate::columns::{
    BoundedRandomInt, RandomAlphaNumeric, RandomPhoneNumber, RandomString, RandomText,
};
use crate::constants::CUSTOMER_SCALE_BASE;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::random::RowRandom;

const ACCOUNT_BALANCE_MIN: i64 = -99_999;
const ACCOUNT_BALANCE_MAX: i64 = 999_999;
const ADDRESS_AVERAGE_LENGTH: usize = 25;
const COMMENT_AVERAGE_LENGTH: f64 = 73.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub c_custkey: i64,
    pub c_name: String,
    pub c_address: String,
    pub c_nationkey: i64,
    pub c_phone: String,
    pub c_acctbal: Decimal,
    pub c_mktsegment: String,
    pub c_comment: String,
}

impl TpchRow for Customer {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.c_custkey,
            self.c_name,
            self.c_address,
            self.c_nationkey,
            self.c_phone,
            self.c_acctbal,
            self.c_mktsegment,
            self.c_comment,
        )
    }
}

pub struct CustomerGenerator {
    start: u64,
    row_count: u64,
    emitted: u64,
    address: RandomAlphaNumeric,
    nation_key: BoundedRandomInt,
    phone: RandomPhoneNumber,
    account_balance: BoundedRandomInt,
    market_segment: RandomString,
    comment: RandomText,
}

impl CustomerGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        let nations = ctx.distribution("nations")?;
        let start = partition.start_row(CUSTOMER_SCALE_BASE);
        let mut generator = Self {
            start,
            row_count: partition.row_count(CUSTOMER_SCALE_BASE),
            emitted: 0,
            address: RandomAlphaNumeric::new(881_155_353, ADDRESS_AVERAGE_LENGTH, 1),
            nation_key: BoundedRandomInt::new(1_489_529_863, 1, 0, nations.size() as i64 - 1),
            phone: RandomPhoneNumber::new(1_521_138_112, 1),
            account_balance: BoundedRandomInt::new(
                298_370_230,
                1,
                ACCOUNT_BALANCE_MIN,
                ACCOUNT_BALANCE_MAX,
            ),
            market_segment: RandomString::new(1_140_279_430, ctx.distribution("msegmnt")?, 1),
            comment: RandomText::new(1_335_826_707, COMMENT_AVERAGE_LENGTH, 1, ctx.text_pool()?)?,
        };
        for column in generator.columns_mut() {
            column.advance_rows(start);
        }

        tracing::debug!(
            "Customer partition {}/{}: start {}, {} rows",
            partition.index(),
            partition.count(),
            generator.start,
            generator.row_count
        );
        Ok(generator)
    }

    fn columns_mut(&mut self) -> [&mut dyn RowRandom; 6] {
        [
            &mut self.address,
            &mut self.nation_key,
            &mut self.phone,
            &mut self.account_balance,
            &mut self.market_segment,
            &mut self.comment,
        ]
    }
}

impl RowGenerator for CustomerGenerator {
    type Row = Customer;

    fn next_row(&mut self) -> Result<Option<Customer>> {
        if self.emitted >= self.row_count {
            return Ok(None);
        }

        let key = (self.start + self.emitted + 1) as i64;
        let nation_key = self.nation_key.next_value()?;
        let customer = Customer {
            c_custkey: key,
            c_name: format!("Customer#{:09}", key),
            c_address: self.address.next_value()?,
            c_nationkey: nation_key,
            c_phone: self.phone.next_value(nation_key)?,
            c_acctbal: Decimal(self.account_balance.next_value()?),
            c_mktsegment: self.market_segment.next_value()?,
            c_comment: self.comment.next_value()?,
        };

        for column in self.columns_mut() {
            column.finish_row();
        }
        self.emitted += 1;
        Ok(Some(customer))
    }

    fn capacity(&self) -> u64 {
        self.row_count
    }
}
