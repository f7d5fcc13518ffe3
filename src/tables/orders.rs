// src/tables/orders.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orders, and the per-order sequences line items share with them
//!
//! An order's total price and status are computed from its lines, so the
//! order generator draws every line's quantity, discount, tax, part and ship
//! date itself. The line item generator replays the same sequences, which
//! keeps a standalone `lineitem` table consistent with `orders`.

use serde::Serialize;

use super::part::part_price;
use super::{Decimal, Partition, RowGenerator, TpchRow};
use crate::columns::{BoundedRandomInt, BoundedRandomLong, RandomString, RandomText};
use crate::constants::{
    BASE_DATE, CUSTOMER_SCALE_BASE, DATE_RANGE, LONG_KEY_SCALE_FACTOR, ORDER_SCALE_BASE,
    PART_SCALE_BASE,
};
use crate::context::GenerationContext;
use crate::dates::{date_to_string, is_past, make_order_key};
use crate::error::Result;
use crate::random::RowRandom;

pub(crate) const LINE_COUNT_MIN: i64 = 1;
pub(crate) const LINE_COUNT_MAX: i64 = 7;
/// Per-order budget of every line level sequence
pub(crate) const LINES_PER_ORDER_MAX: u64 = LINE_COUNT_MAX as u64;

const QUANTITY_MIN: i64 = 1;
const QUANTITY_MAX: i64 = 50;
const DISCOUNT_MIN: i64 = 0;
const DISCOUNT_MAX: i64 = 10;
const TAX_MIN: i64 = 0;
const TAX_MAX: i64 = 8;
pub(crate) const SHIP_DATE_MIN: i64 = 1;
pub(crate) const SHIP_DATE_MAX: i64 = 121;
pub(crate) const RECEIPT_DATE_MAX: i64 = 30;

const ORDER_DATE_MIN: i64 = BASE_DATE;
/// Leaves room for the latest ship and receipt dates inside the calendar
const ORDER_DATE_MAX: i64 = BASE_DATE + DATE_RANGE - SHIP_DATE_MAX - RECEIPT_DATE_MAX - 1;

/// No customer key divisible by this ever places an order
const CUSTOMER_MORTALITY: i64 = 3;
const CLERK_SCALE_BASE: f64 = 1_000.0;
const COMMENT_AVERAGE_LENGTH: f64 = 49.0;

pub(crate) fn order_date_random() -> BoundedRandomInt {
    BoundedRandomInt::new(1_066_728_069, 1, ORDER_DATE_MIN, ORDER_DATE_MAX)
}

pub(crate) fn line_count_random() -> BoundedRandomInt {
    BoundedRandomInt::new(1_434_868_289, 1, LINE_COUNT_MIN, LINE_COUNT_MAX)
}

/// Values of one line that both orders and line items need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineDraw {
    pub quantity: i64,
    pub discount: i64,
    pub tax: i64,
    pub part_key: i64,
    /// Encoded date, already offset from the order date
    pub ship_date: i64,
}

impl LineDraw {
    pub fn extended_price(&self) -> i64 {
        part_price(self.part_key) * self.quantity
    }

    /// Extended price after discount and tax, truncated at each step
    pub fn charge(&self) -> i64 {
        let discounted = self.extended_price() * (100 - self.discount);
        (discounted / 100 * (100 + self.tax)) / 100
    }
}

/// The line level sequences, each with a budget of one order's lines
#[derive(Debug, Clone)]
pub(crate) struct OrderLines {
    quantity: BoundedRandomInt,
    discount: BoundedRandomInt,
    tax: BoundedRandomInt,
    part_key: BoundedRandomLong,
    ship_date: BoundedRandomInt,
}

impl OrderLines {
    pub fn new(scale_factor: f64) -> Self {
        let max_part_key = ((PART_SCALE_BASE as f64 * scale_factor) as i64).max(1);
        Self {
            quantity: BoundedRandomInt::new(
                209_208_115,
                LINES_PER_ORDER_MAX,
                QUANTITY_MIN,
                QUANTITY_MAX,
            ),
            discount: BoundedRandomInt::new(
                554_590_007,
                LINES_PER_ORDER_MAX,
                DISCOUNT_MIN,
                DISCOUNT_MAX,
            ),
            tax: BoundedRandomInt::new(721_958_466, LINES_PER_ORDER_MAX, TAX_MIN, TAX_MAX),
            part_key: BoundedRandomLong::new(
                scale_factor >= LONG_KEY_SCALE_FACTOR,
                1_808_217_256,
                LINES_PER_ORDER_MAX,
                1,
                max_part_key,
            ),
            ship_date: BoundedRandomInt::new(
                1_769_349_045,
                LINES_PER_ORDER_MAX,
                SHIP_DATE_MIN,
                SHIP_DATE_MAX,
            ),
        }
    }

    pub fn next_line(&mut self, order_date: i64) -> Result<LineDraw> {
        Ok(LineDraw {
            quantity: self.quantity.next_value()?,
            discount: self.discount.next_value()?,
            tax: self.tax.next_value()?,
            part_key: self.part_key.next_value()?,
            ship_date: order_date + self.ship_date.next_value()?,
        })
    }

    pub fn columns_mut(&mut self) -> [&mut dyn RowRandom; 5] {
        [
            &mut self.quantity,
            &mut self.discount,
            &mut self.tax,
            &mut self.part_key,
            &mut self.ship_date,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub o_orderkey: i64,
    pub o_custkey: i64,
    pub o_orderstatus: String,
    pub o_totalprice: Decimal,
    pub o_orderdate: String,
    pub o_orderpriority: String,
    pub o_clerk: String,
    pub o_shippriority: i64,
    pub o_comment: String,
}

impl TpchRow for Order {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.o_orderkey,
            self.o_custkey,
            self.o_orderstatus,
            self.o_totalprice,
            self.o_orderdate,
            self.o_orderpriority,
            self.o_clerk,
            self.o_shippriority,
            self.o_comment,
        )
    }
}

pub struct OrderGenerator {
    start: u64,
    row_count: u64,
    emitted: u64,
    max_customer_key: i64,
    order_date: BoundedRandomInt,
    line_count: BoundedRandomInt,
    customer_key: BoundedRandomLong,
    priority: RandomString,
    clerk: BoundedRandomInt,
    comment: RandomText,
    lines: OrderLines,
}

impl OrderGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        let scale_factor = partition.scale_factor();
        let start = partition.start_row(ORDER_SCALE_BASE);
        let max_customer_key = ((CUSTOMER_SCALE_BASE as f64 * scale_factor) as i64).max(1);
        let clerks = (scale_factor * CLERK_SCALE_BASE).max(CLERK_SCALE_BASE) as i64;

        let mut generator = Self {
            start,
            row_count: partition.row_count(ORDER_SCALE_BASE),
            emitted: 0,
            max_customer_key,
            order_date: order_date_random(),
            line_count: line_count_random(),
            customer_key: BoundedRandomLong::new(
                scale_factor >= LONG_KEY_SCALE_FACTOR,
                851_767_375,
                1,
                1,
                max_customer_key,
            ),
            priority: RandomString::new(591_449_447, ctx.distribution("o_oprio")?, 1),
            clerk: BoundedRandomInt::new(1_171_034_773, 1, 1, clerks),
            comment: RandomText::new(276_090_261, COMMENT_AVERAGE_LENGTH, 1, ctx.text_pool()?)?,
            lines: OrderLines::new(scale_factor),
        };
        for column in generator.columns_mut() {
            column.advance_rows(start);
        }

        tracing::debug!(
            "Orders partition {}/{}: start {}, {} rows",
            partition.index(),
            partition.count(),
            generator.start,
            generator.row_count
        );
        Ok(generator)
    }

    fn columns_mut(&mut self) -> [&mut dyn RowRandom; 11] {
        let [quantity, discount, tax, part_key, ship_date] = self.lines.columns_mut();
        [
            &mut self.order_date,
            &mut self.line_count,
            &mut self.customer_key,
            &mut self.priority,
            &mut self.clerk,
            &mut self.comment,
            quantity,
            discount,
            tax,
            part_key,
            ship_date,
        ]
    }

    /// Keys divisible by the mortality factor are nudged to a neighbour,
    /// alternating direction and never past the largest key
    fn living_customer(&self, mut key: i64) -> i64 {
        let mut delta = 1;
        while key % CUSTOMER_MORTALITY == 0 {
            key = (key + delta).min(self.max_customer_key);
            delta = -delta;
        }
        key
    }
}

impl RowGenerator for OrderGenerator {
    type Row = Order;

    fn next_row(&mut self) -> Result<Option<Order>> {
        if self.emitted >= self.row_count {
            return Ok(None);
        }

        let index = (self.start + self.emitted + 1) as i64;
        let order_date = self.order_date.next_value()?;
        let raw_customer_key = self.customer_key.next_value()?;
        let customer_key = self.living_customer(raw_customer_key);

        let line_count = self.line_count.next_value()?;
        let mut total_price = 0;
        let mut shipped = 0;
        for _ in 0..line_count {
            let line = self.lines.next_line(order_date)?;
            total_price += line.charge();
            if is_past(line.ship_date) {
                shipped += 1;
            }
        }
        let status = if shipped == line_count {
            "F"
        } else if shipped > 0 {
            "P"
        } else {
            "O"
        };

        let order = Order {
            o_orderkey: make_order_key(index),
            o_custkey: customer_key,
            o_orderstatus: status.to_string(),
            o_totalprice: Decimal(total_price),
            o_orderdate: date_to_string(order_date)?.to_string(),
            o_orderpriority: self.priority.next_value()?,
            o_clerk: format!("Clerk#{:09}", self.clerk.next_value()?),
            o_shippriority: 0,
            o_comment: self.comment.next_value()?,
        };

        for column in self.columns_mut() {
            column.finish_row();
        }
        self.emitted += 1;
        Ok(Some(order))
    }

    fn capacity(&self) -> u64 {
        self.row_count
    }
}
