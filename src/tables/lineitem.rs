// src/tables/lineitem.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line items, partitioned by order
//!
//! A row of every sequence here is an order, not a line: all of them are
//! finished together after an order's last line. The order date and line
//! count are drawn lazily when the first line of an order is produced.

use serde::Serialize;

use super::orders::{
    line_count_random, order_date_random, OrderLines, LINES_PER_ORDER_MAX, RECEIPT_DATE_MAX,
};
use super::partsupp::{select_part_supplier, SUPPLIERS_PER_PART};
use super::{Decimal, Partition, RowGenerator, TpchRow};
use crate::columns::{BoundedRandomInt, RandomString, RandomText};
use crate::constants::ORDER_SCALE_BASE;
use crate::context::GenerationContext;
use crate::dates::{date_to_string, is_past, make_order_key};
use crate::error::{GenError, Result};
use crate::random::RowRandom;

const COMMIT_DATE_MIN: i64 = 30;
const COMMIT_DATE_MAX: i64 = 90;
const RECEIPT_DATE_MIN: i64 = 1;
const COMMENT_AVERAGE_LENGTH: f64 = 27.0;
const FIELD_COUNT: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub l_orderkey: i64,
    pub l_partkey: i64,
    pub l_suppkey: i64,
    pub l_linenumber: i64,
    pub l_quantity: i64,
    pub l_extendedprice: Decimal,
    pub l_discount: Decimal,
    pub l_tax: Decimal,
    pub l_returnflag: String,
    pub l_linestatus: String,
    pub l_shipdate: String,
    pub l_commitdate: String,
    pub l_receiptdate: String,
    pub l_shipinstruct: String,
    pub l_shipmode: String,
    pub l_comment: String,
}

impl LineItem {
    /// Parse one pipe-delimited `.tbl` row; the trailing `|` is optional
    pub fn from_tbl_line(line: &str) -> Result<Self> {
        let line = line.trim();
        let line = line.strip_suffix('|').unwrap_or(line);
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != FIELD_COUNT {
            return Err(GenError::RowFormat(format!(
                "expected {} lineitem fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        Ok(Self {
            l_orderkey: parse_integer("l_orderkey", fields[0])?,
            l_partkey: parse_integer("l_partkey", fields[1])?,
            l_suppkey: parse_integer("l_suppkey", fields[2])?,
            l_linenumber: parse_integer("l_linenumber", fields[3])?,
            l_quantity: parse_quantity(fields[4])?,
            l_extendedprice: parse_decimal("l_extendedprice", fields[5])?,
            l_discount: parse_decimal("l_discount", fields[6])?,
            l_tax: parse_decimal("l_tax", fields[7])?,
            l_returnflag: fields[8].to_string(),
            l_linestatus: fields[9].to_string(),
            l_shipdate: fields[10].to_string(),
            l_commitdate: fields[11].to_string(),
            l_receiptdate: fields[12].to_string(),
            l_shipinstruct: fields[13].to_string(),
            l_shipmode: fields[14].to_string(),
            l_comment: fields[15].to_string(),
        })
    }

    /// Parse every non-empty line of a `.tbl` file body
    pub fn from_tbl(source: &str) -> Result<Vec<Self>> {
        let items = source
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Self::from_tbl_line)
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Parsed {} line items", items.len());
        Ok(items)
    }
}

fn parse_integer(field: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|e| GenError::RowFormat(format!("invalid {} '{}': {}", field, value, e)))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    value
        .trim()
        .parse()
        .map_err(|e| GenError::RowFormat(format!("invalid {}: {}", field, e)))
}

/// Quantities are whole numbers but some writers append `.00`
fn parse_quantity(value: &str) -> Result<i64> {
    match parse_decimal("l_quantity", value)? {
        Decimal(hundredths) if hundredths % 100 == 0 => Ok(hundredths / 100),
        _ => Err(GenError::RowFormat(format!(
            "invalid l_quantity '{}': not a whole number",
            value
        ))),
    }
}

impl TpchRow for LineItem {
    fn write_tbl(&self, out: &mut String) -> std::fmt::Result {
        write_tbl_fields!(
            out,
            self.l_orderkey,
            self.l_partkey,
            self.l_suppkey,
            self.l_linenumber,
            self.l_quantity,
            self.l_extendedprice,
            self.l_discount,
            self.l_tax,
            self.l_returnflag,
            self.l_linestatus,
            self.l_shipdate,
            self.l_commitdate,
            self.l_receiptdate,
            self.l_shipinstruct,
            self.l_shipmode,
            self.l_comment,
        )
    }
}

/// Order level values of the order being expanded
#[derive(Debug, Clone, Copy)]
struct CurrentOrder {
    date: i64,
    line_count: i64,
}

pub struct LineItemGenerator {
    scale_factor: f64,
    start: u64,
    order_count: u64,
    orders_done: u64,
    line_total: u64,
    current: Option<CurrentOrder>,
    line_number: i64,
    order_date: BoundedRandomInt,
    line_count: BoundedRandomInt,
    lines: OrderLines,
    supplier_number: BoundedRandomInt,
    commit_date: BoundedRandomInt,
    receipt_date: BoundedRandomInt,
    return_flag: RandomString,
    ship_instruction: RandomString,
    ship_mode: RandomString,
    comment: RandomText,
}

impl LineItemGenerator {
    pub fn new(ctx: &GenerationContext, partition: Partition) -> Result<Self> {
        let scale_factor = partition.scale_factor();
        let start = partition.start_row(ORDER_SCALE_BASE);
        let mut generator = Self {
            scale_factor,
            start,
            order_count: partition.row_count(ORDER_SCALE_BASE),
            orders_done: 0,
            line_total: 0,
            current: None,
            line_number: 0,
            order_date: order_date_random(),
            line_count: line_count_random(),
            lines: OrderLines::new(scale_factor),
            supplier_number: BoundedRandomInt::new(
                2_095_021_727,
                LINES_PER_ORDER_MAX,
                0,
                SUPPLIERS_PER_PART as i64 - 1,
            ),
            commit_date: BoundedRandomInt::new(
                904_914_315,
                LINES_PER_ORDER_MAX,
                COMMIT_DATE_MIN,
                COMMIT_DATE_MAX,
            ),
            receipt_date: BoundedRandomInt::new(
                373_135_028,
                LINES_PER_ORDER_MAX,
                RECEIPT_DATE_MIN,
                RECEIPT_DATE_MAX,
            ),
            return_flag: RandomString::new(
                717_419_739,
                ctx.distribution("rflag")?,
                LINES_PER_ORDER_MAX,
            ),
            ship_instruction: RandomString::new(
                1_371_272_478,
                ctx.distribution("instruct")?,
                LINES_PER_ORDER_MAX,
            ),
            ship_mode: RandomString::new(
                675_466_456,
                ctx.distribution("smode")?,
                LINES_PER_ORDER_MAX,
            ),
            comment: RandomText::new(
                1_095_462_486,
                COMMENT_AVERAGE_LENGTH,
                LINES_PER_ORDER_MAX,
                ctx.text_pool()?,
            )?,
        };
        for column in generator.columns_mut() {
            column.advance_rows(start);
        }
        generator.line_total = generator.count_lines()?;

        tracing::debug!(
            "LineItem partition {}/{}: start order {}, {} orders, {} lines",
            partition.index(),
            partition.count(),
            generator.start,
            generator.order_count,
            generator.line_total
        );
        Ok(generator)
    }

    /// Replay the line counts of this partition's orders on a copy
    ///
    /// One extra draw per order of the partition, paid once at construction
    /// so `capacity()` is exact.
    fn count_lines(&self) -> Result<u64> {
        let mut line_count = self.line_count.clone();
        let mut total = 0;
        for _ in 0..self.order_count {
            total += line_count.next_value()? as u64;
            line_count.finish_row();
        }
        Ok(total)
    }

    fn columns_mut(&mut self) -> [&mut dyn RowRandom; 14] {
        let [quantity, discount, tax, part_key, ship_date] = self.lines.columns_mut();
        [
            &mut self.order_date,
            &mut self.line_count,
            quantity,
            discount,
            tax,
            part_key,
            ship_date,
            &mut self.supplier_number,
            &mut self.commit_date,
            &mut self.receipt_date,
            &mut self.return_flag,
            &mut self.ship_instruction,
            &mut self.ship_mode,
            &mut self.comment,
        ]
    }

    fn current_order(&mut self) -> Result<CurrentOrder> {
        if let Some(order) = self.current {
            return Ok(order);
        }
        let order = CurrentOrder {
            date: self.order_date.next_value()?,
            line_count: self.line_count.next_value()?,
        };
        self.current = Some(order);
        Ok(order)
    }
}

impl RowGenerator for LineItemGenerator {
    type Row = LineItem;

    fn next_row(&mut self) -> Result<Option<LineItem>> {
        if self.orders_done >= self.order_count {
            return Ok(None);
        }

        let order = self.current_order()?;
        let order_key = make_order_key((self.start + self.orders_done + 1) as i64);
        let line = self.lines.next_line(order.date)?;
        let supplier_number = self.supplier_number.next_value()?;
        let commit_date = order.date + self.commit_date.next_value()?;
        let receipt_date = line.ship_date + self.receipt_date.next_value()?;

        let return_flag = if is_past(receipt_date) {
            self.return_flag.next_value()?
        } else {
            "N".to_string()
        };
        let line_status = if is_past(line.ship_date) { "F" } else { "O" };

        self.line_number += 1;
        let item = LineItem {
            l_orderkey: order_key,
            l_partkey: line.part_key,
            l_suppkey: select_part_supplier(line.part_key, supplier_number, self.scale_factor),
            l_linenumber: self.line_number,
            l_quantity: line.quantity,
            l_extendedprice: Decimal(line.extended_price()),
            l_discount: Decimal(line.discount),
            l_tax: Decimal(line.tax),
            l_returnflag: return_flag,
            l_linestatus: line_status.to_string(),
            l_shipdate: date_to_string(line.ship_date)?.to_string(),
            l_commitdate: date_to_string(commit_date)?.to_string(),
            l_receiptdate: date_to_string(receipt_date)?.to_string(),
            l_shipinstruct: self.ship_instruction.next_value()?,
            l_shipmode: self.ship_mode.next_value()?,
            l_comment: self.comment.next_value()?,
        };

        if self.line_number >= order.line_count {
            for column in self.columns_mut() {
                column.finish_row();
            }
            self.orders_done += 1;
            self.line_number = 0;
            self.current = None;
        }
        Ok(Some(item))
    }

    fn capacity(&self) -> u64 {
        self.line_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_context;
    use crate::tables::orders::OrderGenerator;
    use crate::tables::test_support::collect_rows;
    use std::collections::BTreeMap;

    #[test]
    fn test_first_line_of_first_order() {
        let ctx = test_context();
        let mut lines = LineItemGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap();
        let mut orders = OrderGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap();

        let line = lines.next_row().unwrap().unwrap();
        let order = orders.next_row().unwrap().unwrap();
        assert_eq!(line.l_linenumber, 1);
        assert_eq!(line.l_orderkey, 1);
        assert!(line.l_shipdate >= order.o_orderdate);
        assert!(line.l_receiptdate > line.l_shipdate);
        assert!(line.l_commitdate > order.o_orderdate);
    }

    #[test]
    fn test_lines_agree_with_orders() {
        let ctx = test_context();
        let lines = LineItemGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap();
        let capacity = lines.capacity();
        let items = collect_rows(lines);
        assert_eq!(items.len() as u64, capacity);

        let mut per_order: BTreeMap<i64, Vec<&LineItem>> = BTreeMap::new();
        for item in &items {
            per_order.entry(item.l_orderkey).or_default().push(item);
        }

        let orders =
            collect_rows(OrderGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap());
        assert_eq!(per_order.len(), orders.len());
        for order in &orders {
            let lines = &per_order[&order.o_orderkey];
            assert!((1..=7).contains(&lines.len()));
            let numbers: Vec<i64> = lines.iter().map(|l| l.l_linenumber).collect();
            assert_eq!(numbers, (1..=lines.len() as i64).collect::<Vec<_>>());

            let total: i64 = lines
                .iter()
                .map(|l| {
                    let discounted = l.l_extendedprice.0 * (100 - l.l_discount.0);
                    (discounted / 100 * (100 + l.l_tax.0)) / 100
                })
                .sum();
            assert_eq!(Decimal(total), order.o_totalprice);

            let shipped = lines.iter().filter(|l| l.l_linestatus == "F").count();
            let expected = if shipped == lines.len() {
                "F"
            } else if shipped > 0 {
                "P"
            } else {
                "O"
            };
            assert_eq!(order.o_orderstatus, expected);
        }
    }

    #[test]
    fn test_line_values() {
        let ctx = test_context();
        let items =
            collect_rows(LineItemGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap());
        for item in &items {
            assert!((1..=50).contains(&item.l_quantity));
            assert!((0..=10).contains(&item.l_discount.0));
            assert!((0..=8).contains(&item.l_tax.0));
            assert!((1..=200).contains(&item.l_partkey));
            assert!((1..=10).contains(&item.l_suppkey));
            assert_eq!(
                item.l_extendedprice.0,
                crate::tables::part_price(item.l_partkey) * item.l_quantity
            );
            if item.l_returnflag == "N" {
                assert!(item.l_receiptdate.as_str() > "1995-06-17");
            } else {
                assert!(["R", "A"].contains(&item.l_returnflag.as_str()));
            }
            let past = item.l_shipdate.as_str() <= "1995-06-17";
            assert_eq!(item.l_linestatus, if past { "F" } else { "O" });
        }
    }

    #[test]
    fn test_lineitem_partitions_match_single_pass() {
        let ctx = test_context();
        let single = LineItemGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap();
        let capacity = single.capacity();
        let all = collect_rows(single);
        for count in [2, 3, 4, 7] {
            let mut parts = Vec::new();
            let mut capacities = 0;
            for index in 1..=count {
                let partition = Partition::new(0.001, index, count).unwrap();
                let generator = LineItemGenerator::new(ctx, partition).unwrap();
                capacities += generator.capacity();
                parts.extend(collect_rows(generator));
            }
            assert_eq!(capacities, capacity);
            assert_eq!(all, parts, "{} partitions", count);
        }
    }

    #[test]
    fn test_tbl_line_parses_back() {
        let ctx = test_context();
        let mut generator =
            LineItemGenerator::new(ctx, Partition::single(0.001).unwrap()).unwrap();
        for _ in 0..20 {
            let item = generator.next_row().unwrap().unwrap();
            assert_eq!(LineItem::from_tbl_line(&item.to_tbl()).unwrap(), item);
        }
    }

    #[test]
    fn test_parse_dbgen_line() {
        let line = "1|155190|7706|1|17|21168.23|0.04|0.02|N|O|1996-03-13|1996-02-12|1996-03-22|DELIVER IN PERSON|TRUCK|egular courts above the|";
        let item = LineItem::from_tbl_line(line).unwrap();
        assert_eq!(item.l_partkey, 155_190);
        assert_eq!(item.l_quantity, 17);
        assert_eq!(item.l_extendedprice, Decimal(2_116_823));
        assert_eq!(item.l_discount, Decimal(4));
        assert_eq!(item.l_shipmode, "TRUCK");

        let items = LineItem::from_tbl(&format!("{}\n\n{}\n", line, line)).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_malformed_tbl_lines() {
        let good = "1|155190|7706|1|17|21168.23|0.04|0.02|N|O|1996-03-13|1996-02-12|1996-03-22|DELIVER IN PERSON|TRUCK|comment|";
        let cases = vec![
            "1|2|3".to_string(),
            good.replacen("155190", "abc", 1),
            good.replacen("21168.23", "21168.2.3", 1),
            good.replacen("|17|", "|17.5|", 1),
            format!("{}extra|", good),
        ];
        for line in &cases {
            assert!(
                matches!(LineItem::from_tbl_line(line), Err(GenError::RowFormat(_))),
                "accepted {:?}",
                line
            );
        }
    }
}
