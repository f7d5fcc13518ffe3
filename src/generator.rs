// src/generator.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Table generation across partitions
//!
//! `TableGenerator` builds one `PartitionGenerator` per configured partition
//! of every table. Each partition is independent: drive them one at a time,
//! hand them to different threads, or let `generate_table()` drain them on
//! a rayon pool.

use std::collections::BTreeMap;
use std::time::Instant;

use bytes::Bytes;
use rayon::prelude::*;

use crate::context::GenerationContext;
use crate::error::{GenError, Result};
use crate::tables::{
    CustomerGenerator, LineItemGenerator, NationGenerator, OrderGenerator, PartGenerator,
    PartSuppGenerator, Partition, RegionGenerator, RowFormat, RowGenerator, SupplierGenerator,
    Table, TpchRow,
};

/// Uniform row interface over every table
pub trait RowSource {
    /// The next serialized row, or `None` once the partition is exhausted
    fn next_serialized(&mut self) -> Result<Option<Bytes>>;

    /// Total number of rows the source yields
    fn capacity(&self) -> u64;
}

/// Configuration for generating a set of tables
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// 1.0 is the reference size (150 000 customers, 1.5 M orders, ...)
    pub scale_factor: f64,
    /// Partitions per table; tables not listed get one
    pub partitions: BTreeMap<Table, u32>,
    /// Row serialization
    pub format: RowFormat,
    /// Maximum number of threads to use (None = use all available cores)
    pub max_threads: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            partitions: BTreeMap::new(),
            format: RowFormat::Json,
            max_threads: None, // Use all available cores
        }
    }
}

impl GeneratorConfig {
    /// Same partition count for every table
    pub fn uniform(scale_factor: f64, partitions: u32) -> Self {
        Self {
            scale_factor,
            partitions: Table::ALL.iter().map(|&t| (t, partitions)).collect(),
            ..Self::default()
        }
    }

    pub fn partition_count(&self, table: Table) -> u32 {
        if table.is_fixed() {
            1
        } else {
            self.partitions.get(&table).copied().unwrap_or(1)
        }
    }
}

enum TableRows {
    Customer(CustomerGenerator),
    Orders(OrderGenerator),
    LineItem(LineItemGenerator),
    Part(PartGenerator),
    PartSupp(PartSuppGenerator),
    Supplier(SupplierGenerator),
    Nation(NationGenerator),
    Region(RegionGenerator),
}

macro_rules! with_rows {
    ($rows:expr, $generator:ident => $body:expr) => {
        match $rows {
            TableRows::Customer($generator) => $body,
            TableRows::Orders($generator) => $body,
            TableRows::LineItem($generator) => $body,
            TableRows::Part($generator) => $body,
            TableRows::PartSupp($generator) => $body,
            TableRows::Supplier($generator) => $body,
            TableRows::Nation($generator) => $body,
            TableRows::Region($generator) => $body,
        }
    };
}

fn serialize_next<G: RowGenerator>(generator: &mut G, format: RowFormat) -> Result<Option<Bytes>> {
    generator
        .next_row()?
        .map(|row| row.serialize_as(format))
        .transpose()
}

/// Rows of one partition of one table, serialized on the fly
pub struct PartitionGenerator {
    table: Table,
    partition: Partition,
    format: RowFormat,
    rows: TableRows,
}

impl PartitionGenerator {
    pub fn new(
        ctx: &GenerationContext,
        table: Table,
        partition: Partition,
        format: RowFormat,
    ) -> Result<Self> {
        let rows = match table {
            Table::Customer => TableRows::Customer(CustomerGenerator::new(ctx, partition)?),
            Table::Orders => TableRows::Orders(OrderGenerator::new(ctx, partition)?),
            Table::LineItem => TableRows::LineItem(LineItemGenerator::new(ctx, partition)?),
            Table::Part => TableRows::Part(PartGenerator::new(ctx, partition)?),
            Table::PartSupp => TableRows::PartSupp(PartSuppGenerator::new(ctx, partition)?),
            Table::Supplier => TableRows::Supplier(SupplierGenerator::new(ctx, partition)?),
            Table::Nation => TableRows::Nation(NationGenerator::new(ctx, partition)?),
            Table::Region => TableRows::Region(RegionGenerator::new(ctx, partition)?),
        };
        Ok(Self {
            table,
            partition,
            format,
            rows,
        })
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Serialize every remaining row
    pub fn drain(&mut self) -> Result<Vec<Bytes>> {
        let mut rows = Vec::with_capacity(self.capacity() as usize);
        while let Some(row) = self.next_serialized()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

impl RowSource for PartitionGenerator {
    fn next_serialized(&mut self) -> Result<Option<Bytes>> {
        let format = self.format;
        with_rows!(&mut self.rows, generator => serialize_next(generator, format))
    }

    fn capacity(&self) -> u64 {
        with_rows!(&self.rows, generator => generator.capacity())
    }
}

/// Every partition of every table for one configuration
pub struct TableGenerator {
    config: GeneratorConfig,
    partitions: BTreeMap<Table, Vec<PartitionGenerator>>,
    pool: rayon::ThreadPool,
}

impl TableGenerator {
    pub fn new(ctx: &GenerationContext, config: GeneratorConfig) -> Result<Self> {
        let started = Instant::now();
        for table in [Table::Nation, Table::Region] {
            if let Some(&count) = config.partitions.get(&table) {
                if count != 1 {
                    tracing::warn!(
                        "Table {} is fixed; ignoring {} partitions and generating 1",
                        table,
                        count
                    );
                }
            }
        }

        let mut partitions = BTreeMap::new();
        for table in Table::ALL {
            let count = config.partition_count(table);
            if count == 0 {
                return Err(GenError::InvalidPartition {
                    index: 1,
                    count,
                    reason: "partition count must be at least 1",
                });
            }
            let generators = (1..=count)
                .map(|index| {
                    let partition = Partition::new(config.scale_factor, index, count)?;
                    PartitionGenerator::new(ctx, table, partition, config.format)
                })
                .collect::<Result<Vec<_>>>()?;
            partitions.insert(table, generators);
        }

        let num_threads = config.max_threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| GenError::ThreadPool(e.to_string()))?;

        tracing::info!(
            "Table generator ready: scale factor {}, {} threads, built in {:.3} s",
            config.scale_factor,
            num_threads,
            started.elapsed().as_secs_f64()
        );
        Ok(Self {
            config,
            partitions,
            pool,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Partitions still held for `table`
    pub fn partition_count(&self, table: Table) -> usize {
        self.partitions.get(&table).map_or(0, Vec::len)
    }

    /// Generator of partition `index` (1-based) of `table`
    pub fn generator(&mut self, table: Table, index: u32) -> Result<&mut PartitionGenerator> {
        let generators = self.partitions.entry(table).or_default();
        let count = generators.len() as u32;
        index
            .checked_sub(1)
            .and_then(|i| generators.get_mut(i as usize))
            .ok_or(GenError::InvalidPartition {
                index,
                count,
                reason: "no such partition",
            })
    }

    /// Rows left across all partitions of `table`
    pub fn capacity(&self, table: Table) -> u64 {
        self.partitions
            .get(&table)
            .map_or(0, |gens| gens.iter().map(RowSource::capacity).sum())
    }

    /// Hand the partitions of `table` to the caller, e.g. to drive them on
    /// threads of its own
    pub fn take_partitions(&mut self, table: Table) -> Vec<PartitionGenerator> {
        self.partitions.remove(&table).unwrap_or_default()
    }

    /// Drain every partition of `table` in parallel, rows in partition order
    ///
    /// The partitions are consumed; a second call returns no rows.
    pub fn generate_table(&mut self, table: Table) -> Result<Vec<Bytes>> {
        let started = Instant::now();
        let mut generators = self.take_partitions(table);

        let per_partition = self.pool.install(|| {
            generators
                .par_iter_mut()
                .map(PartitionGenerator::drain)
                .collect::<Result<Vec<_>>>()
        })?;
        let rows: Vec<Bytes> = per_partition.into_iter().flatten().collect();

        tracing::info!(
            "Generated {} rows of {} from {} partitions in {:.3} s",
            rows.len(),
            table,
            generators.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(rows)
    }
}

/// Simple API: one table at `scale_factor` with the shared context and defaults
pub fn generate_table_simple(table: Table, scale_factor: f64) -> Result<Vec<Bytes>> {
    let ctx = GenerationContext::shared()?;
    let mut partitions = BTreeMap::new();
    partitions.insert(table, num_cpus::get() as u32);
    let config = GeneratorConfig {
        scale_factor,
        partitions,
        ..GeneratorConfig::default()
    };
    TableGenerator::new(ctx, config)?.generate_table(table)
}
