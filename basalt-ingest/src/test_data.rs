//! Synthetic test-data loader.
//!
//! Fills the configured test table with generated rows so a fresh process
//! has data to query. One block is produced per hardware thread; the spec's
//! time window `[start, start + 3600 * max_hr)` is split into contiguous
//! sub-windows, one per block, and every generated row's time falls inside
//! its block's window.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use basalt_execution::BatchBlock;
use basalt_memory::Batch;
use basalt_meta::{BlockSignature, ColumnProps, Table};
use basalt_result::Result;
use basalt_types::schema::Schema;
use basalt_types::value::{Value, ValueRow};
use rand::Rng;
use tracing::info;

use crate::IngestContext;
use crate::spec::IngestSpec;

/// Name the synthetic table is enrolled under.
pub const TEST_TABLE_NAME: &str = "basalt.test";

/// Rows generated per synthetic block (bounded by the block capacity knob).
pub const TEST_BLOCK_ROWS: usize = 10_000;

/// Final schema of the synthetic table, `_time_` included.
pub fn test_schema() -> Result<Schema> {
    Schema::parse("ROW<id:int, event:string, items:list<string>, flag:bool, _time_:bigint>")
}

pub(crate) fn load_test_blocks(spec: &IngestSpec, ctx: &IngestContext) -> Result<()> {
    let start = spec.table().time_spec.unix_time_value;
    let end = start + 3600 * spec.table().max_hr as i64;
    let parallelism = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let window = (end - start) / parallelism as i64;

    let schema = Arc::new(test_schema()?);
    let table = Arc::new(Table::new(
        TEST_TABLE_NAME,
        Arc::clone(&schema),
        ColumnProps::default(),
    ));
    ctx.tables.enroll(&table);

    let rows = ctx.options.block_max_rows.min(TEST_BLOCK_ROWS).max(1);
    let mut rng = rand::rng();
    let mut blocks = Vec::with_capacity(parallelism);
    for seq in 0..parallelism as u64 {
        let begin = start + seq as i64 * window;
        let mut batch = Batch::new(Arc::clone(&table), rows)?;
        for id in 0..rows {
            batch.add(&synthetic_row(&mut rng, id as i32, begin, begin + window))?;
        }
        blocks.push(BatchBlock::new(
            BlockSignature::new(TEST_TABLE_NAME, seq, begin, begin + window, spec.id()),
            batch,
        ));
    }

    info!(spec = %spec.id(), blocks = blocks.len(), rows_per_block = rows, "loaded synthetic blocks");
    ctx.blocks.add(blocks);
    Ok(())
}

fn synthetic_row(rng: &mut impl Rng, id: i32, begin: i64, end: i64) -> ValueRow {
    const EVENTS: [&str; 5] = ["view", "click", "scroll", "purchase", "share"];
    let time = if end > begin {
        rng.random_range(begin..end)
    } else {
        begin
    };
    let items: Vec<Value> = (0..rng.random_range(0..4usize))
        .map(|_| {
            if rng.random_ratio(1, 5) {
                Value::Null
            } else {
                Value::from(EVENTS[rng.random_range(0..EVENTS.len())])
            }
        })
        .collect();
    ValueRow::new()
        .set("id", id)
        .set("event", EVENTS[rng.random_range(0..EVENTS.len())])
        .set("items", Value::List(items))
        .set("flag", rng.random::<bool>())
        .set("_time_", time)
}
