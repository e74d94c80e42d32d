//! File-to-blocks ingestion pipeline.
//!
//! Reads a staged local file row by row, overlays the derived `_time_`
//! column, segments rows into capacity-bounded batches, and emits one
//! signed block per batch, in fill order.

use std::path::Path;
use std::sync::Arc;

use basalt_execution::BatchBlock;
use basalt_memory::Batch;
use basalt_meta::BlockSignature;
use basalt_result::{Error, Result};
use basalt_types::TIME_COLUMN;
use basalt_types::row::RowRead;
use basalt_types::schema::Schema;
use tracing::{debug, info};

use crate::IngestContext;
use crate::adapter::TimeRow;
use crate::source::BatchSource;
use crate::spec::IngestSpec;
use crate::time::build_time_fn;

const FORMAT_CSV: &str = "csv";
const FORMAT_PARQUET: &str = "parquet";
const CSV_DELIMITER: u8 = b'\t';

pub(crate) fn ingest_file(
    spec: &IngestSpec,
    file: &Path,
    ctx: &IngestContext,
) -> Result<Vec<BatchBlock>> {
    let table_spec = spec.table();

    // the reader sees the original schema; batches carry the final one,
    // with the source time column (if any) swapped for `_time_`
    let original = Schema::parse(&table_spec.schema)?;
    let time_fn = build_time_fn(&table_spec.time_spec, spec.mdate())?;
    let table = Arc::new(table_spec.to_table()?);
    ctx.tables.enroll(&table);

    info!(table = %table.name(), file = %file.display(), "ingesting file");
    let mut source = match table_spec.format.as_str() {
        FORMAT_CSV => BatchSource::csv(file, CSV_DELIMITER, &original)?,
        FORMAT_PARQUET => BatchSource::parquet(file, &original)?,
        other => {
            return Err(Error::InvalidArgumentError(format!(
                "unsupported file format: '{other}'"
            )));
        }
    };

    let capacity = ctx.options.block_max_rows;
    let mut blocks = Vec::new();
    let mut batch = Batch::new(Arc::clone(&table), capacity)?;
    let mut seq = 0u64;
    let mut range = (i64::MAX, i64::MIN);

    while let Some(row) = source.next_row()? {
        if batch.rows() >= capacity {
            let full = std::mem::replace(&mut batch, Batch::new(Arc::clone(&table), capacity)?);
            blocks.push(BatchBlock::new(
                BlockSignature::new(table.name(), seq, range.0, range.1, spec.id()),
                full,
            ));
            seq += 1;
            range = (i64::MAX, i64::MIN);
        }

        let timed = TimeRow::bind(&time_fn, &row);
        let time = timed.read_long(TIME_COLUMN)?;
        range.0 = range.0.min(time);
        range.1 = range.1.max(time);
        batch.add(&timed)?;
    }

    if batch.rows() > 0 {
        blocks.push(BatchBlock::new(
            BlockSignature::new(table.name(), seq, range.0, range.1, spec.id()),
            batch,
        ));
    }

    debug!(table = %table.name(), blocks = blocks.len(), "file segmented");
    Ok(blocks)
}
