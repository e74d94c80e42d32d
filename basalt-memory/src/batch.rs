//! Capacity-bounded batch of rows.

use std::sync::Arc;

use basalt_meta::Table;
use basalt_result::{Error, Result};
use basalt_types::row::RowRead;
use basalt_types::schema::Schema;

use crate::flat_buffer::{FlatBuffer, FlatRow};

/// A [`FlatBuffer`] with a row capacity; the unit of data inside a block.
///
/// A batch pins its table handle: as long as any installed block holds the
/// batch, the weak table registry can resolve the table by name.
///
/// Single-writer: one batch is filled by one ingestion loop, then frozen
/// inside a block and only read from there on.
pub struct Batch {
    table: Arc<Table>,
    data: FlatBuffer,
    capacity: usize,
}

impl Batch {
    pub fn new(table: Arc<Table>, capacity: usize) -> Result<Self> {
        let data = FlatBuffer::new(Arc::clone(table.schema()))?;
        Ok(Self {
            table,
            data,
            capacity,
        })
    }

    /// Append one row; fails when the batch is at capacity, leaving the
    /// underlying buffer untouched.
    pub fn add(&mut self, row: &dyn RowRead) -> Result<()> {
        if self.data.rows() >= self.capacity {
            return Err(Error::InvalidArgumentError(format!(
                "batch is full ({} rows)",
                self.capacity
            )));
        }
        self.data.add(row)
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn rows(&self) -> usize {
        self.data.rows()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.data.rows() >= self.capacity
    }

    pub fn row(&self, index: usize) -> Option<FlatRow<'_>> {
        self.data.row(index)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.data.schema()
    }

    /// Bytes held by the backing buffer.
    pub fn memory(&self) -> usize {
        self.data.memory()
    }
}
