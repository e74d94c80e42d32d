//! Ingest spec: one unit of ingestion work and its executor.

use std::fs;
use std::sync::Arc;

use basalt_execution::BatchBlock;
use basalt_meta::TableSpec;
use basalt_result::{Error, Result};
use tracing::warn;

use crate::IngestContext;
use crate::pipeline::ingest_file;
use crate::test_data;

const LOADER_SWAP: &str = "Swap";
const LOADER_ROLL: &str = "Roll";

/// Lifecycle of a spec: forward only, one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecState {
    New,
    Processing,
    Ready,
    Failed,
}

/// A single unit of ingestion work: one file or logical partition of one
/// table.
///
/// A spec's identity is `"{table}@{path}@{size}"`, content-addressed so
/// that retries and re-announcements of the same file collapse to the same
/// work unit.
pub struct IngestSpec {
    table: Arc<TableSpec>,
    version: String,
    path: String,
    domain: String,
    size: u64,
    state: SpecState,
    mdate: i64,
    id: String,
}

impl IngestSpec {
    pub fn new(
        table: Arc<TableSpec>,
        version: impl Into<String>,
        path: impl Into<String>,
        domain: impl Into<String>,
        size: u64,
        mdate: i64,
    ) -> Self {
        let path = path.into();
        let id = format!("{}@{}@{}", table.name, path, size);
        Self {
            table,
            version: version.into(),
            path,
            domain: domain.into(),
            size,
            state: SpecState::New,
            mdate,
            id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn table(&self) -> &TableSpec {
        &self.table
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn state(&self) -> SpecState {
        self.state
    }

    pub fn mdate(&self) -> i64 {
        self.mdate
    }

    /// Execute this spec to completion.
    ///
    /// Never panics or escapes an error: either every produced block is
    /// installed and `true` comes back, or the block manager is untouched
    /// and the result is `false`. The spec moves to `Ready` or `Failed`
    /// accordingly.
    pub fn work(&mut self, ctx: &IngestContext) -> bool {
        self.state = SpecState::Processing;
        match self.execute(ctx) {
            Ok(()) => {
                self.state = SpecState::Ready;
                true
            }
            Err(err) => {
                warn!(spec = %self.id, error = %err, "ingestion spec failed");
                self.state = SpecState::Failed;
                false
            }
        }
    }

    fn execute(&self, ctx: &IngestContext) -> Result<()> {
        let loader = self.table.loader.as_str();
        if loader == ctx.options.test_loader {
            return test_data::load_test_blocks(self, ctx);
        }
        match loader {
            LOADER_SWAP => self.load_swap(ctx),
            LOADER_ROLL => self.load_roll(ctx),
            other => Err(Error::InvalidArgumentError(format!(
                "unknown loader: '{other}'"
            ))),
        }
    }

    /// Replace all blocks sharing this spec with the freshly produced ones.
    fn load_swap(&self, ctx: &IngestContext) -> Result<()> {
        let blocks = self.load(ctx)?;
        ctx.blocks.swap(blocks);
        Ok(())
    }

    /// Install the freshly produced blocks alongside existing ones.
    fn load_roll(&self, ctx: &IngestContext) -> Result<()> {
        let blocks = self.load(ctx)?;
        ctx.blocks.add(blocks);
        Ok(())
    }

    /// Fetch the backing file and run the ingest pipeline over it.
    fn load(&self, ctx: &IngestContext) -> Result<Vec<BatchBlock>> {
        if !self.table.source.is_file_system() {
            return Err(Error::InvalidArgumentError(format!(
                "loader '{}' needs a file-backed source, got {:?}",
                self.table.loader, self.table.source
            )));
        }
        let store = (ctx.stores)(self.table.source, &self.domain)?;
        let staged = store.copy(&self.path)?;
        let outcome = ingest_file(self, &staged, ctx);
        // staged copy is scoped to this work unit; removal failures are ignored
        let _ = fs::remove_file(&staged);
        outcome
    }
}
