//! Spec execution and file ingestion for the Basalt engine.
//!
//! The entry point is [`IngestSpec::work`]: it routes one unit of ingestion
//! work to a loader (swap, roll, or synthetic test data), fetches the
//! backing file through a [`store::DataStore`], streams its rows through the
//! time adapter, segments them into capacity-bounded batches, and installs
//! the resulting blocks in the shared block manager.
//!
//! All process-wide collaborators travel in an explicit [`IngestContext`],
//! so tests can run against isolated managers and registries.

pub mod adapter;
mod pipeline;
pub mod source;
pub mod spec;
pub mod store;
pub mod test_data;
pub mod time;

use std::sync::Arc;

use basalt_execution::BlockManager;
use basalt_meta::TableRegistry;

pub use adapter::TimeRow;
pub use source::BatchSource;
pub use spec::{IngestSpec, SpecState};
pub use store::{DataStore, FileInfo, LocalStore, StoreFactory, default_store_factory};

/// Process-scoped ingestion knobs.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Loader name that triggers synthetic data generation.
    pub test_loader: String,
    /// Batch capacity: max rows per block.
    pub block_max_rows: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            test_loader: "NebulaTest".to_string(),
            block_max_rows: 50_000,
        }
    }
}

/// Shared collaborators handed to every `work()` invocation.
pub struct IngestContext {
    pub blocks: Arc<BlockManager>,
    pub tables: Arc<TableRegistry>,
    pub options: IngestOptions,
    /// Builds the data-store client for a `(source, domain)` pair.
    /// Object-store clients are registered here by the embedding process;
    /// the default factory only knows the local filesystem.
    pub stores: StoreFactory,
}

impl IngestContext {
    pub fn new(blocks: Arc<BlockManager>, tables: Arc<TableRegistry>) -> Self {
        Self {
            blocks,
            tables,
            options: IngestOptions::default(),
            stores: default_store_factory(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stores(mut self, stores: StoreFactory) -> Self {
        self.stores = stores;
        self
    }
}
