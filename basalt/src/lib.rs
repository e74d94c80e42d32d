//! Basalt: the ingestion core of an in-memory columnar analytics engine.
//!
//! Upstream components describe tables ([`TableSpec`]) and publish ingest
//! specs ([`IngestSpec`]), one file or logical partition each. `work()`
//! turns a spec into an ordered set of immutable, capacity-bounded blocks
//! of rows and installs them atomically in the process-wide
//! [`BlockManager`] that serves queries.
//!
//! This crate re-exports the public surface of the workspace members.

pub use basalt_execution::{BatchBlock, BlockFilter, BlockManager};
pub use basalt_ingest::{
    DataStore, FileInfo, IngestContext, IngestOptions, IngestSpec, LocalStore, SpecState,
    StoreFactory, TimeRow, default_store_factory,
};
pub use basalt_memory::{Batch, FlatBuffer, FlatRow};
pub use basalt_meta::{
    AccessRule, AccessSpec, BlockSignature, BucketInfo, ColumnProp, ColumnProps, DataSource,
    KafkaSerde, Settings, Table, TableRegistry, TableSpec, TimeSpec, TimeType,
};
pub use basalt_result::{Error, Result};
pub use basalt_types::{
    Column, DataKind, ListRead, MapRead, RowRead, Schema, TIME_COLUMN, Value, ValueRow,
};
