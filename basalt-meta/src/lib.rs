//! Table metadata, specs and block identity.
//!
//! This crate hosts the immutable descriptions upstream components hand to
//! the ingestion core: [`TableSpec`] (what a table is and how to load it),
//! [`TimeSpec`] (how each row's time is derived), the runtime [`Table`]
//! handle, [`BlockSignature`] (the identity of an installed block), and the
//! weak, name-indexed [`TableRegistry`].

pub mod registry;
pub mod signature;
pub mod table;
pub mod table_spec;

pub use registry::TableRegistry;
pub use signature::BlockSignature;
pub use table::{ColumnProp, ColumnProps, Table};
pub use table_spec::{
    AccessRule, AccessSpec, BucketInfo, DataSource, KafkaSerde, Settings, TableSpec, TimeSpec,
    TimeType,
};
