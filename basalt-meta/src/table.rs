//! Runtime table handle.

use std::sync::Arc;

use basalt_types::schema::Schema;
use rustc_hash::FxHashMap;

/// Per-column storage hints carried from the table description.
#[derive(Debug, Clone, Default)]
pub struct ColumnProp {
    pub bloom_filter: bool,
    pub dict: bool,
    pub default_value: Option<String>,
}

/// Column name to property map.
pub type ColumnProps = FxHashMap<String, ColumnProp>;

/// A named table with its final (post time-derivation) schema.
///
/// Tables are shared via `Arc`: blocks hold the table's schema through their
/// batches, and the registry holds only a weak handle.
#[derive(Debug)]
pub struct Table {
    name: String,
    schema: Arc<Schema>,
    props: ColumnProps,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Arc<Schema>, props: ColumnProps) -> Self {
        Self {
            name: name.into(),
            schema,
            props,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn props(&self) -> &ColumnProps {
        &self.props
    }

    pub fn column_prop(&self, column: &str) -> Option<&ColumnProp> {
        self.props.get(column)
    }
}
