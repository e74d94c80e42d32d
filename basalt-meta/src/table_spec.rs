//! Immutable table descriptions consumed by the ingestion core.

use std::sync::Arc;

use basalt_result::Result;
use basalt_types::TIME_COLUMN;
use basalt_types::schema::{Column, DataKind, Schema};
use rustc_hash::FxHashMap;

use crate::table::{ColumnProps, Table};

/// Where a table's data comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DataSource {
    #[default]
    Custom,
    S3,
    Local,
    Kafka,
    GSheet,
}

impl DataSource {
    /// File-backed sources go through the fetch + file-reader pipeline.
    pub fn is_file_system(&self) -> bool {
        matches!(self, DataSource::S3 | DataSource::Local)
    }

    pub fn protocol(&self) -> Option<&'static str> {
        match self {
            DataSource::S3 => Some("s3"),
            DataSource::Local => Some("local"),
            _ => None,
        }
    }
}

/// How the reserved `_time_` column is derived for each ingested row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeType {
    /// Fixed value for every row.
    #[default]
    Static,
    /// Process clock at row-ingest time.
    Current,
    /// Parsed out of a named input column; that column is replaced by
    /// `_time_` in the final schema.
    Column,
    /// A named macro; the caller-supplied date value for `"date"`.
    Macro,
    /// Filled by the source itself (e.g. a broker message timestamp);
    /// reserved for streaming sources, not handled by this core.
    Provided,
}

/// Time-derivation policy for a table.
///
/// When `pattern` is empty for a [`TimeType::Column`] spec, the column is
/// treated as an integer unix time value rather than a formatted string.
#[derive(Debug, Clone, Default)]
pub struct TimeSpec {
    pub time_type: TimeType,
    pub unix_time_value: i64,
    pub col_name: String,
    pub pattern: String,
}

impl TimeSpec {
    pub fn fixed(unix_time_value: i64) -> Self {
        Self {
            time_type: TimeType::Static,
            unix_time_value,
            ..Self::default()
        }
    }

    pub fn current() -> Self {
        Self {
            time_type: TimeType::Current,
            ..Self::default()
        }
    }

    pub fn from_column(col_name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            time_type: TimeType::Column,
            col_name: col_name.into(),
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn from_macro(pattern: impl Into<String>) -> Self {
        Self {
            time_type: TimeType::Macro,
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn provided() -> Self {
        Self {
            time_type: TimeType::Provided,
            ..Self::default()
        }
    }
}

/// Serde description for broker-backed sources (unused by the file paths).
#[derive(Debug, Clone, Default)]
pub struct KafkaSerde {
    /// Topic retention in seconds.
    pub retention: u64,
    /// Size of each ingestion batch.
    pub size: u64,
    /// Wire protocol variant (e.g. binary vs compact).
    pub protocol: String,
    /// Column name to field id, as defined by the upstream schema.
    pub cmap: FxHashMap<String, u32>,
}

/// One access-control rule (opaque pass-through for the ingestion core).
#[derive(Debug, Clone, Default)]
pub struct AccessRule {
    pub action: String,
    pub groups: Vec<String>,
}

pub type AccessSpec = Vec<AccessRule>;

/// Bucketing description for pre-partitioned sources.
#[derive(Debug, Clone, Default)]
pub struct BucketInfo {
    pub count: u64,
    pub column: String,
}

impl BucketInfo {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Free-form key-value settings.
pub type Settings = FxHashMap<String, String>;

/// Immutable description of a table: schema, time semantics, source
/// location, and load policy.
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Max size in MB resident in memory.
    pub max_mb: u64,
    /// Max time span in hours resident in memory.
    pub max_hr: u64,
    /// Serialized table schema (`ROW<name:type,...>`).
    pub schema: String,
    /// Data source to load from.
    pub source: DataSource,
    /// Loader deciding how data comes in (`"Swap"`, `"Roll"`, or the
    /// configured test loader).
    pub loader: String,
    /// Source location uri.
    pub location: String,
    /// Backup location uri.
    pub backup: String,
    /// Data format (`"csv"` or `"parquet"`).
    pub format: String,
    /// Serde of broker-backed data.
    pub serde: KafkaSerde,
    /// Column properties.
    pub column_props: ColumnProps,
    /// Time spec to generate the `_time_` value.
    pub time_spec: TimeSpec,
    /// Access rules.
    pub access_spec: AccessSpec,
    /// Bucket info.
    pub bucket_info: BucketInfo,
    /// Key-value settings.
    pub settings: Settings,
}

impl TableSpec {
    /// Final schema after time derivation: the source time column (if any)
    /// removed, the reserved `_time_` column appended.
    pub fn final_schema(&self) -> Result<Schema> {
        let mut schema = Schema::parse(&self.schema)?;
        if self.time_spec.time_type == TimeType::Column {
            schema.remove(&self.time_spec.col_name)?;
        }
        schema.push(Column::new(TIME_COLUMN, DataKind::Int64))?;
        Ok(schema)
    }

    /// Build the runtime table handle for this spec.
    pub fn to_table(&self) -> Result<Table> {
        Ok(Table::new(
            &self.name,
            Arc::new(self.final_schema()?),
            self.column_props.clone(),
        ))
    }
}
