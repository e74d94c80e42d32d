//! Reserved column names.

/// Reserved column carrying a row's ingestion time in seconds since epoch.
///
/// Every table schema that goes through ingestion ends with this `i64`
/// column appended; user schemas must not declare it themselves.
pub const TIME_COLUMN: &str = "_time_";
