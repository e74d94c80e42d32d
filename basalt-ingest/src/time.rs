//! Time-function derivation.
//!
//! A [`TimeFn`] maps an input row to the epoch-second value of its reserved
//! `_time_` column. The function is built once per spec from the table's
//! [`TimeSpec`] and captures the small scalars it needs by value, so it
//! outlives nothing but the `work()` call that holds it.

use basalt_meta::{TimeSpec, TimeType};
use basalt_result::{Error, Result};
use basalt_types::row::RowRead;
use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Row-to-epoch-seconds derivation for one table.
pub type TimeFn = Box<dyn Fn(&dyn RowRead) -> i64 + Send + Sync>;

/// The only macro pattern currently defined: the caller-supplied date value
/// carried on the ingest spec.
pub const MACRO_DATE: &str = "date";

/// Build the time function for a table's time spec.
///
/// `mdate` is the spec-level date value consumed by the `"date"` macro.
/// Unknown macro patterns and `Provided` time are configuration errors:
/// the spec fails instead of silently stamping zeros.
pub fn build_time_fn(spec: &TimeSpec, mdate: i64) -> Result<TimeFn> {
    match spec.time_type {
        TimeType::Static => {
            let value = spec.unix_time_value;
            Ok(Box::new(move |_| value))
        }
        TimeType::Current => Ok(Box::new(|_| Utc::now().timestamp())),
        TimeType::Column => {
            let col_name = spec.col_name.clone();
            let pattern = spec.pattern.clone();
            Ok(Box::new(move |row| match row.read_string(&col_name) {
                Ok(value) => parse_time(value, &pattern),
                Err(_) => 0,
            }))
        }
        TimeType::Macro => {
            if spec.pattern == MACRO_DATE {
                Ok(Box::new(move |_| mdate))
            } else {
                Err(Error::InvalidArgumentError(format!(
                    "unsupported time macro: '{}'",
                    spec.pattern
                )))
            }
        }
        TimeType::Provided => Err(Error::InvalidArgumentError(
            "provided time is filled by the source, not the ingest core".to_string(),
        )),
    }
}

/// Parse a time string into epoch seconds.
///
/// An empty pattern means the column already holds an integer unix time.
/// Malformed values yield 0 and the row is kept; dropping data over a bad
/// timestamp is a product decision this layer does not make.
pub fn parse_time(value: &str, pattern: &str) -> i64 {
    let value = value.trim();
    if pattern.is_empty() {
        return value.parse::<i64>().unwrap_or(0);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, pattern) {
        return datetime.and_utc().timestamp();
    }
    // date-only patterns resolve to midnight
    if let Ok(date) = NaiveDate::parse_from_str(value, pattern)
        && let Some(datetime) = date.and_hms_opt(0, 0, 0)
    {
        return datetime.and_utc().timestamp();
    }
    0
}
