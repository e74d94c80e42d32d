//! Row adapter overlaying the reserved `_time_` column.

use basalt_result::Result;
use basalt_types::TIME_COLUMN;
use basalt_types::row::{ListRead, MapRead, RowRead};

use crate::time::TimeFn;

/// Wraps an input row and synthesizes `_time_` from the table's time
/// function; every other read delegates to the wrapped row.
///
/// The adapter is bound per row and used sequentially against a single
/// source cursor; it holds non-owning references only.
pub struct TimeRow<'a> {
    inner: &'a dyn RowRead,
    time_fn: &'a TimeFn,
}

impl<'a> TimeRow<'a> {
    pub fn bind(time_fn: &'a TimeFn, inner: &'a dyn RowRead) -> Self {
        Self { inner, time_fn }
    }
}

impl RowRead for TimeRow<'_> {
    fn is_null(&self, name: &str) -> bool {
        // the derived time column always carries a value
        name != TIME_COLUMN && self.inner.is_null(name)
    }

    fn read_long(&self, name: &str) -> Result<i64> {
        if name == TIME_COLUMN {
            return Ok((self.time_fn)(self.inner));
        }
        self.inner.read_long(name)
    }

    fn read_bool(&self, name: &str) -> Result<bool> {
        self.inner.read_bool(name)
    }

    fn read_byte(&self, name: &str) -> Result<i8> {
        self.inner.read_byte(name)
    }

    fn read_short(&self, name: &str) -> Result<i16> {
        self.inner.read_short(name)
    }

    fn read_int(&self, name: &str) -> Result<i32> {
        self.inner.read_int(name)
    }

    fn read_float(&self, name: &str) -> Result<f32> {
        self.inner.read_float(name)
    }

    fn read_double(&self, name: &str) -> Result<f64> {
        self.inner.read_double(name)
    }

    fn read_string(&self, name: &str) -> Result<&str> {
        self.inner.read_string(name)
    }

    fn read_list(&self, name: &str) -> Result<Box<dyn ListRead + '_>> {
        self.inner.read_list(name)
    }

    fn read_map(&self, name: &str) -> Result<Box<dyn MapRead + '_>> {
        self.inner.read_map(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::build_time_fn;
    use basalt_meta::TimeSpec;
    use basalt_types::value::ValueRow;

    #[test]
    fn overlays_time_and_delegates_the_rest() {
        let time_fn = build_time_fn(&TimeSpec::fixed(42), 0).unwrap();
        let inner = ValueRow::new().set("id", 7i32).set("note", "n");
        let adapted = TimeRow::bind(&time_fn, &inner);

        assert_eq!(adapted.read_long(TIME_COLUMN).unwrap(), 42);
        assert!(!adapted.is_null(TIME_COLUMN));
        assert_eq!(adapted.read_int("id").unwrap(), 7);
        assert_eq!(adapted.read_string("note").unwrap(), "n");
        assert!(adapted.is_null("absent"));
    }

    #[test]
    fn column_time_reads_through_the_bound_row() {
        let time_fn =
            build_time_fn(&TimeSpec::from_column("ts", "%Y-%m-%d %H:%M:%S"), 0).unwrap();
        let inner = ValueRow::new().set("ts", "2020-01-01 00:00:10");
        let adapted = TimeRow::bind(&time_fn, &inner);
        assert_eq!(adapted.read_long(TIME_COLUMN).unwrap(), 1_577_836_810);
    }
}
