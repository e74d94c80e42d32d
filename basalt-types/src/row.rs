//! Row capability traits.
//!
//! Every row source (file readers, the time adapter, flat-buffer views,
//! synthetic rows) exposes the same capability set: typed reads by column
//! name plus `is_null`. Compound values come back as boxed [`ListRead`] /
//! [`MapRead`] views borrowing from the row.
//!
//! Null at the row level and null at the element level are distinct: a row
//! may hold a non-null list containing null elements.

use basalt_result::Result;

/// Read-by-name access to one row.
pub trait RowRead {
    fn is_null(&self, name: &str) -> bool;
    fn read_bool(&self, name: &str) -> Result<bool>;
    fn read_byte(&self, name: &str) -> Result<i8>;
    fn read_short(&self, name: &str) -> Result<i16>;
    fn read_int(&self, name: &str) -> Result<i32>;
    fn read_long(&self, name: &str) -> Result<i64>;
    fn read_float(&self, name: &str) -> Result<f32>;
    fn read_double(&self, name: &str) -> Result<f64>;
    fn read_string(&self, name: &str) -> Result<&str>;
    fn read_list(&self, name: &str) -> Result<Box<dyn ListRead + '_>>;
    fn read_map(&self, name: &str) -> Result<Box<dyn MapRead + '_>>;
}

/// Per-index access to the elements of a list value.
pub trait ListRead {
    /// Number of elements in the list.
    fn items(&self) -> usize;
    fn is_null(&self, index: usize) -> bool;
    fn read_bool(&self, index: usize) -> Result<bool>;
    fn read_byte(&self, index: usize) -> Result<i8>;
    fn read_short(&self, index: usize) -> Result<i16>;
    fn read_int(&self, index: usize) -> Result<i32>;
    fn read_long(&self, index: usize) -> Result<i64>;
    fn read_float(&self, index: usize) -> Result<f32>;
    fn read_double(&self, index: usize) -> Result<f64>;
    fn read_string(&self, index: usize) -> Result<&str>;
}

/// Per-entry access to a map value via parallel key and value lists.
pub trait MapRead {
    /// Number of entries in the map.
    fn entries(&self) -> usize;
    fn keys(&self) -> Box<dyn ListRead + '_>;
    fn values(&self) -> Box<dyn ListRead + '_>;
}
