//! Owned row values.
//!
//! [`ValueRow`] is the hash-backed row used by synthetic data generation and
//! tests. It implements the same [`RowRead`] surface as the file readers, so
//! anything that consumes rows can be driven from literal values.

use basalt_result::{Error, Result};
use rustc_hash::FxHashMap;

use crate::row::{ListRead, MapRead, RowRead};

/// A single owned value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

fn mismatch(name_or_index: impl std::fmt::Display, expected: &str) -> Error {
    Error::InvalidArgumentError(format!("value at {name_or_index} is not a {expected}"))
}

/// An owned row keyed by column name.
///
/// Columns that were never set read as null.
#[derive(Debug, Clone, Default)]
pub struct ValueRow {
    values: FxHashMap<String, Value>,
}

impl ValueRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(name, value);
        self
    }

    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn value(&self, name: &str) -> Result<&Value> {
        self.values.get(name).ok_or(Error::NotFound)
    }
}

impl RowRead for ValueRow {
    fn is_null(&self, name: &str) -> bool {
        matches!(self.values.get(name), None | Some(Value::Null))
    }

    fn read_bool(&self, name: &str) -> Result<bool> {
        match self.value(name)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(mismatch(name, "bool")),
        }
    }

    fn read_byte(&self, name: &str) -> Result<i8> {
        match self.value(name)? {
            Value::Int8(v) => Ok(*v),
            _ => Err(mismatch(name, "tinyint")),
        }
    }

    fn read_short(&self, name: &str) -> Result<i16> {
        match self.value(name)? {
            Value::Int16(v) => Ok(*v),
            _ => Err(mismatch(name, "smallint")),
        }
    }

    fn read_int(&self, name: &str) -> Result<i32> {
        match self.value(name)? {
            Value::Int32(v) => Ok(*v),
            _ => Err(mismatch(name, "int")),
        }
    }

    fn read_long(&self, name: &str) -> Result<i64> {
        match self.value(name)? {
            Value::Int64(v) => Ok(*v),
            _ => Err(mismatch(name, "bigint")),
        }
    }

    fn read_float(&self, name: &str) -> Result<f32> {
        match self.value(name)? {
            Value::Float32(v) => Ok(*v),
            _ => Err(mismatch(name, "float")),
        }
    }

    fn read_double(&self, name: &str) -> Result<f64> {
        match self.value(name)? {
            Value::Float64(v) => Ok(*v),
            _ => Err(mismatch(name, "double")),
        }
    }

    fn read_string(&self, name: &str) -> Result<&str> {
        match self.value(name)? {
            Value::String(v) => Ok(v.as_str()),
            _ => Err(mismatch(name, "string")),
        }
    }

    fn read_list(&self, name: &str) -> Result<Box<dyn ListRead + '_>> {
        match self.value(name)? {
            Value::List(values) => Ok(Box::new(ValueList { values })),
            _ => Err(mismatch(name, "list")),
        }
    }

    fn read_map(&self, name: &str) -> Result<Box<dyn MapRead + '_>> {
        match self.value(name)? {
            Value::Map(entries) => Ok(Box::new(ValueMap { entries })),
            _ => Err(mismatch(name, "map")),
        }
    }
}

/// List view over a slice of owned values.
pub struct ValueList<'a> {
    values: &'a [Value],
}

impl<'a> ValueList<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    fn value(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| mismatch(index, "valid index"))
    }
}

impl ListRead for ValueList<'_> {
    fn items(&self) -> usize {
        self.values.len()
    }

    fn is_null(&self, index: usize) -> bool {
        matches!(self.values.get(index), None | Some(Value::Null))
    }

    fn read_bool(&self, index: usize) -> Result<bool> {
        match self.value(index)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(mismatch(index, "bool")),
        }
    }

    fn read_byte(&self, index: usize) -> Result<i8> {
        match self.value(index)? {
            Value::Int8(v) => Ok(*v),
            _ => Err(mismatch(index, "tinyint")),
        }
    }

    fn read_short(&self, index: usize) -> Result<i16> {
        match self.value(index)? {
            Value::Int16(v) => Ok(*v),
            _ => Err(mismatch(index, "smallint")),
        }
    }

    fn read_int(&self, index: usize) -> Result<i32> {
        match self.value(index)? {
            Value::Int32(v) => Ok(*v),
            _ => Err(mismatch(index, "int")),
        }
    }

    fn read_long(&self, index: usize) -> Result<i64> {
        match self.value(index)? {
            Value::Int64(v) => Ok(*v),
            _ => Err(mismatch(index, "bigint")),
        }
    }

    fn read_float(&self, index: usize) -> Result<f32> {
        match self.value(index)? {
            Value::Float32(v) => Ok(*v),
            _ => Err(mismatch(index, "float")),
        }
    }

    fn read_double(&self, index: usize) -> Result<f64> {
        match self.value(index)? {
            Value::Float64(v) => Ok(*v),
            _ => Err(mismatch(index, "double")),
        }
    }

    fn read_string(&self, index: usize) -> Result<&str> {
        match self.value(index)? {
            Value::String(v) => Ok(v.as_str()),
            _ => Err(mismatch(index, "string")),
        }
    }
}

struct ValueMap<'a> {
    entries: &'a [(Value, Value)],
}

impl MapRead for ValueMap<'_> {
    fn entries(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Box<dyn ListRead + '_> {
        Box::new(PairList {
            entries: self.entries,
            keys: true,
        })
    }

    fn values(&self) -> Box<dyn ListRead + '_> {
        Box::new(PairList {
            entries: self.entries,
            keys: false,
        })
    }
}

struct PairList<'a> {
    entries: &'a [(Value, Value)],
    keys: bool,
}

impl PairList<'_> {
    fn value(&self, index: usize) -> Result<&Value> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| mismatch(index, "valid index"))?;
        Ok(if self.keys { &entry.0 } else { &entry.1 })
    }
}

impl ListRead for PairList<'_> {
    fn items(&self) -> usize {
        self.entries.len()
    }

    fn is_null(&self, index: usize) -> bool {
        matches!(self.value(index), Ok(Value::Null) | Err(_))
    }

    fn read_bool(&self, index: usize) -> Result<bool> {
        match self.value(index)? {
            Value::Bool(v) => Ok(*v),
            _ => Err(mismatch(index, "bool")),
        }
    }

    fn read_byte(&self, index: usize) -> Result<i8> {
        match self.value(index)? {
            Value::Int8(v) => Ok(*v),
            _ => Err(mismatch(index, "tinyint")),
        }
    }

    fn read_short(&self, index: usize) -> Result<i16> {
        match self.value(index)? {
            Value::Int16(v) => Ok(*v),
            _ => Err(mismatch(index, "smallint")),
        }
    }

    fn read_int(&self, index: usize) -> Result<i32> {
        match self.value(index)? {
            Value::Int32(v) => Ok(*v),
            _ => Err(mismatch(index, "int")),
        }
    }

    fn read_long(&self, index: usize) -> Result<i64> {
        match self.value(index)? {
            Value::Int64(v) => Ok(*v),
            _ => Err(mismatch(index, "bigint")),
        }
    }

    fn read_float(&self, index: usize) -> Result<f32> {
        match self.value(index)? {
            Value::Float32(v) => Ok(*v),
            _ => Err(mismatch(index, "float")),
        }
    }

    fn read_double(&self, index: usize) -> Result<f64> {
        match self.value(index)? {
            Value::Float64(v) => Ok(*v),
            _ => Err(mismatch(index, "double")),
        }
    }

    fn read_string(&self, index: usize) -> Result<&str> {
        match self.value(index)? {
            Value::String(v) => Ok(v.as_str()),
            _ => Err(mismatch(index, "string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_by_name() {
        let row = ValueRow::new()
            .set("id", 7i32)
            .set("name", "seven")
            .set("score", 0.5f64)
            .set("missing", Value::Null);

        assert_eq!(row.read_int("id").unwrap(), 7);
        assert_eq!(row.read_string("name").unwrap(), "seven");
        assert_eq!(row.read_double("score").unwrap(), 0.5);
        assert!(row.is_null("missing"));
        assert!(row.is_null("never_set"));
        assert!(row.read_long("id").is_err());
    }

    #[test]
    fn list_and_map_views() {
        let row = ValueRow::new()
            .set(
                "tags",
                Value::List(vec!["a".into(), Value::Null, "c".into()]),
            )
            .set(
                "counts",
                Value::Map(vec![("x".into(), Value::Int64(1))]),
            );

        let tags = row.read_list("tags").unwrap();
        assert_eq!(tags.items(), 3);
        assert!(tags.is_null(1));
        assert_eq!(tags.read_string(2).unwrap(), "c");

        let counts = row.read_map("counts").unwrap();
        assert_eq!(counts.entries(), 1);
        assert_eq!(counts.keys().read_string(0).unwrap(), "x");
        assert_eq!(counts.values().read_long(0).unwrap(), 1);
    }
}
