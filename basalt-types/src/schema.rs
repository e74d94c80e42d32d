//! Schema tree and text serde.
//!
//! A schema is a flat record: an ordered list of named, typed columns.
//! Compound kinds (`list<T>`, `map<K,V>`) nest one level deep; their element
//! kinds must be primitive or string.
//!
//! The text form is `ROW<name:type, ...>` with SQL-ish type names
//! (`int`, `bigint`, `string`, `list<string>`, ...). Parsing accepts common
//! aliases (`integer`, `long`, `varchar`, `array<...>`) case-insensitively
//! and renders back in canonical lowercase form.

use std::fmt;

use basalt_result::{Error, Result};
use rustc_hash::FxHashMap;

/// Data kind of a column or a compound element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    List(Box<DataKind>),
    Map(Box<DataKind>, Box<DataKind>),
}

impl DataKind {
    /// True for scalar kinds, i.e. everything except lists and maps.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, DataKind::List(_) | DataKind::Map(_, _))
    }

    fn canonical(&self) -> String {
        match self {
            DataKind::Bool => "bool".to_string(),
            DataKind::Int8 => "tinyint".to_string(),
            DataKind::Int16 => "smallint".to_string(),
            DataKind::Int32 => "int".to_string(),
            DataKind::Int64 => "bigint".to_string(),
            DataKind::Float32 => "float".to_string(),
            DataKind::Float64 => "double".to_string(),
            DataKind::String => "string".to_string(),
            DataKind::List(item) => format!("list<{}>", item.canonical()),
            DataKind::Map(key, value) => {
                format!("map<{},{}>", key.canonical(), value.canonical())
            }
        }
    }

    fn parse(text: &str) -> Result<DataKind> {
        let lower = text.trim().to_ascii_lowercase();
        for wrapper in ["list", "array"] {
            if let Some(inner) = strip_compound(&lower, wrapper) {
                let item = DataKind::parse(inner)?;
                require_scalar(&item, &lower)?;
                return Ok(DataKind::List(Box::new(item)));
            }
        }
        if let Some(inner) = strip_compound(&lower, "map") {
            let parts = split_top_level(inner, ',');
            if parts.len() != 2 {
                return Err(Error::InvalidArgumentError(format!(
                    "map type needs a key and a value: '{text}'"
                )));
            }
            let key = DataKind::parse(parts[0])?;
            let value = DataKind::parse(parts[1])?;
            require_scalar(&key, &lower)?;
            require_scalar(&value, &lower)?;
            return Ok(DataKind::Map(Box::new(key), Box::new(value)));
        }

        match lower.as_str() {
            "bool" | "boolean" => Ok(DataKind::Bool),
            "tinyint" | "byte" => Ok(DataKind::Int8),
            "smallint" | "short" => Ok(DataKind::Int16),
            "int" | "integer" => Ok(DataKind::Int32),
            "bigint" | "long" => Ok(DataKind::Int64),
            "float" | "real" => Ok(DataKind::Float32),
            "double" => Ok(DataKind::Float64),
            "string" | "varchar" => Ok(DataKind::String),
            other => Err(Error::InvalidArgumentError(format!(
                "unknown type name: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

fn require_scalar(kind: &DataKind, context: &str) -> Result<()> {
    if kind.is_scalar() {
        Ok(())
    } else {
        Err(Error::InvalidArgumentError(format!(
            "compound types nest one level only: '{context}'"
        )))
    }
}

fn strip_compound<'a>(text: &'a str, wrapper: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(wrapper)?.trim_start();
    let inner = rest.strip_prefix('<')?;
    inner.strip_suffix('>')
}

/// Split on `delim` at angle-bracket depth zero.
fn split_top_level(text: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == delim && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    kind: DataKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &DataKind {
        &self.kind
    }
}

/// An ordered record of uniquely named columns with O(1) name lookup.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
    index: FxHashMap<String, usize>,
}

impl Schema {
    /// Build a schema from columns, rejecting duplicate names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut schema = Schema::default();
        for column in columns {
            schema.push(column)?;
        }
        Ok(schema)
    }

    /// Parse the `ROW<name:type, ...>` text form.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = match strip_row_wrapper(trimmed) {
            Some(inner) => inner,
            None => trimmed,
        };
        let mut columns = Vec::new();
        if !body.trim().is_empty() {
            for part in split_top_level(body, ',') {
                let part = part.trim();
                let (name, kind_text) = part.split_once(':').ok_or_else(|| {
                    Error::InvalidArgumentError(format!("expected 'name:type', got '{part}'"))
                })?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::InvalidArgumentError(format!(
                        "empty column name in '{part}'"
                    )));
                }
                columns.push(Column::new(name, DataKind::parse(kind_text)?));
            }
        }
        Schema::new(columns)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Append a column, rejecting duplicate names.
    pub fn push(&mut self, column: Column) -> Result<()> {
        if self.index.contains_key(column.name()) {
            return Err(Error::InvalidArgumentError(format!(
                "duplicate column name: '{}'",
                column.name()
            )));
        }
        self.index.insert(column.name().to_string(), self.columns.len());
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let position = self.position(name).ok_or(Error::NotFound)?;
        self.columns.remove(position);
        self.index.clear();
        for (i, column) in self.columns.iter().enumerate() {
            self.index.insert(column.name().to_string(), i);
        }
        Ok(())
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ROW<")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", column.name(), column.kind())?;
        }
        write!(f, ">")
    }
}

fn strip_row_wrapper(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("ROW").or_else(|| text.strip_prefix("row"))?;
    let inner = rest.trim_start().strip_prefix('<')?;
    inner.strip_suffix('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primitives_and_aliases() {
        let schema = Schema::parse("ROW<id:int, name:varchar, score:DOUBLE, ok:boolean>").unwrap();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.get("id").unwrap().kind(), &DataKind::Int32);
        assert_eq!(schema.get("name").unwrap().kind(), &DataKind::String);
        assert_eq!(schema.get("score").unwrap().kind(), &DataKind::Float64);
        assert_eq!(schema.get("ok").unwrap().kind(), &DataKind::Bool);
        assert_eq!(schema.position("score"), Some(2));
    }

    #[test]
    fn parse_compound_types() {
        let schema = Schema::parse("ROW<tags:list<string>, counts:map<string,bigint>>").unwrap();
        assert_eq!(
            schema.get("tags").unwrap().kind(),
            &DataKind::List(Box::new(DataKind::String))
        );
        assert_eq!(
            schema.get("counts").unwrap().kind(),
            &DataKind::Map(Box::new(DataKind::String), Box::new(DataKind::Int64))
        );
    }

    #[test]
    fn display_round_trips() {
        let text = "ROW<id:int,tags:list<string>,counts:map<string,bigint>>";
        let schema = Schema::parse(text).unwrap();
        assert_eq!(schema.to_string(), text);
        assert_eq!(Schema::parse(&schema.to_string()).unwrap(), schema);
    }

    #[test]
    fn rejects_duplicates_and_deep_nesting() {
        assert!(Schema::parse("ROW<a:int, a:string>").is_err());
        assert!(Schema::parse("ROW<a:list<list<int>>>").is_err());
        assert!(Schema::parse("ROW<a:map<string,list<int>>>").is_err());
        assert!(Schema::parse("ROW<a:frobnicate>").is_err());
    }

    #[test]
    fn remove_reindexes() {
        let mut schema = Schema::parse("ROW<a:int,b:string,c:bigint>").unwrap();
        schema.remove("b").unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("c"), Some(1));
        assert!(matches!(schema.remove("b"), Err(Error::NotFound)));
    }
}
