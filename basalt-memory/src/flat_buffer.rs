//! Append-with-rollback row store.
//!
//! Rows are serialized against a fixed schema into three little-endian
//! arenas, so the whole buffer state is captured by three cursors:
//!
//! - `main`: one fixed-width region per row:
//!   `[null bitmap (ceil(cols/8) bytes)] [slot per column]`
//!   Slot widths by kind: bool/tinyint 1, smallint 2, int/float 4,
//!   bigint/double 8, string 8 (`var` offset u32 + byte length u32),
//!   list 8 (`aux` offset u32 + item count u32), map 16 (key-list ref +
//!   value-list ref).
//! - `var`: raw string bytes.
//! - `aux`: list element regions:
//!   `[element null bitmap (ceil(n/8))] [n fixed-width element slots]`.
//!   String elements refer back into `var`.
//!
//! Null slots stay zero-filled. Because every row occupies exactly
//! `row_width` bytes of `main`, row lookup is a multiplication, and undoing
//! the most recent `add` is truncating all three arenas to the cursors
//! captured before it. That is the byte-exact rollback the ingestion path
//! relies on when a row fails mid-serialization.

use std::sync::Arc;

use basalt_result::{Error, Result};
use basalt_types::row::{ListRead, MapRead, RowRead};
use basalt_types::schema::{Column, DataKind, Schema};

#[derive(Clone, Copy)]
struct Cursors {
    main: usize,
    var: usize,
    aux: usize,
}

fn slot_width(kind: &DataKind) -> usize {
    match kind {
        DataKind::Bool | DataKind::Int8 => 1,
        DataKind::Int16 => 2,
        DataKind::Int32 | DataKind::Float32 => 4,
        DataKind::Int64 | DataKind::Float64 => 8,
        DataKind::String => 8,
        DataKind::List(_) => 8,
        DataKind::Map(_, _) => 16,
    }
}

fn cursor_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Internal("arena cursor exceeds u32 range".to_string()))
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn kind_mismatch(name: &str, expected: &str) -> Error {
    Error::InvalidArgumentError(format!("column '{name}' is not a {expected}"))
}

/// Schema-aware append-only row store with single-step rollback.
pub struct FlatBuffer {
    schema: Arc<Schema>,
    slot_offsets: Vec<usize>,
    null_bytes: usize,
    row_width: usize,
    rows: usize,
    main: Vec<u8>,
    var: Vec<u8>,
    aux: Vec<u8>,
    last: Option<Cursors>,
}

impl FlatBuffer {
    /// Create an empty buffer for the given schema.
    ///
    /// Rejects schemas whose compound columns nest deeper than one level;
    /// list elements and map keys/values must be scalar.
    pub fn new(schema: Arc<Schema>) -> Result<Self> {
        let mut slot_offsets = Vec::with_capacity(schema.len());
        let mut width = 0usize;
        for column in schema.columns() {
            match column.kind() {
                DataKind::List(item) if !item.is_scalar() => {
                    return Err(Error::InvalidArgumentError(format!(
                        "column '{}': list elements must be scalar",
                        column.name()
                    )));
                }
                DataKind::Map(key, value) if !key.is_scalar() || !value.is_scalar() => {
                    return Err(Error::InvalidArgumentError(format!(
                        "column '{}': map keys and values must be scalar",
                        column.name()
                    )));
                }
                _ => {}
            }
            slot_offsets.push(width);
            width += slot_width(column.kind());
        }
        let null_bytes = schema.len().div_ceil(8);
        Ok(Self {
            schema,
            slot_offsets,
            null_bytes,
            row_width: null_bytes + width,
            rows: 0,
            main: Vec::new(),
            var: Vec::new(),
            aux: Vec::new(),
            last: None,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Current row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Bytes held across all arenas.
    pub fn memory(&self) -> usize {
        self.main.len() + self.var.len() + self.aux.len()
    }

    /// Serialize one row.
    ///
    /// On any column error the arenas are restored to their pre-call state,
    /// so a failed add leaves the buffer untouched.
    pub fn add(&mut self, row: &dyn RowRead) -> Result<()> {
        let snapshot = self.cursors();
        match self.write_row(row) {
            Ok(()) => {
                self.rows += 1;
                self.last = Some(snapshot);
                Ok(())
            }
            Err(err) => {
                self.restore(snapshot);
                Err(err)
            }
        }
    }

    /// Discard the most recently added row, restoring the exact byte state
    /// from before that `add`.
    ///
    /// Only one rollback is available per add; a second consecutive call, or
    /// a call on an empty buffer, is an invariant violation.
    pub fn rollback(&mut self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::Internal("rollback on empty flat buffer".to_string()));
        }
        let snapshot = self
            .last
            .take()
            .ok_or_else(|| Error::Internal("rollback without a preceding add".to_string()))?;
        self.restore(snapshot);
        self.rows -= 1;
        Ok(())
    }

    /// Read view of row `index`, or `None` past the end.
    ///
    /// Views stay valid across later appends; the arenas only grow.
    pub fn row(&self, index: usize) -> Option<FlatRow<'_>> {
        if index >= self.rows {
            return None;
        }
        Some(FlatRow {
            buffer: self,
            start: index * self.row_width,
        })
    }

    fn cursors(&self) -> Cursors {
        Cursors {
            main: self.main.len(),
            var: self.var.len(),
            aux: self.aux.len(),
        }
    }

    fn restore(&mut self, cursors: Cursors) {
        self.main.truncate(cursors.main);
        self.var.truncate(cursors.var);
        self.aux.truncate(cursors.aux);
    }

    fn write_row(&mut self, row: &dyn RowRead) -> Result<()> {
        let row_start = self.main.len();
        self.main.resize(row_start + self.row_width, 0);
        let schema = Arc::clone(&self.schema);
        for (i, column) in schema.columns().iter().enumerate() {
            let name = column.name();
            if row.is_null(name) {
                self.main[row_start + i / 8] |= 1 << (i % 8);
                continue;
            }
            let slot = row_start + self.null_bytes + self.slot_offsets[i];
            match column.kind() {
                DataKind::Bool => self.main[slot] = row.read_bool(name)? as u8,
                DataKind::Int8 => self.main[slot] = row.read_byte(name)? as u8,
                DataKind::Int16 => {
                    self.main[slot..slot + 2].copy_from_slice(&row.read_short(name)?.to_le_bytes());
                }
                DataKind::Int32 => {
                    self.main[slot..slot + 4].copy_from_slice(&row.read_int(name)?.to_le_bytes());
                }
                DataKind::Int64 => {
                    self.main[slot..slot + 8].copy_from_slice(&row.read_long(name)?.to_le_bytes());
                }
                DataKind::Float32 => {
                    self.main[slot..slot + 4].copy_from_slice(&row.read_float(name)?.to_le_bytes());
                }
                DataKind::Float64 => {
                    self.main[slot..slot + 8]
                        .copy_from_slice(&row.read_double(name)?.to_le_bytes());
                }
                DataKind::String => {
                    let (off, len) = {
                        let value = row.read_string(name)?;
                        self.push_var(value.as_bytes())?
                    };
                    self.main[slot..slot + 4].copy_from_slice(&off.to_le_bytes());
                    self.main[slot + 4..slot + 8].copy_from_slice(&len.to_le_bytes());
                }
                DataKind::List(item) => {
                    let (off, n) = {
                        let list = row.read_list(name)?;
                        self.push_list(list.as_ref(), item)?
                    };
                    self.main[slot..slot + 4].copy_from_slice(&off.to_le_bytes());
                    self.main[slot + 4..slot + 8].copy_from_slice(&n.to_le_bytes());
                }
                DataKind::Map(key_kind, value_kind) => {
                    let (koff, kn, voff, vn) = {
                        let map = row.read_map(name)?;
                        let (koff, kn) = self.push_list(map.keys().as_ref(), key_kind)?;
                        let (voff, vn) = self.push_list(map.values().as_ref(), value_kind)?;
                        (koff, kn, voff, vn)
                    };
                    self.main[slot..slot + 4].copy_from_slice(&koff.to_le_bytes());
                    self.main[slot + 4..slot + 8].copy_from_slice(&kn.to_le_bytes());
                    self.main[slot + 8..slot + 12].copy_from_slice(&voff.to_le_bytes());
                    self.main[slot + 12..slot + 16].copy_from_slice(&vn.to_le_bytes());
                }
            }
        }
        Ok(())
    }

    fn push_var(&mut self, bytes: &[u8]) -> Result<(u32, u32)> {
        let off = cursor_u32(self.var.len())?;
        let len = cursor_u32(bytes.len())?;
        self.var.extend_from_slice(bytes);
        Ok((off, len))
    }

    fn push_list(&mut self, list: &dyn ListRead, kind: &DataKind) -> Result<(u32, u32)> {
        let n = list.items();
        let width = slot_width(kind);
        let bitmap = n.div_ceil(8);
        let start = self.aux.len();
        self.aux.resize(start + bitmap + n * width, 0);
        for i in 0..n {
            if list.is_null(i) {
                self.aux[start + i / 8] |= 1 << (i % 8);
                continue;
            }
            let slot = start + bitmap + i * width;
            match kind {
                DataKind::Bool => self.aux[slot] = list.read_bool(i)? as u8,
                DataKind::Int8 => self.aux[slot] = list.read_byte(i)? as u8,
                DataKind::Int16 => {
                    self.aux[slot..slot + 2].copy_from_slice(&list.read_short(i)?.to_le_bytes());
                }
                DataKind::Int32 => {
                    self.aux[slot..slot + 4].copy_from_slice(&list.read_int(i)?.to_le_bytes());
                }
                DataKind::Int64 => {
                    self.aux[slot..slot + 8].copy_from_slice(&list.read_long(i)?.to_le_bytes());
                }
                DataKind::Float32 => {
                    self.aux[slot..slot + 4].copy_from_slice(&list.read_float(i)?.to_le_bytes());
                }
                DataKind::Float64 => {
                    self.aux[slot..slot + 8].copy_from_slice(&list.read_double(i)?.to_le_bytes());
                }
                DataKind::String => {
                    let (off, len) = {
                        let value = list.read_string(i)?;
                        self.push_var(value.as_bytes())?
                    };
                    self.aux[slot..slot + 4].copy_from_slice(&off.to_le_bytes());
                    self.aux[slot + 4..slot + 8].copy_from_slice(&len.to_le_bytes());
                }
                DataKind::List(_) | DataKind::Map(_, _) => {
                    return Err(Error::Internal(
                        "compound element kind survived schema validation".to_string(),
                    ));
                }
            }
        }
        Ok((cursor_u32(start)?, cursor_u32(n)?))
    }
}

/// Non-owning read view of one row in a [`FlatBuffer`].
#[derive(Clone, Copy)]
pub struct FlatRow<'a> {
    buffer: &'a FlatBuffer,
    start: usize,
}

impl<'a> FlatRow<'a> {
    fn column(&self, name: &str) -> Result<(usize, &'a Column)> {
        let index = self.buffer.schema.position(name).ok_or(Error::NotFound)?;
        Ok((index, &self.buffer.schema.columns()[index]))
    }

    fn null_at(&self, index: usize) -> bool {
        self.buffer.main[self.start + index / 8] & (1 << (index % 8)) != 0
    }

    fn slot(&self, index: usize) -> usize {
        self.start + self.buffer.null_bytes + self.buffer.slot_offsets[index]
    }

    fn string_at(buffer: &'a FlatBuffer, region: &[u8], slot: usize) -> Result<&'a str> {
        let off = read_u32(region, slot) as usize;
        let len = read_u32(region, slot + 4) as usize;
        std::str::from_utf8(&buffer.var[off..off + len])
            .map_err(|err| Error::Internal(format!("corrupt string bytes: {err}")))
    }
}

impl RowRead for FlatRow<'_> {
    fn is_null(&self, name: &str) -> bool {
        match self.buffer.schema.position(name) {
            Some(index) => self.null_at(index),
            None => true,
        }
    }

    fn read_bool(&self, name: &str) -> Result<bool> {
        let (index, column) = self.column(name)?;
        match column.kind() {
            DataKind::Bool => Ok(self.buffer.main[self.slot(index)] != 0),
            _ => Err(kind_mismatch(name, "bool")),
        }
    }

    fn read_byte(&self, name: &str) -> Result<i8> {
        let (index, column) = self.column(name)?;
        match column.kind() {
            DataKind::Int8 => Ok(self.buffer.main[self.slot(index)] as i8),
            _ => Err(kind_mismatch(name, "tinyint")),
        }
    }

    fn read_short(&self, name: &str) -> Result<i16> {
        let (index, column) = self.column(name)?;
        let slot = self.slot(index);
        match column.kind() {
            DataKind::Int16 => Ok(i16::from_le_bytes([
                self.buffer.main[slot],
                self.buffer.main[slot + 1],
            ])),
            _ => Err(kind_mismatch(name, "smallint")),
        }
    }

    fn read_int(&self, name: &str) -> Result<i32> {
        let (index, column) = self.column(name)?;
        let slot = self.slot(index);
        match column.kind() {
            DataKind::Int32 => Ok(i32::from_le_bytes(
                self.buffer.main[slot..slot + 4].try_into().expect("4 bytes"),
            )),
            _ => Err(kind_mismatch(name, "int")),
        }
    }

    fn read_long(&self, name: &str) -> Result<i64> {
        let (index, column) = self.column(name)?;
        let slot = self.slot(index);
        match column.kind() {
            DataKind::Int64 => Ok(i64::from_le_bytes(
                self.buffer.main[slot..slot + 8].try_into().expect("8 bytes"),
            )),
            _ => Err(kind_mismatch(name, "bigint")),
        }
    }

    fn read_float(&self, name: &str) -> Result<f32> {
        let (index, column) = self.column(name)?;
        let slot = self.slot(index);
        match column.kind() {
            DataKind::Float32 => Ok(f32::from_le_bytes(
                self.buffer.main[slot..slot + 4].try_into().expect("4 bytes"),
            )),
            _ => Err(kind_mismatch(name, "float")),
        }
    }

    fn read_double(&self, name: &str) -> Result<f64> {
        let (index, column) = self.column(name)?;
        let slot = self.slot(index);
        match column.kind() {
            DataKind::Float64 => Ok(f64::from_le_bytes(
                self.buffer.main[slot..slot + 8].try_into().expect("8 bytes"),
            )),
            _ => Err(kind_mismatch(name, "double")),
        }
    }

    fn read_string(&self, name: &str) -> Result<&str> {
        let (index, column) = self.column(name)?;
        match column.kind() {
            DataKind::String => Self::string_at(self.buffer, &self.buffer.main, self.slot(index)),
            _ => Err(kind_mismatch(name, "string")),
        }
    }

    fn read_list(&self, name: &str) -> Result<Box<dyn ListRead + '_>> {
        let (index, column) = self.column(name)?;
        match column.kind() {
            DataKind::List(item) => {
                let slot = self.slot(index);
                Ok(Box::new(FlatList {
                    buffer: self.buffer,
                    start: read_u32(&self.buffer.main, slot) as usize,
                    items: read_u32(&self.buffer.main, slot + 4) as usize,
                    kind: item,
                }))
            }
            _ => Err(kind_mismatch(name, "list")),
        }
    }

    fn read_map(&self, name: &str) -> Result<Box<dyn MapRead + '_>> {
        let (index, column) = self.column(name)?;
        match column.kind() {
            DataKind::Map(key_kind, value_kind) => {
                let slot = self.slot(index);
                Ok(Box::new(FlatMap {
                    keys: FlatList {
                        buffer: self.buffer,
                        start: read_u32(&self.buffer.main, slot) as usize,
                        items: read_u32(&self.buffer.main, slot + 4) as usize,
                        kind: key_kind,
                    },
                    values: FlatList {
                        buffer: self.buffer,
                        start: read_u32(&self.buffer.main, slot + 8) as usize,
                        items: read_u32(&self.buffer.main, slot + 12) as usize,
                        kind: value_kind,
                    },
                }))
            }
            _ => Err(kind_mismatch(name, "map")),
        }
    }
}

#[derive(Clone, Copy)]
struct FlatList<'a> {
    buffer: &'a FlatBuffer,
    start: usize,
    items: usize,
    kind: &'a DataKind,
}

impl<'a> FlatList<'a> {
    fn slot(&self, index: usize) -> Result<usize> {
        if index >= self.items {
            return Err(Error::InvalidArgumentError(format!(
                "list index {index} out of range ({} items)",
                self.items
            )));
        }
        let bitmap = self.items.div_ceil(8);
        Ok(self.start + bitmap + index * slot_width(self.kind))
    }

    fn expect(&self, index: usize, kind: &DataKind, expected: &str) -> Result<usize> {
        if self.kind != kind {
            return Err(Error::InvalidArgumentError(format!(
                "list element {index} is not a {expected}"
            )));
        }
        self.slot(index)
    }
}

impl ListRead for FlatList<'_> {
    fn items(&self) -> usize {
        self.items
    }

    fn is_null(&self, index: usize) -> bool {
        index >= self.items || self.buffer.aux[self.start + index / 8] & (1 << (index % 8)) != 0
    }

    fn read_bool(&self, index: usize) -> Result<bool> {
        let slot = self.expect(index, &DataKind::Bool, "bool")?;
        Ok(self.buffer.aux[slot] != 0)
    }

    fn read_byte(&self, index: usize) -> Result<i8> {
        let slot = self.expect(index, &DataKind::Int8, "tinyint")?;
        Ok(self.buffer.aux[slot] as i8)
    }

    fn read_short(&self, index: usize) -> Result<i16> {
        let slot = self.expect(index, &DataKind::Int16, "smallint")?;
        Ok(i16::from_le_bytes([
            self.buffer.aux[slot],
            self.buffer.aux[slot + 1],
        ]))
    }

    fn read_int(&self, index: usize) -> Result<i32> {
        let slot = self.expect(index, &DataKind::Int32, "int")?;
        Ok(i32::from_le_bytes(
            self.buffer.aux[slot..slot + 4].try_into().expect("4 bytes"),
        ))
    }

    fn read_long(&self, index: usize) -> Result<i64> {
        let slot = self.expect(index, &DataKind::Int64, "bigint")?;
        Ok(i64::from_le_bytes(
            self.buffer.aux[slot..slot + 8].try_into().expect("8 bytes"),
        ))
    }

    fn read_float(&self, index: usize) -> Result<f32> {
        let slot = self.expect(index, &DataKind::Float32, "float")?;
        Ok(f32::from_le_bytes(
            self.buffer.aux[slot..slot + 4].try_into().expect("4 bytes"),
        ))
    }

    fn read_double(&self, index: usize) -> Result<f64> {
        let slot = self.expect(index, &DataKind::Float64, "double")?;
        Ok(f64::from_le_bytes(
            self.buffer.aux[slot..slot + 8].try_into().expect("8 bytes"),
        ))
    }

    fn read_string(&self, index: usize) -> Result<&str> {
        let slot = self.expect(index, &DataKind::String, "string")?;
        FlatRow::string_at(self.buffer, &self.buffer.aux, slot)
    }
}

struct FlatMap<'a> {
    keys: FlatList<'a>,
    values: FlatList<'a>,
}

impl MapRead for FlatMap<'_> {
    fn entries(&self) -> usize {
        self.keys.items
    }

    fn keys(&self) -> Box<dyn ListRead + '_> {
        Box::new(self.keys)
    }

    fn values(&self) -> Box<dyn ListRead + '_> {
        Box::new(self.values)
    }
}
