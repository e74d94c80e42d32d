//! Record-batch-backed row source.
//!
//! Both file readers (CSV, Parquet) decode into Arrow `RecordBatch`es;
//! [`BatchSource`] flattens that stream into a lazy, finite, non-restartable
//! cursor of [`ArrowRow`] views. Row views borrow the current batch, so a
//! row is only valid until the cursor advances past its batch.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int8Array, Int16Array, Int32Array,
    Int64Array, ListArray, MapArray, StringArray,
};
use arrow::csv::reader::{Format, ReaderBuilder};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rustc_hash::FxHashMap;

use basalt_result::{Error, Result};
use basalt_types::row::{ListRead, MapRead, RowRead};
use basalt_types::schema::{DataKind, Schema};

fn to_arrow_kind(kind: &DataKind) -> Result<DataType> {
    Ok(match kind {
        DataKind::Bool => DataType::Boolean,
        DataKind::Int8 => DataType::Int8,
        DataKind::Int16 => DataType::Int16,
        DataKind::Int32 => DataType::Int32,
        DataKind::Int64 => DataType::Int64,
        DataKind::Float32 => DataType::Float32,
        DataKind::Float64 => DataType::Float64,
        DataKind::String => DataType::Utf8,
        DataKind::List(item) => {
            DataType::List(Arc::new(Field::new("item", to_arrow_kind(item)?, true)))
        }
        DataKind::Map(key, value) => {
            let entries = DataType::Struct(
                vec![
                    Field::new("keys", to_arrow_kind(key)?, false),
                    Field::new("values", to_arrow_kind(value)?, true),
                ]
                .into(),
            );
            DataType::Map(Arc::new(Field::new("entries", entries, false)), false)
        }
    })
}

type BatchIter = Box<dyn Iterator<Item = std::result::Result<RecordBatch, ArrowError>> + Send>;

/// Lazy row cursor over a stream of record batches.
pub struct BatchSource {
    batches: BatchIter,
    fields: FxHashMap<String, usize>,
    current: Option<RecordBatch>,
    position: usize,
}

impl BatchSource {
    /// Open a headerless, delimiter-separated file carrying exactly the
    /// given columns in declared order.
    ///
    /// Delimited text has no syntax for nested values, so compound columns
    /// are rejected up front.
    pub fn csv(path: &Path, delimiter: u8, schema: &Schema) -> Result<Self> {
        let mut fields = Vec::with_capacity(schema.len());
        for column in schema.columns() {
            if !column.kind().is_scalar() {
                return Err(Error::InvalidArgumentError(format!(
                    "column '{}': csv cannot carry {} values",
                    column.name(),
                    column.kind()
                )));
            }
            fields.push(Field::new(column.name(), to_arrow_kind(column.kind())?, true));
        }
        let arrow_schema: SchemaRef = Arc::new(ArrowSchema::new(fields));
        let format = Format::default()
            .with_header(false)
            .with_delimiter(delimiter);
        let reader = ReaderBuilder::new(Arc::clone(&arrow_schema))
            .with_format(format)
            .build(File::open(path)?)?;
        Ok(Self::from_batches(&arrow_schema, Box::new(reader)))
    }

    /// Open a Parquet file expected to carry at least the given columns.
    ///
    /// The expectation is the table's original (pre-`_time_`) schema; the
    /// file's own Arrow schema drives decoding.
    pub fn parquet(path: &Path, schema: &Schema) -> Result<Self> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
        let file_schema = Arc::clone(builder.schema());
        for column in schema.columns() {
            if file_schema.index_of(column.name()).is_err() {
                return Err(Error::InvalidArgumentError(format!(
                    "parquet file is missing column '{}'",
                    column.name()
                )));
            }
        }
        let reader = builder.build()?;
        Ok(Self::from_batches(&file_schema, Box::new(reader)))
    }

    fn from_batches(schema: &SchemaRef, batches: BatchIter) -> Self {
        let fields = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name().clone(), i))
            .collect();
        Self {
            batches,
            fields,
            current: None,
            position: 0,
        }
    }

    /// Advance to the next row; `None` when the source is exhausted.
    pub fn next_row(&mut self) -> Result<Option<ArrowRow<'_>>> {
        loop {
            let remaining = self
                .current
                .as_ref()
                .is_some_and(|batch| self.position < batch.num_rows());
            if remaining {
                break;
            }
            match self.batches.next() {
                Some(batch) => {
                    self.current = Some(batch?);
                    self.position = 0;
                }
                None => {
                    self.current = None;
                    return Ok(None);
                }
            }
        }
        let Some(batch) = self.current.as_ref() else {
            return Ok(None);
        };
        let row = ArrowRow {
            batch,
            index: self.position,
            fields: &self.fields,
        };
        self.position += 1;
        Ok(Some(row))
    }
}

/// Read view of one row inside a record batch.
pub struct ArrowRow<'a> {
    batch: &'a RecordBatch,
    index: usize,
    fields: &'a FxHashMap<String, usize>,
}

impl ArrowRow<'_> {
    fn typed<A: Array + 'static>(&self, name: &str, expected: &str) -> Result<&A> {
        let index = self.fields.get(name).ok_or(Error::NotFound)?;
        self.batch
            .column(*index)
            .as_any()
            .downcast_ref::<A>()
            .ok_or_else(|| {
                Error::InvalidArgumentError(format!("column '{name}' is not a {expected}"))
            })
    }
}

impl RowRead for ArrowRow<'_> {
    fn is_null(&self, name: &str) -> bool {
        match self.fields.get(name) {
            Some(&index) => self.batch.column(index).is_null(self.index),
            None => true,
        }
    }

    fn read_bool(&self, name: &str) -> Result<bool> {
        Ok(self.typed::<BooleanArray>(name, "bool")?.value(self.index))
    }

    fn read_byte(&self, name: &str) -> Result<i8> {
        Ok(self.typed::<Int8Array>(name, "tinyint")?.value(self.index))
    }

    fn read_short(&self, name: &str) -> Result<i16> {
        Ok(self.typed::<Int16Array>(name, "smallint")?.value(self.index))
    }

    fn read_int(&self, name: &str) -> Result<i32> {
        Ok(self.typed::<Int32Array>(name, "int")?.value(self.index))
    }

    fn read_long(&self, name: &str) -> Result<i64> {
        Ok(self.typed::<Int64Array>(name, "bigint")?.value(self.index))
    }

    fn read_float(&self, name: &str) -> Result<f32> {
        Ok(self.typed::<Float32Array>(name, "float")?.value(self.index))
    }

    fn read_double(&self, name: &str) -> Result<f64> {
        Ok(self.typed::<Float64Array>(name, "double")?.value(self.index))
    }

    fn read_string(&self, name: &str) -> Result<&str> {
        Ok(self.typed::<StringArray>(name, "string")?.value(self.index))
    }

    fn read_list(&self, name: &str) -> Result<Box<dyn ListRead + '_>> {
        let list = self.typed::<ListArray>(name, "list")?;
        Ok(Box::new(ArrowList {
            values: list.value(self.index),
        }))
    }

    fn read_map(&self, name: &str) -> Result<Box<dyn MapRead + '_>> {
        let map = self.typed::<MapArray>(name, "map")?;
        let offsets = map.value_offsets();
        let start = offsets[self.index] as usize;
        let length = offsets[self.index + 1] as usize - start;
        Ok(Box::new(ArrowMap {
            keys: map.keys().slice(start, length),
            values: map.values().slice(start, length),
        }))
    }
}

/// List view owning an `Arc`'d element array.
struct ArrowList {
    values: ArrayRef,
}

impl ArrowList {
    fn typed<A: Array + 'static>(&self, index: usize, expected: &str) -> Result<&A> {
        if index >= self.values.len() {
            return Err(Error::InvalidArgumentError(format!(
                "list index {index} out of range ({} items)",
                self.values.len()
            )));
        }
        self.values.as_any().downcast_ref::<A>().ok_or_else(|| {
            Error::InvalidArgumentError(format!("list element {index} is not a {expected}"))
        })
    }
}

impl ListRead for ArrowList {
    fn items(&self) -> usize {
        self.values.len()
    }

    fn is_null(&self, index: usize) -> bool {
        index >= self.values.len() || self.values.is_null(index)
    }

    fn read_bool(&self, index: usize) -> Result<bool> {
        Ok(self.typed::<BooleanArray>(index, "bool")?.value(index))
    }

    fn read_byte(&self, index: usize) -> Result<i8> {
        Ok(self.typed::<Int8Array>(index, "tinyint")?.value(index))
    }

    fn read_short(&self, index: usize) -> Result<i16> {
        Ok(self.typed::<Int16Array>(index, "smallint")?.value(index))
    }

    fn read_int(&self, index: usize) -> Result<i32> {
        Ok(self.typed::<Int32Array>(index, "int")?.value(index))
    }

    fn read_long(&self, index: usize) -> Result<i64> {
        Ok(self.typed::<Int64Array>(index, "bigint")?.value(index))
    }

    fn read_float(&self, index: usize) -> Result<f32> {
        Ok(self.typed::<Float32Array>(index, "float")?.value(index))
    }

    fn read_double(&self, index: usize) -> Result<f64> {
        Ok(self.typed::<Float64Array>(index, "double")?.value(index))
    }

    fn read_string(&self, index: usize) -> Result<&str> {
        Ok(self.typed::<StringArray>(index, "string")?.value(index))
    }
}

struct ArrowMap {
    keys: ArrayRef,
    values: ArrayRef,
}

impl MapRead for ArrowMap {
    fn entries(&self) -> usize {
        self.keys.len()
    }

    fn keys(&self) -> Box<dyn ListRead + '_> {
        Box::new(ArrowList {
            values: Arc::clone(&self.keys),
        })
    }

    fn values(&self) -> Box<dyn ListRead + '_> {
        Box::new(ArrowList {
            values: Arc::clone(&self.values),
        })
    }
}
