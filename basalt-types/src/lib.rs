//! Core data types for the Basalt ingestion engine.
//!
//! This crate hosts the schema tree ([`Schema`], [`Column`], [`DataKind`])
//! with its text serde, the row capability traits ([`RowRead`], [`ListRead`],
//! [`MapRead`]) every row source implements, and the owned [`Value`] /
//! [`ValueRow`] row used for synthetic data and tests.

pub mod reserved;
pub mod row;
pub mod schema;
pub mod value;

pub use reserved::TIME_COLUMN;
pub use row::{ListRead, MapRead, RowRead};
pub use schema::{Column, DataKind, Schema};
pub use value::{Value, ValueRow};
