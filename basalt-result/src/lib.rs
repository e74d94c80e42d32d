//! Error types and result definitions for the Basalt ingestion engine.
//!
//! This crate provides the unified error type ([`Error`]) and result type alias
//! ([`Result<T>`]) used throughout all Basalt crates. All operations that could
//! fail return `Result<T>`, where the error variant carries enough context to
//! diagnose what went wrong.
//!
//! # Error Philosophy
//!
//! Basalt uses a single error enum rather than crate-specific error types.
//! This approach:
//! - Simplifies error handling across crate boundaries
//! - Allows errors to propagate naturally with the `?` operator
//! - Enables structured error matching at the ingestion boundary, where every
//!   recoverable failure collapses into a boolean work-unit outcome
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): file access, temp-file staging, reads
//! - **Data format errors** ([`Error::Arrow`], [`Error::Parquet`]): reader
//!   construction and record-batch decoding
//! - **User input errors** ([`Error::InvalidArgumentError`]): bad specs,
//!   unknown loaders, unsupported formats, malformed schema text
//! - **Lookup failures** ([`Error::NotFound`]): missing tables or columns
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
