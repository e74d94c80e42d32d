use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all Basalt operations.
///
/// Errors propagate upward through the call stack using Rust's `?` operator.
/// At the ingestion boundary (`IngestSpec::work`) every error is logged and
/// reported as a boolean failure; internal code can match on specific
/// variants for fine-grained handling.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file access or temp-file staging.
    ///
    /// Wraps standard library I/O errors: opening source files, copying
    /// remote objects to local temp files, reading mid-stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error during columnar data operations.
    ///
    /// Raised while constructing CSV readers, decoding record batches, or
    /// building arrays from row data.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while opening or decoding a Parquet file.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Invalid user input or API parameter.
    ///
    /// Covers malformed schema text, unknown loaders, unsupported file
    /// formats, unsupported data sources, type mismatches on row reads, and
    /// out-of-range accesses. These errors are recoverable: fix the spec or
    /// the call and retry.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A named table or column was not found.
    #[error("Not found")]
    NotFound,

    /// Internal error indicating a bug or unexpected state.
    ///
    /// This should never occur during normal operation: violated invariants
    /// (e.g. rollback on an empty buffer), arena cursor overflow, or logic
    /// errors in Basalt itself.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid-argument error from any displayable value.
    #[inline]
    pub fn invalid_argument<E: fmt::Display>(err: E) -> Self {
        Error::InvalidArgumentError(err.to_string())
    }

    /// Create an internal error from any displayable value.
    #[inline]
    pub fn internal<E: fmt::Display>(err: E) -> Self {
        Error::Internal(err.to_string())
    }
}
