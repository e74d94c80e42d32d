use crate::error::Error;

/// Result type alias used throughout Basalt.
///
/// This is a type alias for `std::result::Result<T, Error>`, providing a
/// convenient shorthand for functions that return Basalt errors.
pub type Result<T> = std::result::Result<T, Error>;
