use crate::error::Error;

/// Result type alias used throughout spandb.
pub type Result<T> = std::result::Result<T, Error>;
