use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all spandb operations.
///
/// The lookup and query engines surface a small, fixed set of failure kinds.
/// Retry policy lives with the caller; nothing in the core retries I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during a storage operation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// I/O error reading a named block sidecar, with tenant and block context.
    #[error("error reading {name} (tenant {tenant}, block {block}): {source}")]
    BlockIo {
        name: String,
        tenant: String,
        block: String,
        #[source]
        source: io::Error,
    },

    /// The caller cancelled the operation or its deadline expired.
    #[error("operation cancelled")]
    Cancelled,

    /// Stored data that cannot be decoded or contradicts block metadata.
    ///
    /// Bloom shards that fail to deserialize, row groups reporting zero rows,
    /// a missing trace-id column, or a row that does not decode into a trace
    /// all land here. Corruption is fatal for the call.
    #[error("corrupt block: {0}")]
    Corruption(String),

    /// A violated internal invariant. Indicates a bug, not bad data.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Semantic validation rejected the query expression tree.
    ///
    /// The message carries the stringified offending subtree.
    #[error("invalid query: {0}")]
    QueryInvalid(String),

    /// Evaluation failed in a way a passing validator should have prevented.
    ///
    /// Callers treat this like corruption: loud and fatal for the call.
    #[error("query runtime error: {0}")]
    QueryRuntime(String),

    /// Invalid user input or API parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error indicating a bug or unexpected state.
    #[error("an internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a [`Error::Corruption`] from any displayable error.
    #[inline]
    pub fn corruption<E: fmt::Display>(err: E) -> Self {
        Error::Corruption(err.to_string())
    }

    /// Create a [`Error::BlockIo`] wrapping `source` with block context.
    #[inline]
    pub fn block_io(
        name: impl Into<String>,
        tenant: impl Into<String>,
        block: impl Into<String>,
        source: io::Error,
    ) -> Self {
        Error::BlockIo {
            name: name.into(),
            tenant: tenant.into(),
            block: block.into(),
            source,
        }
    }

    /// Create a [`Error::QueryRuntime`] from any displayable error.
    #[inline]
    pub fn query_runtime<E: fmt::Display>(err: E) -> Self {
        Error::QueryRuntime(err.to_string())
    }
}
