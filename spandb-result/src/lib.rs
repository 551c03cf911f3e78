//! Error types and result definitions for the spandb trace store.
//!
//! Every spandb crate returns [`Result<T>`], whose error variant is the single
//! workspace-wide [`Error`] enum. Errors propagate with `?` across crate
//! boundaries and callers match on variants when they need to distinguish
//! failure classes.
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`], [`Error::BlockIo`]): sidecar fetches, page
//!   reads, row seeks. `BlockIo` carries the blob name plus tenant and block
//!   identifiers.
//! - **Cancellation** ([`Error::Cancelled`]): an explicit cancel or an expired
//!   deadline. Always surfaced as this one variant, never as a plain I/O
//!   failure.
//! - **Corruption** ([`Error::Corruption`]): a bloom shard or row group that
//!   fails to decode, an empty row group, a missing required column. Fatal for
//!   the call.
//! - **Invariant violations** ([`Error::Invariant`]): programmer bugs such as
//!   reference-count underflow. These also trap in debug builds at the point
//!   of detection.
//! - **Query errors** ([`Error::QueryInvalid`], [`Error::QueryRuntime`]): the
//!   first from semantic validation (carries the offending subtree), the
//!   second from evaluation paths that a passing validator should have made
//!   unreachable.
//!
//! Absence is not an error: a trace id that is not stored in a block yields
//! `Ok(None)` from the lookup path.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
