//! The service's error kinds (§7): a closed enumeration reported to external callers,
//! plus the log-and-skip convention detectors use for per-call-site failures.
//!
//! Grounded on `hir/src/ir/symbols.rs`'s `InvalidSymbolRefError`: a `thiserror`-derived
//! enum with one `#[error("...")]` message per variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("data loss: {0}")]
    DataLoss(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// An internal invariant breach. Fatal for the current analysis run; §4's "Failure
    /// semantics summary" calls this "surfaced as a distinguished error" rather than
    /// absorbed like per-call-site detector failures.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
