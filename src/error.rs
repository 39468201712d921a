//! Error taxonomy for graph construction and archive round-trips

use thiserror::Error;

/// Errors returned by graph construction, queries, and archive I/O.
///
/// Construction errors are recoverable: fix the inputs and retry. Archive
/// errors are fatal for the attempted load; there is no partial success.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Shape, rank, length, or device violation at construction time
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Leading magic number of the archive does not identify this format
    #[error("format mismatch: magic number {found:#018x}, expected {expected:#018x}")]
    FormatMismatch {
        /// Value actually read from the archive
        found: i64,
        /// The format's magic constant
        expected: i64,
    },

    /// An expected archive field was absent, out of order, or ill-typed
    #[error("missing field: {0}")]
    MissingField(String),

    /// Underlying archive read or write failed
    #[error("archive I/O: {0}")]
    Io(#[from] std::io::Error),
}
