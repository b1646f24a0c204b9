//! Error types for kernel backends.

use thiserror::Error;

/// Errors raised by a geometry kernel backend.
#[derive(Error, Debug)]
pub enum KernelError {
    /// A call referenced an entity tag the kernel never created.
    #[error("unknown {kind} tag {tag}")]
    UnknownTag {
        /// Entity kind ("point", "curve", ...).
        kind: &'static str,
        /// The offending tag.
        tag: i32,
    },

    /// A curve loop does not close head-to-tail.
    #[error("curve loop is not closed: {0}")]
    OpenLoop(String),

    /// Degenerate geometry (zero-length line, empty loop).
    #[error("degenerate entity: {0}")]
    Degenerate(String),

    /// The kernel rejected an otherwise well-formed operation.
    #[error("kernel rejected operation: {0}")]
    Rejected(String),

    /// Underlying I/O failure while serializing output.
    #[error("kernel i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
