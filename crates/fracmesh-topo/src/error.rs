//! Error types for the topology crate.

use thiserror::Error;

/// Errors raised before any kernel call.
#[derive(Error, Debug)]
pub enum TopoError {
    /// Physically invalid build parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The static schema violates an incidence invariant. This is a
    /// programming defect, not a runtime condition to recover from.
    #[error("inconsistent topology schema: {0}")]
    Inconsistent(String),
}
