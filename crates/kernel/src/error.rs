//! Error type shared by the kernel's fallible constructors and queries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("matrix is singular (determinant {determinant})")]
    SingularMatrix { determinant: f64 },

    #[error("{what} must not be a zero-length vector")]
    ZeroLengthVector { what: &'static str },

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("{kind} is not present in the scene store")]
    MissingEntity { kind: &'static str },

    #[error("viewport has no area ({width}x{height})")]
    EmptyViewport { width: f64, height: f64 },

    #[error("scene serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
