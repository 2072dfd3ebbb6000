//! Error types shared across the crate.
use thiserror::Error;

/// Errors raised by the network, the codec and the session.
///
/// `DimensionMismatch` and `StatePrecondition` indicate misuse of the API and
/// are meant to propagate. `InvalidModelFormat` is recoverable: the caller
/// keeps its previous model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Backward pass requires a preceding forward pass: {0}")]
    StatePrecondition(String),

    #[error("Invalid model format: {0}")]
    InvalidModelFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Update produced non-finite parameters in {0}")]
    NonFiniteParameters(&'static str),
}

pub type Result<T> = std::result::Result<T, NetworkError>;

impl NetworkError {
    pub(crate) fn dims(what: &str, expected: usize, got: usize) -> Self {
        NetworkError::DimensionMismatch(format!("{}: expected {}, got {}", what, expected, got))
    }

    /// True for the programming-error class (shape or call-order misuse).
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            NetworkError::DimensionMismatch(_) | NetworkError::StatePrecondition(_)
        )
    }
}
