//! Centralized error types for the txguard workspace.

use thiserror::Error;

/// Top-level error enum. Variants map to pipeline stages.
///
/// Only `InvalidInput`, `Resolution` and `Provider` (during hash lookup)
/// abort an analysis. Simulation and explanation failures are absorbed by
/// the pipeline and surface as data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GuardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction not found: {0}")]
    Resolution(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Explanation unavailable: {0}")]
    Explanation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_stage_prefix() {
        let err = GuardError::Resolution("0xabc".into());
        assert_eq!(err.to_string(), "Transaction not found: 0xabc");

        let err = GuardError::InvalidInput("no input shape".into());
        assert!(err.to_string().starts_with("Invalid input"));
    }
}
