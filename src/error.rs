//! Error types shared across the crate

use crate::dna::ValidationError;

/// Failures of the backing store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error of classification and statistics
#[derive(Debug, thiserror::Error)]
pub enum MutantError {
    #[error("invalid DNA: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("digest unavailable: {0}")]
    DigestUnavailable(String),

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl MutantError {
    /// Status code the transport reports for this error
    pub fn status(&self) -> u16 {
        match self {
            MutantError::InvalidInput(_) => 400,
            MutantError::DigestUnavailable(_) | MutantError::StoreUnavailable(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_message_is_not_doubled() {
        let err = MutantError::from(StoreError::Unavailable("disk gone".into()));
        assert_eq!(err.to_string(), "store unavailable: disk gone");
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_invalid_input_status() {
        let err = MutantError::from(ValidationError::Empty);
        assert_eq!(err.status(), 400);
        assert_eq!(err.to_string(), "invalid DNA: DNA is empty");
    }
}
