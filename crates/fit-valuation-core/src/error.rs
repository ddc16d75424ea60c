use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unresolved rate for {technology}: {reason}")]
    UnresolvedRate { technology: String, reason: String },

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ValuationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(technology: impl ToString, reason: impl Into<String>) -> Self {
        ValuationError::UnresolvedRate {
            technology: technology.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the "no rate available" state, as opposed to bad input.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ValuationError::UnresolvedRate { .. })
    }
}

impl From<serde_json::Error> for ValuationError {
    fn from(e: serde_json::Error) -> Self {
        ValuationError::SerializationError(e.to_string())
    }
}
