use thiserror::Error;

#[derive(Debug, Error)]
pub enum BessFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BessFinanceError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BessFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for BessFinanceError {
    fn from(e: serde_json::Error) -> Self {
        BessFinanceError::SerializationError(e.to_string())
    }
}
