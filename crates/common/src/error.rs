//! Common error types and handling for TypeCraft

use uuid::Uuid;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the TypeCraft application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: i32, available: i32 },

    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Consistency fault: font {font} carries an unmatched debit of {debited}: {detail}")]
    ConsistencyFault {
        font: Uuid,
        debited: i32,
        detail: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    /// Get the error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            Error::LedgerUnavailable(_) => "LEDGER_UNAVAILABLE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidTransition(_) => "INVALID_TRANSITION",
            Error::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Error::ConsistencyFault { .. } => "CONSISTENCY_FAULT",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Whether the caller may safely re-invoke the failed operation from the
    /// top. A `ConsistencyFault` must never be retried automatically; it
    /// requires out-of-band reconciliation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::InsufficientCredits { .. }
                | Error::LedgerUnavailable(_)
                | Error::PersistenceFailure(_)
        )
    }

    /// Message suitable for showing to an end user.
    ///
    /// Business failures are actionable; a `ConsistencyFault` presents only a
    /// generic support message while the full detail goes to the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::InsufficientCredits {
                required,
                available,
            } => format!(
                "Insufficient credits. You need {} credits but have {}.",
                required, available
            ),
            Error::LedgerUnavailable(_) => {
                "The credit service is temporarily unavailable. Please try again.".to_string()
            }
            Error::PersistenceFailure(_) => {
                "Export failed. Your credits were not charged. Please try again.".to_string()
            }
            Error::ConsistencyFault { .. } => {
                "Something went wrong with your export. Please contact support.".to_string()
            }
            other => other.to_string(),
        }
    }
}
