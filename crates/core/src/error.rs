//! Error types for the task model.

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while validating or normalizing tasks.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A field holds a value outside its allowed range
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A wire record could not be normalized into a task
    #[error("malformed task record {id}: {field}: {reason}")]
    MalformedRecord {
        /// Record id as received
        id: String,
        /// Offending field name
        field: &'static str,
        /// Parser message
        reason: String,
    },
}

impl CoreError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(id: &str, field: &'static str, reason: impl ToString) -> Self {
        Self::MalformedRecord {
            id: id.to_string(),
            field,
            reason: reason.to_string(),
        }
    }
}
