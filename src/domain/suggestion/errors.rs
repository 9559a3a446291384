//! Suggestion-specific error types.

use crate::domain::foundation::{CoupleId, DomainError, ErrorCode, SuggestionId};

/// Errors surfaced by suggestion intake operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionError {
    /// Suggestion was not found.
    NotFound(SuggestionId),
    /// The couple scope named by the request does not exist.
    CoupleNotFound(CoupleId),
    /// The suggestion has already been accepted or dismissed.
    AlreadyResolved,
    /// Caller's party does not match the responsible field, or the
    /// caller is not a couple member.
    Forbidden,
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl SuggestionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SuggestionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SuggestionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SuggestionError::NotFound(_) => ErrorCode::SuggestionNotFound,
            SuggestionError::CoupleNotFound(_) => ErrorCode::CoupleNotFound,
            SuggestionError::AlreadyResolved => ErrorCode::AlreadyResolved,
            SuggestionError::Forbidden => ErrorCode::Forbidden,
            SuggestionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SuggestionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SuggestionError::NotFound(id) => format!("Suggestion not found: {}", id),
            SuggestionError::CoupleNotFound(id) => format!("Couple not found: {}", id),
            SuggestionError::AlreadyResolved => {
                "Suggestion has already been resolved".to_string()
            }
            SuggestionError::Forbidden => "Permission denied".to_string(),
            SuggestionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SuggestionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SuggestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SuggestionError {}

impl From<DomainError> for SuggestionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AlreadyResolved => SuggestionError::AlreadyResolved,
            ErrorCode::Forbidden | ErrorCode::Unauthorized => SuggestionError::Forbidden,
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => SuggestionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => SuggestionError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(
            SuggestionError::AlreadyResolved.code(),
            ErrorCode::AlreadyResolved
        );
        assert_eq!(SuggestionError::Forbidden.code(), ErrorCode::Forbidden);
    }
}
