//! Couple-specific error types.

use crate::domain::foundation::{CoupleId, DomainError, ErrorCode, UserId};

/// Errors surfaced by pairing and dissolution operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoupleError {
    /// Couple was not found.
    NotFound(CoupleId),
    /// No profile exists for this user id.
    UnknownUser(UserId),
    /// The actor has no active couple.
    NotInCouple,
    /// One of the parties already belongs to a couple.
    AlreadyPaired,
    /// The code is unknown, used, expired, or the redeemer's own.
    InvalidOrExpiredCode,
    /// User is not a member of the couple.
    Forbidden,
    /// Invalid state for operation.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl CoupleError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoupleError::InvalidState(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoupleError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CoupleError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CoupleError::NotFound(_) => ErrorCode::CoupleNotFound,
            CoupleError::UnknownUser(_) => ErrorCode::ProfileNotFound,
            CoupleError::NotInCouple => ErrorCode::NotInCouple,
            CoupleError::AlreadyPaired => ErrorCode::AlreadyPaired,
            CoupleError::InvalidOrExpiredCode => ErrorCode::InvalidOrExpiredCode,
            CoupleError::Forbidden => ErrorCode::Forbidden,
            CoupleError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            CoupleError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CoupleError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CoupleError::NotFound(id) => format!("Couple not found: {}", id),
            CoupleError::UnknownUser(id) => format!("Unknown user: {}", id),
            CoupleError::NotInCouple => "You are not part of a couple".to_string(),
            CoupleError::AlreadyPaired => "Already paired with a partner".to_string(),
            CoupleError::InvalidOrExpiredCode => "Invalid or expired invite code".to_string(),
            CoupleError::Forbidden => "Permission denied".to_string(),
            CoupleError::InvalidState(msg) => format!("Invalid state: {}", msg),
            CoupleError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CoupleError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for CoupleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CoupleError {}

impl From<DomainError> for CoupleError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::CoupleNotFound => CoupleError::NotInCouple,
            ErrorCode::NotInCouple => CoupleError::NotInCouple,
            ErrorCode::AlreadyPaired => CoupleError::AlreadyPaired,
            ErrorCode::InvalidOrExpiredCode => CoupleError::InvalidOrExpiredCode,
            ErrorCode::Forbidden | ErrorCode::Unauthorized => CoupleError::Forbidden,
            ErrorCode::InvalidStateTransition | ErrorCode::StaleTransition => {
                CoupleError::InvalidState(err.to_string())
            }
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => CoupleError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => CoupleError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(CoupleError::AlreadyPaired.code(), ErrorCode::AlreadyPaired);
        assert_eq!(
            CoupleError::InvalidOrExpiredCode.code(),
            ErrorCode::InvalidOrExpiredCode
        );
        assert_eq!(CoupleError::NotInCouple.code(), ErrorCode::NotInCouple);
    }

    #[test]
    fn domain_error_maps_validation_with_field_detail() {
        let err: CoupleError = DomainError::validation("code", "bad format").into();
        match err {
            CoupleError::ValidationFailed { field, .. } => assert_eq!(field, "code"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
