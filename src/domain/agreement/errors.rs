//! Agreement-specific error types.

use crate::domain::foundation::{AgreementId, CoupleId, DomainError, ErrorCode};

/// Errors surfaced by agreement and check-in operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementError {
    /// Agreement was not found.
    NotFound(AgreementId),
    /// The couple scope named by the request does not exist.
    CoupleNotFound(CoupleId),
    /// User is not a couple member or not the responsible party.
    Forbidden,
    /// Operation requires an active agreement.
    NotActive,
    /// Invalid lifecycle transition.
    InvalidState(String),
    /// The row changed under us; the requested transition is stale.
    StaleTransition,
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl AgreementError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        AgreementError::InvalidState(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AgreementError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        AgreementError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AgreementError::NotFound(_) => ErrorCode::AgreementNotFound,
            AgreementError::CoupleNotFound(_) => ErrorCode::CoupleNotFound,
            AgreementError::Forbidden => ErrorCode::Forbidden,
            AgreementError::NotActive => ErrorCode::NotActive,
            AgreementError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            AgreementError::StaleTransition => ErrorCode::StaleTransition,
            AgreementError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AgreementError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AgreementError::NotFound(id) => format!("Agreement not found: {}", id),
            AgreementError::CoupleNotFound(id) => format!("Couple not found: {}", id),
            AgreementError::Forbidden => "Permission denied".to_string(),
            AgreementError::NotActive => "Agreement is not active".to_string(),
            AgreementError::InvalidState(msg) => format!("Invalid state: {}", msg),
            AgreementError::StaleTransition => {
                "Agreement changed concurrently; please retry".to_string()
            }
            AgreementError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            AgreementError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for AgreementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AgreementError {}

impl From<DomainError> for AgreementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::Unauthorized => AgreementError::Forbidden,
            ErrorCode::NotActive => AgreementError::NotActive,
            ErrorCode::StaleTransition => AgreementError::StaleTransition,
            ErrorCode::InvalidStateTransition => AgreementError::InvalidState(err.to_string()),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => AgreementError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => AgreementError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(AgreementError::NotActive.code(), ErrorCode::NotActive);
        assert_eq!(
            AgreementError::StaleTransition.code(),
            ErrorCode::StaleTransition
        );
    }

    #[test]
    fn not_active_domain_error_maps_through() {
        let err: AgreementError =
            DomainError::new(ErrorCode::NotActive, "Agreement is paused").into();
        assert_eq!(err, AgreementError::NotActive);
    }
}
