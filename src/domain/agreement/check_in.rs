//! Check-in entity - an append-only self-report against an agreement.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AgreementId, CheckInId, CheckInStatus, DomainError, Timestamp, UserId,
};

/// Maximum length for the free-text reflection fields.
const MAX_NOTE_LENGTH: usize = 2000;

/// A single check-in report. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: CheckInId,
    pub agreement_id: AgreementId,
    pub reported_by: UserId,
    pub status: CheckInStatus,
    pub what_worked: Option<String>,
    pub what_was_hard: Option<String>,
    pub created_at: Timestamp,
}

impl CheckIn {
    /// Creates a new check-in report.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if a note exceeds the length cap
    pub fn new(
        id: CheckInId,
        agreement_id: AgreementId,
        reported_by: UserId,
        status: CheckInStatus,
        what_worked: Option<String>,
        what_was_hard: Option<String>,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        for (field, note) in [("what_worked", &what_worked), ("what_was_hard", &what_was_hard)] {
            if let Some(text) = note {
                if text.len() > MAX_NOTE_LENGTH {
                    return Err(DomainError::validation(
                        field,
                        format!("Note must be {} characters or less", MAX_NOTE_LENGTH),
                    ));
                }
            }
        }

        Ok(Self {
            id,
            agreement_id,
            reported_by,
            status,
            what_worked,
            what_was_hard,
            created_at,
        })
    }
}
