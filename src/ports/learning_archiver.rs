//! Learning archiver port.
//!
//! When a member chooses `keep_learnings` during dissolution, an
//! anonymized extract of the couple's agreements (kind, themes, streak;
//! no user ids, no free text) is retained for future coaching. Each
//! member's extraction runs independently of the partner's choice.

use async_trait::async_trait;

use crate::domain::foundation::{CoupleId, DomainError, UserId};

/// Port for the anonymized-learning extraction.
#[async_trait]
pub trait LearningArchiver: Send + Sync {
    /// Extract and store anonymized learnings for one member's choice.
    ///
    /// Returns how many learning rows were written. Idempotency is not
    /// required; a duplicate run only duplicates anonymous rows.
    async fn archive_for_member(
        &self,
        couple_id: &CoupleId,
        requested_by: &UserId,
    ) -> Result<u32, DomainError>;
}
