//! Suggestion repository port.

use async_trait::async_trait;

use crate::domain::foundation::{
    AgreementId, CoupleId, DomainError, SuggestionId, Timestamp, UserId,
};
use crate::domain::suggestion::Suggestion;

/// Repository port for suggestion persistence.
///
/// Resolution methods are compare-and-set on `pending` so that two
/// racing accepts (or an accept racing a dismiss) resolve the
/// suggestion exactly once.
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// Save a freshly ingested suggestion.
    async fn save(&self, suggestion: &Suggestion) -> Result<(), DomainError>;

    /// Find a suggestion by its ID.
    async fn find_by_id(&self, id: &SuggestionId) -> Result<Option<Suggestion>, DomainError>;

    /// Pending suggestions for a couple, newest first.
    async fn list_pending(&self, couple_id: &CoupleId) -> Result<Vec<Suggestion>, DomainError>;

    /// Claim the suggestion for acceptance: `pending -> accepted`,
    /// recording who resolved it. Returns `false` when it was no longer
    /// pending.
    async fn mark_accepted(
        &self,
        id: &SuggestionId,
        resolved_by: &UserId,
        at: &Timestamp,
    ) -> Result<bool, DomainError>;

    /// Link the agreement created from an accepted suggestion.
    async fn link_agreement(
        &self,
        id: &SuggestionId,
        agreement_id: &AgreementId,
    ) -> Result<(), DomainError>;

    /// Revert a claimed suggestion to pending (compensation when
    /// agreement creation fails after the claim).
    async fn revert_to_pending(&self, id: &SuggestionId) -> Result<(), DomainError>;

    /// Resolve the suggestion as dismissed: `pending -> dismissed`.
    /// Returns `false` when it was no longer pending.
    async fn mark_dismissed(
        &self,
        id: &SuggestionId,
        resolved_by: &UserId,
        at: &Timestamp,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SuggestionRepository) {}
    }
}
