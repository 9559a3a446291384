//! In-memory SuggestionRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{
    AgreementId, CoupleId, DomainError, ErrorCode, SuggestionId, SuggestionStatus, Timestamp,
    UserId,
};
use crate::domain::suggestion::Suggestion;
use crate::ports::SuggestionRepository;

/// In-memory SuggestionRepository with failure injection.
#[derive(Default)]
pub struct InMemorySuggestionRepository {
    suggestions: Mutex<HashMap<SuggestionId, Suggestion>>,
    fail_link: AtomicBool,
}

impl InMemorySuggestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `link_agreement` fail with a storage error.
    pub fn fail_link(&self, fail: bool) {
        self.fail_link.store(fail, Ordering::SeqCst);
    }

    /// Seed a suggestion directly.
    pub fn insert(&self, suggestion: Suggestion) {
        self.suggestions
            .lock()
            .expect("suggestions lock poisoned")
            .insert(*suggestion.id(), suggestion);
    }

    /// Current state of a suggestion, if present.
    pub fn get(&self, id: &SuggestionId) -> Option<Suggestion> {
        self.suggestions
            .lock()
            .expect("suggestions lock poisoned")
            .get(id)
            .cloned()
    }
}

/// Rebuilds a suggestion row with replaced resolution columns.
#[allow(clippy::too_many_arguments)]
fn rebuild(
    s: &Suggestion,
    status: SuggestionStatus,
    created_agreement_id: Option<AgreementId>,
    resolved_by: Option<UserId>,
    resolved_at: Option<Timestamp>,
) -> Suggestion {
    Suggestion::reconstitute(
        *s.id(),
        *s.couple_id(),
        s.session_id().copied(),
        s.title().to_string(),
        s.underlying_need().map(str::to_string),
        s.responsible(),
        status,
        created_agreement_id,
        resolved_by,
        resolved_at,
        *s.created_at(),
    )
}

#[async_trait]
impl SuggestionRepository for InMemorySuggestionRepository {
    async fn save(&self, suggestion: &Suggestion) -> Result<(), DomainError> {
        self.insert(suggestion.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SuggestionId) -> Result<Option<Suggestion>, DomainError> {
        Ok(self.get(id))
    }

    async fn list_pending(&self, couple_id: &CoupleId) -> Result<Vec<Suggestion>, DomainError> {
        let suggestions = self.suggestions.lock().expect("suggestions lock poisoned");
        let mut pending: Vec<Suggestion> = suggestions
            .values()
            .filter(|s| s.couple_id() == couple_id && s.status().is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|s| std::cmp::Reverse(*s.created_at()));
        Ok(pending)
    }

    async fn mark_accepted(
        &self,
        id: &SuggestionId,
        resolved_by: &UserId,
        at: &Timestamp,
    ) -> Result<bool, DomainError> {
        let mut suggestions = self.suggestions.lock().expect("suggestions lock poisoned");
        match suggestions.get(id) {
            Some(stored) if stored.status().is_pending() => {
                let updated = rebuild(
                    stored,
                    SuggestionStatus::Accepted,
                    stored.created_agreement_id().copied(),
                    Some(*resolved_by),
                    Some(*at),
                );
                suggestions.insert(*id, updated);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn link_agreement(
        &self,
        id: &SuggestionId,
        agreement_id: &AgreementId,
    ) -> Result<(), DomainError> {
        if self.fail_link.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated suggestion link failure",
            ));
        }
        let mut suggestions = self.suggestions.lock().expect("suggestions lock poisoned");
        match suggestions.get(id) {
            Some(stored) => {
                let updated = rebuild(
                    stored,
                    stored.status(),
                    Some(*agreement_id),
                    stored.resolved_by().copied(),
                    stored.resolved_at().copied(),
                );
                suggestions.insert(*id, updated);
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SuggestionNotFound,
                format!("Suggestion not found: {}", id),
            )),
        }
    }

    async fn revert_to_pending(&self, id: &SuggestionId) -> Result<(), DomainError> {
        let mut suggestions = self.suggestions.lock().expect("suggestions lock poisoned");
        if let Some(stored) = suggestions.get(id) {
            let updated = rebuild(stored, SuggestionStatus::Pending, None, None, None);
            suggestions.insert(*id, updated);
        }
        Ok(())
    }

    async fn mark_dismissed(
        &self,
        id: &SuggestionId,
        resolved_by: &UserId,
        at: &Timestamp,
    ) -> Result<bool, DomainError> {
        let mut suggestions = self.suggestions.lock().expect("suggestions lock poisoned");
        match suggestions.get(id) {
            Some(stored) if stored.status().is_pending() => {
                let updated = rebuild(
                    stored,
                    SuggestionStatus::Dismissed,
                    None,
                    Some(*resolved_by),
                    Some(*at),
                );
                suggestions.insert(*id, updated);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}
