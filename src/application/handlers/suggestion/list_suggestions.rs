//! ListSuggestionsHandler - pending suggestions for a couple.

use std::sync::Arc;

use crate::domain::foundation::{CoupleId, UserId};
use crate::domain::suggestion::{Suggestion, SuggestionError};
use crate::ports::{CoupleRepository, SuggestionRepository};

/// Query for a couple's pending suggestions.
#[derive(Debug, Clone)]
pub struct ListSuggestionsQuery {
    pub couple_id: CoupleId,
    pub user_id: UserId,
}

/// One suggestion with the caller's acceptance eligibility precomputed,
/// so the UI can show "waiting on partner" without a failed request.
#[derive(Debug, Clone)]
pub struct SuggestionListItem {
    pub suggestion: Suggestion,
    pub can_accept: bool,
}

/// A couple's pending suggestions.
#[derive(Debug, Clone)]
pub struct SuggestionList {
    pub items: Vec<SuggestionListItem>,
}

/// Handler for listing pending suggestions.
pub struct ListSuggestionsHandler {
    couples: Arc<dyn CoupleRepository>,
    suggestions: Arc<dyn SuggestionRepository>,
}

impl ListSuggestionsHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        suggestions: Arc<dyn SuggestionRepository>,
    ) -> Self {
        Self {
            couples,
            suggestions,
        }
    }

    pub async fn handle(
        &self,
        query: ListSuggestionsQuery,
    ) -> Result<SuggestionList, SuggestionError> {
        let couple = self
            .couples
            .find_by_id(&query.couple_id)
            .await?
            .ok_or(SuggestionError::CoupleNotFound(query.couple_id))?;
        couple.authorize_member(&query.user_id)?;

        let pending = self.suggestions.list_pending(&query.couple_id).await?;
        let items = pending
            .into_iter()
            .map(|suggestion| {
                let can_accept = suggestion.can_be_accepted_by(&query.user_id, &couple);
                SuggestionListItem {
                    suggestion,
                    can_accept,
                }
            })
            .collect();

        Ok(SuggestionList { items })
    }
}
