//! IngestSuggestionHandler - records a candidate agreement from the
//! analysis collaborator.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{
    CoupleId, EventId, ResponsibleParty, SerializableDomainEvent, SessionId, SuggestionId,
    Timestamp,
};
use crate::domain::suggestion::{NewSuggestion, Suggestion, SuggestionError, SuggestionReceived};
use crate::ports::{CoupleRepository, EventPublisher, SuggestionRepository};

/// Command to ingest a suggestion. The caller is the analysis
/// collaborator, not a couple member, so there is no actor id here.
#[derive(Debug, Clone)]
pub struct IngestSuggestionCommand {
    pub couple_id: CoupleId,
    pub session_id: Option<SessionId>,
    pub title: String,
    pub underlying_need: Option<String>,
    pub responsible: ResponsibleParty,
}

/// Handler for ingesting suggestions.
pub struct IngestSuggestionHandler {
    couples: Arc<dyn CoupleRepository>,
    suggestions: Arc<dyn SuggestionRepository>,
    events: Arc<dyn EventPublisher>,
}

impl IngestSuggestionHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        suggestions: Arc<dyn SuggestionRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            suggestions,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: IngestSuggestionCommand,
    ) -> Result<Suggestion, SuggestionError> {
        self.couples
            .find_by_id(&cmd.couple_id)
            .await?
            .ok_or(SuggestionError::CoupleNotFound(cmd.couple_id))?;

        let suggestion = Suggestion::receive(
            SuggestionId::new(),
            NewSuggestion {
                couple_id: cmd.couple_id,
                session_id: cmd.session_id,
                title: cmd.title,
                underlying_need: cmd.underlying_need,
                responsible: cmd.responsible,
            },
        )?;

        self.suggestions.save(&suggestion).await?;

        let envelope = SuggestionReceived {
            event_id: EventId::new(),
            suggestion_id: *suggestion.id(),
            couple_id: cmd.couple_id,
            occurred_at: Timestamp::now(),
        }
        .to_envelope();
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish suggestion.received");
        }

        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryCoupleRepository, InMemorySuggestionRepository};
    use crate::domain::couple::Couple;
    use crate::domain::foundation::{SuggestionStatus, UserId};

    #[tokio::test]
    async fn ingest_stores_a_pending_suggestion() {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let suggestions = Arc::new(InMemorySuggestionRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let couple = Couple::form(CoupleId::new(), UserId::new(), UserId::new()).unwrap();
        couples.insert(couple.clone());

        let handler = IngestSuggestionHandler::new(couples, suggestions.clone(), events.clone());
        let suggestion = handler
            .handle(IngestSuggestionCommand {
                couple_id: *couple.id(),
                session_id: Some(SessionId::new()),
                title: "Trade cooking nights".to_string(),
                underlying_need: Some("fairness".to_string()),
                responsible: ResponsibleParty::Both,
            })
            .await
            .unwrap();

        assert_eq!(suggestion.status(), SuggestionStatus::Pending);
        assert!(suggestions.get(suggestion.id()).is_some());
        assert!(events.has_event("suggestion.received"));
    }

    #[tokio::test]
    async fn unknown_couple_is_rejected() {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let suggestions = Arc::new(InMemorySuggestionRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let handler = IngestSuggestionHandler::new(couples, suggestions, events);
        let result = handler
            .handle(IngestSuggestionCommand {
                couple_id: CoupleId::new(),
                session_id: None,
                title: "Anything".to_string(),
                underlying_need: None,
                responsible: ResponsibleParty::Both,
            })
            .await;
        assert!(matches!(result, Err(SuggestionError::CoupleNotFound(_))));
    }
}
