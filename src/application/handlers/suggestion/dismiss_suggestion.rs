//! DismissSuggestionHandler - declines a pending suggestion.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{
    CommandMetadata, EventId, SerializableDomainEvent, SuggestionId, Timestamp, UserId,
};
use crate::domain::suggestion::{SuggestionDismissed, SuggestionError};
use crate::ports::{CoupleRepository, EventPublisher, SuggestionRepository};

/// Command to dismiss a suggestion.
#[derive(Debug, Clone)]
pub struct DismissSuggestionCommand {
    pub suggestion_id: SuggestionId,
    pub user_id: UserId,
}

/// Handler for dismissing suggestions. Either couple member may
/// dismiss, regardless of the suggestion's responsible party.
pub struct DismissSuggestionHandler {
    couples: Arc<dyn CoupleRepository>,
    suggestions: Arc<dyn SuggestionRepository>,
    events: Arc<dyn EventPublisher>,
}

impl DismissSuggestionHandler {
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
        cmd: DismissSuggestionCommand,
        metadata: CommandMetadata,
    ) -> Result<(), SuggestionError> {
        let suggestion = self
            .suggestions
            .find_by_id(&cmd.suggestion_id)
            .await?
            .ok_or(SuggestionError::NotFound(cmd.suggestion_id))?;

        let couple = self
            .couples
            .find_by_id(suggestion.couple_id())
            .await?
            .ok_or_else(|| {
                SuggestionError::infrastructure(format!(
                    "Couple {} missing for suggestion {}",
                    suggestion.couple_id(),
                    suggestion.id()
                ))
            })?;

        couple.authorize_member(&cmd.user_id)?;

        if !suggestion.status().is_pending() {
            return Err(SuggestionError::AlreadyResolved);
        }

        let now = Timestamp::now();
        let resolved = self
            .suggestions
            .mark_dismissed(&cmd.suggestion_id, &cmd.user_id, &now)
            .await?;
        if !resolved {
            // Raced an accept or another dismiss; either way there is
            // nothing further to do and no second side effect.
            return Err(SuggestionError::AlreadyResolved);
        }

        let envelope = SuggestionDismissed {
            event_id: EventId::new(),
            suggestion_id: cmd.suggestion_id,
            dismissed_by: cmd.user_id,
            occurred_at: now,
        }
        .to_envelope()
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish suggestion.dismissed");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryCoupleRepository, InMemorySuggestionRepository};
    use crate::domain::couple::Couple;
    use crate::domain::foundation::{CoupleId, ResponsibleParty, SuggestionStatus};
    use crate::domain::suggestion::{NewSuggestion, Suggestion};

    struct Fixture {
        suggestions: Arc<InMemorySuggestionRepository>,
        events: Arc<InMemoryEventBus>,
        handler: DismissSuggestionHandler,
        couple: Couple,
        user_a: UserId,
        user_b: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let suggestions = Arc::new(InMemorySuggestionRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let user_a = UserId::new();
        let user_b = UserId::new();
        let couple = Couple::form(CoupleId::new(), user_a, user_b).unwrap();
        couples.insert(couple.clone());

        let handler = DismissSuggestionHandler::new(couples, suggestions.clone(), events.clone());

        Fixture {
            suggestions,
            events,
            handler,
            couple,
            user_a,
            user_b,
        }
    }

    fn seed_suggestion(f: &Fixture, responsible: ResponsibleParty) -> Suggestion {
        let suggestion = Suggestion::receive(
            SuggestionId::new(),
            NewSuggestion {
                couple_id: *f.couple.id(),
                session_id: None,
                title: "Monthly money talk".to_string(),
                underlying_need: None,
                responsible,
            },
        )
        .unwrap();
        f.suggestions.insert(suggestion.clone());
        suggestion
    }

    fn metadata(user: UserId) -> CommandMetadata {
        CommandMetadata::new(user).with_correlation_id("test")
    }

    #[tokio::test]
    async fn either_member_may_dismiss_a_targeted_suggestion() {
        let f = fixture();
        // Responsible party is user B, but user A dismisses.
        let suggestion = seed_suggestion(&f, ResponsibleParty::UserB);

        f.handler
            .handle(
                DismissSuggestionCommand {
                    suggestion_id: *suggestion.id(),
                    user_id: f.user_a,
                },
                metadata(f.user_a),
            )
            .await
            .unwrap();

        assert_eq!(
            f.suggestions.get(suggestion.id()).unwrap().status(),
            SuggestionStatus::Dismissed
        );
        assert!(f.events.has_event("suggestion.dismissed"));
    }

    #[tokio::test]
    async fn dismissing_twice_errors_without_a_second_side_effect() {
        let f = fixture();
        let suggestion = seed_suggestion(&f, ResponsibleParty::Both);

        f.handler
            .handle(
                DismissSuggestionCommand {
                    suggestion_id: *suggestion.id(),
                    user_id: f.user_b,
                },
                metadata(f.user_b),
            )
            .await
            .unwrap();
        let result = f
            .handler
            .handle(
                DismissSuggestionCommand {
                    suggestion_id: *suggestion.id(),
                    user_id: f.user_b,
                },
                metadata(f.user_b),
            )
            .await;

        assert_eq!(result.unwrap_err(), SuggestionError::AlreadyResolved);
        let dismissals = f
            .events
            .published_events()
            .into_iter()
            .filter(|e| e.event_type == "suggestion.dismissed")
            .count();
        assert_eq!(dismissals, 1);
    }

    #[tokio::test]
    async fn outsider_is_forbidden() {
        let f = fixture();
        let suggestion = seed_suggestion(&f, ResponsibleParty::Both);

        let outsider = UserId::new();
        let result = f
            .handler
            .handle(
                DismissSuggestionCommand {
                    suggestion_id: *suggestion.id(),
                    user_id: outsider,
                },
                metadata(outsider),
            )
            .await;
        assert_eq!(result.unwrap_err(), SuggestionError::Forbidden);
    }

    #[tokio::test]
    async fn missing_suggestion_is_not_found() {
        let f = fixture();
        let result = f
            .handler
            .handle(
                DismissSuggestionCommand {
                    suggestion_id: SuggestionId::new(),
                    user_id: f.user_a,
                },
                metadata(f.user_a),
            )
            .await;
        assert!(matches!(result, Err(SuggestionError::NotFound(_))));
    }
}
