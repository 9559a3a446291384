//! Domain events emitted by suggestion intake.

use serde::Serialize;

use crate::domain::foundation::{
    AgreementId, CoupleId, DomainEvent, EventId, SuggestionId, Timestamp, UserId,
};

/// The analysis collaborator handed us a candidate agreement.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionReceived {
    pub event_id: EventId,
    pub suggestion_id: SuggestionId,
    pub couple_id: CoupleId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for SuggestionReceived {
    fn event_type(&self) -> &'static str {
        "suggestion.received"
    }
    fn aggregate_id(&self) -> String {
        self.suggestion_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// A member accepted the suggestion; an agreement now exists for it.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionAccepted {
    pub event_id: EventId,
    pub suggestion_id: SuggestionId,
    pub agreement_id: AgreementId,
    pub accepted_by: UserId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for SuggestionAccepted {
    fn event_type(&self) -> &'static str {
        "suggestion.accepted"
    }
    fn aggregate_id(&self) -> String {
        self.suggestion_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// A member dismissed the suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionDismissed {
    pub event_id: EventId,
    pub suggestion_id: SuggestionId,
    pub dismissed_by: UserId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for SuggestionDismissed {
    fn event_type(&self) -> &'static str {
        "suggestion.dismissed"
    }
    fn aggregate_id(&self) -> String {
        self.suggestion_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}
