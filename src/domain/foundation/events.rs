//! Event infrastructure for domain event publishing.
//!
//! State changes in this core (pairing, agreement transitions, check-ins,
//! dissolution steps) emit domain events. Delivery to end users is out of
//! scope; the envelope exists so adapters can log, capture in tests, or
//! forward to a future consumer without touching domain code.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{EventId, Timestamp};

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync {
    /// Returns the event type string (e.g., "agreement.activated").
    fn event_type(&self) -> &'static str;

    /// Returns the ID of the aggregate that emitted this event.
    fn aggregate_id(&self) -> String;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> Timestamp;

    /// Returns the unique ID for this event instance.
    fn event_id(&self) -> EventId;
}

/// Extension trait that provides `to_envelope()` for serializable events.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    /// Wraps this event in a transport envelope.
    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope {
            event_id: self.event_id(),
            event_type: self.event_type().to_string(),
            aggregate_id: self.aggregate_id(),
            occurred_at: self.occurred_at(),
            payload: serde_json::to_value(self)
                .expect("domain events serialize to JSON"),
            metadata: EventMetadata::default(),
        }
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Tracing context attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlates every event emitted by one request.
    pub correlation_id: Option<String>,

    /// The user whose command produced the event.
    pub user_id: Option<String>,
}

/// Transport wrapper for a domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    pub aggregate_id: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Attaches a correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(correlation_id.into());
        self
    }

    /// Attaches the acting user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(user_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AgreementId;

    #[derive(Serialize)]
    struct TestEvent {
        event_id: EventId,
        agreement_id: AgreementId,
        occurred_at: Timestamp,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            "agreement.test"
        }
        fn aggregate_id(&self) -> String {
            self.agreement_id.to_string()
        }
        fn occurred_at(&self) -> Timestamp {
            self.occurred_at
        }
        fn event_id(&self) -> EventId {
            self.event_id
        }
    }

    #[test]
    fn to_envelope_carries_type_and_aggregate() {
        let event = TestEvent {
            event_id: EventId::new(),
            agreement_id: AgreementId::new(),
            occurred_at: Timestamp::now(),
        };
        let envelope = event.to_envelope();
        assert_eq!(envelope.event_type, "agreement.test");
        assert_eq!(envelope.aggregate_id, event.agreement_id.to_string());
        assert!(envelope.payload.get("agreement_id").is_some());
    }

    #[test]
    fn builder_attaches_metadata() {
        let event = TestEvent {
            event_id: EventId::new(),
            agreement_id: AgreementId::new(),
            occurred_at: Timestamp::now(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id("req-1")
            .with_user_id("user-1");
        assert_eq!(envelope.metadata.correlation_id.as_deref(), Some("req-1"));
        assert_eq!(envelope.metadata.user_id.as_deref(), Some("user-1"));
    }
}
