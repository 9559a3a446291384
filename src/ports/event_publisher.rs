//! Event publisher port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Delivery guarantees are deliberately weak: events here feed logs and
/// future consumers, not user-visible state. Handlers publish after the
/// state change has committed; a publish failure is the caller's to log,
/// never a reason to roll anything back.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish a batch of events in order.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
