//! Event publisher that writes to the tracing pipeline.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes domain events as structured log lines.
#[derive(Clone, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        info!(
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or("unknown"),
            "domain event"
        );
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
