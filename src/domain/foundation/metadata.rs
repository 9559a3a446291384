//! Command metadata - tracing context carried by every command.

use super::UserId;

/// Context attached to a command as it enters the application layer.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// The acting user.
    pub user_id: UserId,

    /// Correlation id for tracing a request across handlers and events.
    correlation_id: Option<String>,
}

impl CommandMetadata {
    /// Creates metadata for the given actor.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: None,
        }
    }

    /// Sets the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Returns the correlation id, or a fixed fallback.
    pub fn correlation_id(&self) -> &str {
        self.correlation_id.as_deref().unwrap_or("unknown")
    }
}
