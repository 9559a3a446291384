//! Event adapters.
//!
//! Notification delivery is out of scope for this core, so the
//! production publisher only logs. Tests use the in-memory bus to
//! assert on what was emitted.

mod in_memory;
mod tracing_publisher;

pub use in_memory::InMemoryEventBus;
pub use tracing_publisher::TracingEventPublisher;
