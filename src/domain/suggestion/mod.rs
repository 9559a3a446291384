//! Suggestion module - externally-proposed agreement candidates.

mod aggregate;
mod errors;
mod events;

pub use aggregate::{NewSuggestion, Suggestion};
pub use errors::SuggestionError;
pub use events::{SuggestionAccepted, SuggestionDismissed, SuggestionReceived};
