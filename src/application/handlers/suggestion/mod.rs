//! Suggestion intake - the bridge from the external analysis collaborator.

mod accept_suggestion;
mod dismiss_suggestion;
mod ingest_suggestion;
mod list_suggestions;

pub use accept_suggestion::{
    AcceptSuggestionCommand, AcceptSuggestionHandler, AcceptSuggestionResult, SuggestionEdits,
};
pub use dismiss_suggestion::{DismissSuggestionCommand, DismissSuggestionHandler};
pub use ingest_suggestion::{IngestSuggestionCommand, IngestSuggestionHandler};
pub use list_suggestions::{
    ListSuggestionsHandler, ListSuggestionsQuery, SuggestionList, SuggestionListItem,
};
