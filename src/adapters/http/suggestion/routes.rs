//! HTTP routes for suggestion endpoints.

use axum::{
    routing::{get, patch},
    Router,
};

use super::handlers::{
    ingest_suggestion, list_suggestions, resolve_suggestion, SuggestionHandlers,
};

/// Creates the suggestion router. Mounted under `/api/agreements`
/// next to the agreement routes, so the full paths are
/// `/api/agreements/suggestions[...]`.
pub fn suggestion_routes(handlers: SuggestionHandlers) -> Router {
    Router::new()
        .route(
            "/suggestions",
            get(list_suggestions).post(ingest_suggestion),
        )
        .route("/suggestions/:id", patch(resolve_suggestion))
        .with_state(handlers)
}
