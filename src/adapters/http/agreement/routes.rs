//! HTTP routes for agreement endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    create_agreement, list_agreements, record_check_in, transition_agreement, AgreementHandlers,
};

/// Creates the agreement router. Mounted under `/api/agreements`
/// alongside the suggestion routes.
pub fn agreement_routes(handlers: AgreementHandlers) -> Router {
    Router::new()
        .route("/", get(list_agreements).post(create_agreement))
        .route("/:id", patch(transition_agreement))
        .route("/:id/checkin", post(record_check_in))
        .with_state(handlers)
}
