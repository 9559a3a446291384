//! HTTP routes for pairing and dissolution endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{couple_status, disconnect, issue_code, redeem_code, CoupleHandlers};

/// Creates the couple router with all endpoints.
pub fn couple_routes(handlers: CoupleHandlers) -> Router {
    Router::new()
        .route("/pair", get(issue_code).post(redeem_code))
        .route("/status", get(couple_status))
        .route("/disconnect", post(disconnect))
        .with_state(handlers)
}
