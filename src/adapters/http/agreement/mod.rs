//! HTTP adapter for agreement and check-in endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::AgreementHandlers;
pub use routes::agreement_routes;
