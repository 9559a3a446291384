//! HTTP adapter for suggestion intake endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::SuggestionHandlers;
pub use routes::suggestion_routes;
