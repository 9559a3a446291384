//! HTTP adapter for pairing and dissolution endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::CoupleHandlers;
pub use routes::couple_routes;
