//! HTTP adapters - REST API implementations.
//!
//! Each component has its own router, DTOs, and error mapping. Callers
//! supply `userId` themselves; authentication lives outside this core.

pub mod agreement;
pub mod couple;
pub mod error;
pub mod suggestion;

pub use agreement::{agreement_routes, AgreementHandlers};
pub use couple::{couple_routes, CoupleHandlers};
pub use suggestion::{suggestion_routes, SuggestionHandlers};
