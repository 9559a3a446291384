//! Domain layer - aggregates, value objects, and domain rules.
//!
//! Pure logic only: no I/O, no clocks beyond `Timestamp::now()` at
//! mutation points, no storage concerns. Persistence and transport live
//! in the adapters.

pub mod foundation;
pub mod couple;
pub mod agreement;
pub mod suggestion;
