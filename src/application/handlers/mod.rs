//! Command and query handlers, grouped by component.

pub mod pairing;
pub mod agreement;
pub mod check_in;
pub mod suggestion;
pub mod dissolution;
