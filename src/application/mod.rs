//! Application layer - one command/query handler per operation.
//!
//! Handlers orchestrate domain aggregates against the ports, including
//! the ordered multi-row sequences with compensating actions that stand
//! in for the transactions the store does not offer.

pub mod handlers;
