//! Accord - Two-party agreement and commitment tracking core.
//!
//! This crate implements the consensus subsystem of a couples-coaching
//! product: pairing two users via a one-time invite code, the agreement
//! approval and lifecycle state machine, periodic check-ins with streak
//! tracking, suggestion intake from the external analysis collaborator,
//! and the two-phase dissolution handshake.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
