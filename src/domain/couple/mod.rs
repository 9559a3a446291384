//! Couple module - the two-user pairing scope and its teardown handshake.

mod aggregate;
mod invite_code;
mod errors;
mod events;

pub use aggregate::{Couple, PendingDissolution};
pub use invite_code::{generate_code, validate_code_format, InviteCode, CODE_ALPHABET, CODE_LENGTH, CODE_TTL_DAYS};
pub use errors::CoupleError;
pub use events::{CoupleFormed, DissolutionCanceled, DissolutionConfirmed, DissolutionInitiated};
