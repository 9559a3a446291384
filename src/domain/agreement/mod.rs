//! Agreement module - shared behavioral commitments and their check-ins.

mod aggregate;
mod check_in;
mod errors;
mod events;

pub use aggregate::{Agreement, ApprovalOutcome, NewAgreement, MAX_TITLE_LENGTH};
pub use check_in::CheckIn;
pub use errors::AgreementError;
pub use events::{AgreementActivated, AgreementCreated, AgreementTransitioned, CheckInRecorded};
