//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, value objects, status enums, and error types
//! that form the vocabulary of the Accord domain.

mod ids;
mod timestamp;
mod errors;
mod state_machine;
mod agreement_kind;
mod agreement_status;
mod check_in_status;
mod couple_status;
mod responsible_party;
mod suggestion_status;
mod events;
mod metadata;

pub use ids::{AgreementId, CheckInId, CoupleId, EventId, SessionId, SuggestionId, UserId};
pub use timestamp::Timestamp;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use state_machine::StateMachine;
pub use agreement_kind::AgreementKind;
pub use agreement_status::AgreementStatus;
pub use check_in_status::CheckInStatus;
pub use couple_status::CoupleStatus;
pub use responsible_party::ResponsibleParty;
pub use suggestion_status::SuggestionStatus;
pub use events::{DomainEvent, EventEnvelope, EventMetadata, SerializableDomainEvent};
pub use metadata::CommandMetadata;
