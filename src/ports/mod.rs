//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! The storage ports deliberately expose *single-row* conditional
//! operations only (guarded updates, atomic set-append, compare-and-set
//! status flips). The underlying store offers no cross-row transactions,
//! so multi-row operations are orchestrated in the application layer as
//! ordered steps with compensating actions.

mod couple_repository;
mod profile_repository;
mod invite_code_repository;
mod agreement_repository;
mod check_in_repository;
mod suggestion_repository;
mod learning_archiver;
mod event_publisher;

pub use couple_repository::{CoupleRepository, DissolutionChoice};
pub use profile_repository::{Profile, ProfileRepository};
pub use invite_code_repository::InviteCodeRepository;
pub use agreement_repository::AgreementRepository;
pub use check_in_repository::CheckInRepository;
pub use suggestion_repository::SuggestionRepository;
pub use learning_archiver::LearningArchiver;
pub use event_publisher::EventPublisher;
