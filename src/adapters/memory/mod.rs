//! In-memory adapters for testing.
//!
//! Deterministic, lock-based implementations of the storage ports, with
//! targeted failure injection so the saga compensation paths can be
//! exercised. Not for production wiring; lock poisoning panics are
//! acceptable here.

mod agreement;
mod check_in;
mod couple;
mod invite_code;
mod learning;
mod profile;
mod suggestion;

pub use agreement::InMemoryAgreementRepository;
pub use check_in::InMemoryCheckInRepository;
pub use couple::InMemoryCoupleRepository;
pub use invite_code::InMemoryInviteCodeRepository;
pub use learning::InMemoryLearningArchiver;
pub use profile::InMemoryProfileRepository;
pub use suggestion::InMemorySuggestionRepository;
