//! PostgreSQL adapters.
//!
//! One repository per aggregate, each scoped to single-row writes. The
//! conditional operations (guarded updates, compare-and-set status
//! flips, add-if-absent approval appends) are expressed directly in SQL
//! `WHERE` clauses so two racing requests can never interleave a
//! read-modify-write.

mod helpers;
mod couple_repository;
mod profile_repository;
mod invite_code_repository;
mod agreement_repository;
mod check_in_repository;
mod suggestion_repository;
mod learning_archiver;

pub use couple_repository::PostgresCoupleRepository;
pub use profile_repository::PostgresProfileRepository;
pub use invite_code_repository::PostgresInviteCodeRepository;
pub use agreement_repository::PostgresAgreementRepository;
pub use check_in_repository::PostgresCheckInRepository;
pub use suggestion_repository::PostgresSuggestionRepository;
pub use learning_archiver::PostgresLearningArchiver;
