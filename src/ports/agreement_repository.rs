//! Agreement repository port (write side).
//!
//! The contract encodes the concurrency rules from the domain:
//!
//! - approvals are merged with an atomic add-if-absent append, never a
//!   read-modify-write of the full set
//! - status flips are compare-and-set on the expected current status
//! - everything else is a guarded single-row update

use async_trait::async_trait;

use crate::domain::agreement::Agreement;
use crate::domain::foundation::{AgreementId, AgreementStatus, CoupleId, DomainError, UserId};

/// Repository port for Agreement aggregate persistence.
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Save a new agreement.
    async fn save(&self, agreement: &Agreement) -> Result<(), DomainError>;

    /// Find an agreement by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &AgreementId) -> Result<Option<Agreement>, DomainError>;

    /// List a couple's agreements, newest first, excluding
    /// `dissolved_with_couple`. An optional status filter narrows the
    /// result.
    async fn list_by_couple(
        &self,
        couple_id: &CoupleId,
        status: Option<AgreementStatus>,
    ) -> Result<Vec<Agreement>, DomainError>;

    /// Atomically add a user to the approval set if absent, returning
    /// the updated agreement. Concurrent approvals by both members must
    /// both survive.
    ///
    /// # Errors
    ///
    /// - `AgreementNotFound` if the row is gone
    async fn append_approval(
        &self,
        id: &AgreementId,
        user_id: &UserId,
    ) -> Result<Agreement, DomainError>;

    /// Compare-and-set the status. Returns `false` when the stored
    /// status no longer equals `from` (another transition won).
    async fn transition_status(
        &self,
        id: &AgreementId,
        from: AgreementStatus,
        to: AgreementStatus,
    ) -> Result<bool, DomainError>;

    /// Persist the agreement's current state, guarded on the status the
    /// caller read.
    ///
    /// # Errors
    ///
    /// - `StaleTransition` when the guard misses
    /// - `AgreementNotFound` if the row is gone
    async fn update_guarded(
        &self,
        agreement: &Agreement,
        expected: AgreementStatus,
    ) -> Result<(), DomainError>;

    /// Move every non-terminal agreement of a couple to
    /// `dissolved_with_couple`, returning how many rows changed.
    ///
    /// Single statement over many rows of one couple; each row's flip is
    /// individually conditional on it being non-terminal.
    async fn dissolve_all_for_couple(&self, couple_id: &CoupleId) -> Result<u32, DomainError>;
}
