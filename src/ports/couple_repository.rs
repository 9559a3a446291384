//! Couple repository port (write side).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::couple::Couple;
use crate::domain::foundation::{CoupleId, CoupleStatus, DomainError, Timestamp, UserId};

/// One member's independent data-retention choice, recorded during
/// dissolution. Each member's row stands alone; writing one must never
/// touch the other's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DissolutionChoice {
    pub couple_id: CoupleId,
    pub user_id: UserId,
    pub keep_learnings: bool,
    pub recorded_at: Timestamp,
}

/// Repository port for Couple aggregate persistence.
#[async_trait]
pub trait CoupleRepository: Send + Sync {
    /// Save a new couple.
    async fn save(&self, couple: &Couple) -> Result<(), DomainError>;

    /// Find a couple by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &CoupleId) -> Result<Option<Couple>, DomainError>;

    /// Persist the couple's current state, guarded on the status the
    /// caller read.
    ///
    /// The update only applies while the stored status still equals
    /// `expected`; a miss means another transition won the race.
    ///
    /// # Errors
    ///
    /// - `StaleTransition` when the guard misses
    /// - `CoupleNotFound` if the row is gone
    async fn update_guarded(
        &self,
        couple: &Couple,
        expected: CoupleStatus,
    ) -> Result<(), DomainError>;

    /// Delete a couple row.
    ///
    /// Only used as the compensating action when pairing fails partway;
    /// dissolved couples are retained.
    async fn delete(&self, id: &CoupleId) -> Result<(), DomainError>;

    /// Record one member's keep-learnings choice (upsert on the member's
    /// own row).
    async fn record_dissolution_choice(
        &self,
        choice: &DissolutionChoice,
    ) -> Result<(), DomainError>;

    /// Fetch one member's recorded choice, if any.
    async fn find_dissolution_choice(
        &self,
        couple_id: &CoupleId,
        user_id: &UserId,
    ) -> Result<Option<DissolutionChoice>, DomainError>;
}
