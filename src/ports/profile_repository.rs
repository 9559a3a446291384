//! Profile repository port.
//!
//! Profiles belong to the (out of scope) account system; this core only
//! reads them and maintains the couple linkage fields. Each linkage
//! write touches exactly one profile row, which is what makes the
//! pairing saga's per-step compensation possible.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CoupleId, DomainError, UserId};

/// The slice of a user profile this core reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: String,
    pub couple_id: Option<CoupleId>,
    pub partner_id: Option<UserId>,
}

impl Profile {
    /// True while the user belongs to a couple.
    pub fn is_paired(&self) -> bool {
        self.couple_id.is_some()
    }
}

/// Repository port for profile couple-linkage.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by user id.
    ///
    /// Returns `None` if the account system has no such user.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError>;

    /// Set the couple linkage on one profile row.
    async fn link_couple(
        &self,
        user_id: &UserId,
        couple_id: &CoupleId,
        partner_id: &UserId,
    ) -> Result<(), DomainError>;

    /// Clear the couple linkage on one profile row.
    ///
    /// Used both as a pairing compensation and during dissolution
    /// finalization.
    async fn unlink_couple(&self, user_id: &UserId) -> Result<(), DomainError>;
}
