//! Invite code repository port.

use async_trait::async_trait;

use crate::domain::couple::InviteCode;
use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Repository port for invite code persistence.
#[async_trait]
pub trait InviteCodeRepository: Send + Sync {
    /// Save a freshly minted code. Returns `false` on a code-value
    /// collision; the caller re-mints and retries.
    async fn save(&self, invite: &InviteCode) -> Result<bool, DomainError>;

    /// Find a code by its value.
    async fn find_by_code(&self, code: &str) -> Result<Option<InviteCode>, DomainError>;

    /// Find the owner's newest unused, unexpired code, if any.
    ///
    /// Issuing reuses this instead of minting duplicates.
    async fn find_active_by_owner(
        &self,
        owner_id: &UserId,
        now: &Timestamp,
    ) -> Result<Option<InviteCode>, DomainError>;

    /// Mark a code used, conditionally on it still being unused and
    /// unexpired. Returns `false` when the condition misses (someone
    /// else consumed it first, or it expired).
    async fn mark_used(
        &self,
        code: &str,
        used_by: &UserId,
        now: &Timestamp,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_code_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn InviteCodeRepository) {}
    }
}
