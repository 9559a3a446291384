//! Check-in repository port.

use async_trait::async_trait;

use crate::domain::agreement::CheckIn;
use crate::domain::foundation::{AgreementId, CheckInId, DomainError};

/// Repository port for check-in persistence. Check-ins are append-only;
/// `delete` exists solely as the compensating action when the paired
/// agreement update fails after the row landed.
#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Append a check-in row.
    async fn save(&self, check_in: &CheckIn) -> Result<(), DomainError>;

    /// The most recent check-ins for an agreement, newest first.
    async fn list_recent(
        &self,
        agreement_id: &AgreementId,
        limit: u32,
    ) -> Result<Vec<CheckIn>, DomainError>;

    /// Remove a check-in row (compensation only).
    async fn delete(&self, id: &CheckInId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_in_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CheckInRepository) {}
    }
}
