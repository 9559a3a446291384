//! In-memory CheckInRepository.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::agreement::CheckIn;
use crate::domain::foundation::{AgreementId, CheckInId, DomainError, ErrorCode};
use crate::ports::CheckInRepository;

/// In-memory CheckInRepository with failure injection.
#[derive(Default)]
pub struct InMemoryCheckInRepository {
    rows: Mutex<Vec<CheckIn>>,
    deleted: Mutex<Vec<CheckInId>>,
    fail_save: AtomicBool,
}

impl InMemoryCheckInRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// All stored rows (for assertions).
    pub fn all(&self) -> Vec<CheckIn> {
        self.rows.lock().expect("rows lock poisoned").clone()
    }

    /// IDs removed via the compensation path (for assertions).
    pub fn deleted_ids(&self) -> Vec<CheckInId> {
        self.deleted.lock().expect("deleted lock poisoned").clone()
    }
}

#[async_trait]
impl CheckInRepository for InMemoryCheckInRepository {
    async fn save(&self, check_in: &CheckIn) -> Result<(), DomainError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated check-in save failure",
            ));
        }
        self.rows
            .lock()
            .expect("rows lock poisoned")
            .push(check_in.clone());
        Ok(())
    }

    async fn list_recent(
        &self,
        agreement_id: &AgreementId,
        limit: u32,
    ) -> Result<Vec<CheckIn>, DomainError> {
        let rows = self.rows.lock().expect("rows lock poisoned");
        let mut matching: Vec<CheckIn> = rows
            .iter()
            .filter(|c| &c.agreement_id == agreement_id)
            .cloned()
            .collect();
        matching.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn delete(&self, id: &CheckInId) -> Result<(), DomainError> {
        self.rows
            .lock()
            .expect("rows lock poisoned")
            .retain(|c| &c.id != id);
        self.deleted.lock().expect("deleted lock poisoned").push(*id);
        Ok(())
    }
}
