//! In-memory AgreementRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::agreement::Agreement;
use crate::domain::foundation::{
    AgreementId, AgreementStatus, CoupleId, DomainError, ErrorCode, StateMachine, Timestamp,
    UserId,
};
use crate::ports::AgreementRepository;

/// In-memory AgreementRepository with failure injection.
#[derive(Default)]
pub struct InMemoryAgreementRepository {
    agreements: Mutex<HashMap<AgreementId, Agreement>>,
    fail_save: AtomicBool,
    fail_update: AtomicBool,
}

impl InMemoryAgreementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Seed an agreement directly.
    pub fn insert(&self, agreement: Agreement) {
        self.agreements
            .lock()
            .expect("agreements lock poisoned")
            .insert(*agreement.id(), agreement);
    }

    /// Current state of an agreement, if present.
    pub fn get(&self, id: &AgreementId) -> Option<Agreement> {
        self.agreements
            .lock()
            .expect("agreements lock poisoned")
            .get(id)
            .cloned()
    }

    /// Number of stored agreements.
    pub fn count(&self) -> usize {
        self.agreements
            .lock()
            .expect("agreements lock poisoned")
            .len()
    }
}

/// Rebuilds an agreement with a replaced status, emulating the SQL
/// single-column update.
fn with_status(agreement: &Agreement, status: AgreementStatus) -> Agreement {
    rebuild(agreement, status, None)
}

fn rebuild(
    agreement: &Agreement,
    status: AgreementStatus,
    extra_approval: Option<UserId>,
) -> Agreement {
    let mut approved_by = agreement.approved_by().clone();
    if let Some(user) = extra_approval {
        approved_by.insert(user);
    }
    Agreement::reconstitute(
        *agreement.id(),
        *agreement.couple_id(),
        agreement.title().to_string(),
        agreement.description().map(str::to_string),
        agreement.underlying_need().map(str::to_string),
        agreement.kind(),
        agreement.themes().to_vec(),
        agreement.responsible_user_id().copied(),
        *agreement.created_by(),
        agreement.created_in_session_id().copied(),
        status,
        approved_by,
        agreement.success_streak(),
        agreement.check_in_frequency_days(),
        *agreement.next_check_in_at(),
        *agreement.created_at(),
        Timestamp::now(),
    )
}

#[async_trait]
impl AgreementRepository for InMemoryAgreementRepository {
    async fn save(&self, agreement: &Agreement) -> Result<(), DomainError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated agreement save failure",
            ));
        }
        self.insert(agreement.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AgreementId) -> Result<Option<Agreement>, DomainError> {
        Ok(self.get(id))
    }

    async fn list_by_couple(
        &self,
        couple_id: &CoupleId,
        status: Option<AgreementStatus>,
    ) -> Result<Vec<Agreement>, DomainError> {
        let agreements = self.agreements.lock().expect("agreements lock poisoned");
        let mut matching: Vec<Agreement> = agreements
            .values()
            .filter(|a| a.couple_id() == couple_id)
            .filter(|a| match status {
                Some(wanted) => a.status() == wanted,
                None => a.status() != AgreementStatus::DissolvedWithCouple,
            })
            .cloned()
            .collect();
        matching.sort_by_key(|a| std::cmp::Reverse(*a.created_at()));
        Ok(matching)
    }

    async fn append_approval(
        &self,
        id: &AgreementId,
        user_id: &UserId,
    ) -> Result<Agreement, DomainError> {
        let mut agreements = self.agreements.lock().expect("agreements lock poisoned");
        match agreements.get(id) {
            Some(stored) => {
                let updated = rebuild(stored, stored.status(), Some(*user_id));
                agreements.insert(*id, updated.clone());
                Ok(updated)
            }
            None => Err(DomainError::new(
                ErrorCode::AgreementNotFound,
                format!("Agreement not found: {}", id),
            )),
        }
    }

    async fn transition_status(
        &self,
        id: &AgreementId,
        from: AgreementStatus,
        to: AgreementStatus,
    ) -> Result<bool, DomainError> {
        let mut agreements = self.agreements.lock().expect("agreements lock poisoned");
        match agreements.get(id) {
            Some(stored) if stored.status() == from => {
                let updated = with_status(stored, to);
                agreements.insert(*id, updated);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn update_guarded(
        &self,
        agreement: &Agreement,
        expected: AgreementStatus,
    ) -> Result<(), DomainError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated agreement update failure",
            ));
        }
        let mut agreements = self.agreements.lock().expect("agreements lock poisoned");
        match agreements.get(agreement.id()) {
            Some(stored) if stored.status() == expected => {
                agreements.insert(*agreement.id(), agreement.clone());
                Ok(())
            }
            Some(_) => Err(DomainError::new(
                ErrorCode::StaleTransition,
                format!("Agreement {} changed concurrently", agreement.id()),
            )),
            None => Err(DomainError::new(
                ErrorCode::AgreementNotFound,
                format!("Agreement not found: {}", agreement.id()),
            )),
        }
    }

    async fn dissolve_all_for_couple(&self, couple_id: &CoupleId) -> Result<u32, DomainError> {
        let mut agreements = self.agreements.lock().expect("agreements lock poisoned");
        let ids: Vec<AgreementId> = agreements
            .values()
            .filter(|a| a.couple_id() == couple_id && !a.status().is_terminal())
            .map(|a| *a.id())
            .collect();
        for id in &ids {
            if let Some(stored) = agreements.get(id) {
                let updated = with_status(stored, AgreementStatus::DissolvedWithCouple);
                agreements.insert(*id, updated);
            }
        }
        Ok(ids.len() as u32)
    }
}
