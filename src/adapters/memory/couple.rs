//! In-memory CoupleRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::couple::Couple;
use crate::domain::foundation::{CoupleId, CoupleStatus, DomainError, ErrorCode, UserId};
use crate::ports::{CoupleRepository, DissolutionChoice};

/// In-memory CoupleRepository with failure injection.
#[derive(Default)]
pub struct InMemoryCoupleRepository {
    couples: Mutex<HashMap<CoupleId, Couple>>,
    choices: Mutex<HashMap<(CoupleId, UserId), DissolutionChoice>>,
    fail_save: AtomicBool,
    fail_update: AtomicBool,
}

impl InMemoryCoupleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next and all following `save` calls fail.
    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// Make `update_guarded` calls fail.
    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Seed a couple directly.
    pub fn insert(&self, couple: Couple) {
        self.couples
            .lock()
            .expect("couples lock poisoned")
            .insert(*couple.id(), couple);
    }

    /// Current state of a couple, if present.
    pub fn get(&self, id: &CoupleId) -> Option<Couple> {
        self.couples
            .lock()
            .expect("couples lock poisoned")
            .get(id)
            .cloned()
    }

    /// Number of stored couples.
    pub fn count(&self) -> usize {
        self.couples.lock().expect("couples lock poisoned").len()
    }

    /// A member's recorded choice, if any.
    pub fn choice(&self, couple_id: &CoupleId, user_id: &UserId) -> Option<DissolutionChoice> {
        self.choices
            .lock()
            .expect("choices lock poisoned")
            .get(&(*couple_id, *user_id))
            .cloned()
    }
}

#[async_trait]
impl CoupleRepository for InMemoryCoupleRepository {
    async fn save(&self, couple: &Couple) -> Result<(), DomainError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated couple save failure",
            ));
        }
        self.insert(couple.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CoupleId) -> Result<Option<Couple>, DomainError> {
        Ok(self.get(id))
    }

    async fn update_guarded(
        &self,
        couple: &Couple,
        expected: CoupleStatus,
    ) -> Result<(), DomainError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated couple update failure",
            ));
        }
        let mut couples = self.couples.lock().expect("couples lock poisoned");
        match couples.get(couple.id()) {
            Some(stored) if stored.status() == expected => {
                couples.insert(*couple.id(), couple.clone());
                Ok(())
            }
            Some(_) => Err(DomainError::new(
                ErrorCode::StaleTransition,
                format!("Couple {} changed concurrently", couple.id()),
            )),
            None => Err(DomainError::new(
                ErrorCode::CoupleNotFound,
                format!("Couple not found: {}", couple.id()),
            )),
        }
    }

    async fn delete(&self, id: &CoupleId) -> Result<(), DomainError> {
        self.couples
            .lock()
            .expect("couples lock poisoned")
            .remove(id);
        Ok(())
    }

    async fn record_dissolution_choice(
        &self,
        choice: &DissolutionChoice,
    ) -> Result<(), DomainError> {
        self.choices
            .lock()
            .expect("choices lock poisoned")
            .insert((choice.couple_id, choice.user_id), choice.clone());
        Ok(())
    }

    async fn find_dissolution_choice(
        &self,
        couple_id: &CoupleId,
        user_id: &UserId,
    ) -> Result<Option<DissolutionChoice>, DomainError> {
        Ok(self.choice(couple_id, user_id))
    }
}
