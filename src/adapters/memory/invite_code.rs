//! In-memory InviteCodeRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::domain::couple::InviteCode;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::InviteCodeRepository;

/// In-memory InviteCodeRepository with collision injection.
#[derive(Default)]
pub struct InMemoryInviteCodeRepository {
    codes: Mutex<HashMap<String, InviteCode>>,
    collisions_remaining: AtomicU32,
    fail_mark_used: AtomicBool,
}

impl InMemoryInviteCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` saves report a code collision.
    pub fn collide_next(&self, n: u32) {
        self.collisions_remaining.store(n, Ordering::SeqCst);
    }

    /// Make `mark_used` fail with a storage error.
    pub fn fail_mark_used(&self, fail: bool) {
        self.fail_mark_used.store(fail, Ordering::SeqCst);
    }

    /// Seed a code directly.
    pub fn insert(&self, invite: InviteCode) {
        self.codes
            .lock()
            .expect("codes lock poisoned")
            .insert(invite.code.clone(), invite);
    }

    /// Current state of a code, if present.
    pub fn get(&self, code: &str) -> Option<InviteCode> {
        self.codes
            .lock()
            .expect("codes lock poisoned")
            .get(code)
            .cloned()
    }
}

#[async_trait]
impl InviteCodeRepository for InMemoryInviteCodeRepository {
    async fn save(&self, invite: &InviteCode) -> Result<bool, DomainError> {
        if self.collisions_remaining.load(Ordering::SeqCst) > 0 {
            self.collisions_remaining.fetch_sub(1, Ordering::SeqCst);
            return Ok(false);
        }
        let mut codes = self.codes.lock().expect("codes lock poisoned");
        if codes.contains_key(&invite.code) {
            return Ok(false);
        }
        codes.insert(invite.code.clone(), invite.clone());
        Ok(true)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<InviteCode>, DomainError> {
        Ok(self.get(code))
    }

    async fn find_active_by_owner(
        &self,
        owner_id: &UserId,
        now: &Timestamp,
    ) -> Result<Option<InviteCode>, DomainError> {
        let codes = self.codes.lock().expect("codes lock poisoned");
        let mut active: Vec<&InviteCode> = codes
            .values()
            .filter(|c| &c.owner_id == owner_id && !c.is_used() && !c.is_expired(now))
            .collect();
        active.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(active.first().map(|c| (*c).clone()))
    }

    async fn mark_used(
        &self,
        code: &str,
        used_by: &UserId,
        now: &Timestamp,
    ) -> Result<bool, DomainError> {
        if self.fail_mark_used.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated mark-used failure",
            ));
        }
        let mut codes = self.codes.lock().expect("codes lock poisoned");
        match codes.get_mut(code) {
            Some(invite) if !invite.is_used() && !invite.is_expired(now) => {
                invite.mark_used(*used_by, *now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
