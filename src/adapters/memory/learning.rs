//! In-memory LearningArchiver.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{CoupleId, DomainError, ErrorCode, UserId};
use crate::ports::LearningArchiver;

/// Records archive runs instead of extracting anything.
#[derive(Default)]
pub struct InMemoryLearningArchiver {
    runs: Mutex<Vec<(CoupleId, UserId)>>,
    fail: AtomicBool,
}

impl InMemoryLearningArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Which members had an extraction run (for assertions).
    pub fn runs(&self) -> Vec<(CoupleId, UserId)> {
        self.runs.lock().expect("runs lock poisoned").clone()
    }

    /// Whether an extraction ran for this member.
    pub fn ran_for(&self, couple_id: &CoupleId, user_id: &UserId) -> bool {
        self.runs
            .lock()
            .expect("runs lock poisoned")
            .iter()
            .any(|(c, u)| c == couple_id && u == user_id)
    }
}

#[async_trait]
impl LearningArchiver for InMemoryLearningArchiver {
    async fn archive_for_member(
        &self,
        couple_id: &CoupleId,
        requested_by: &UserId,
    ) -> Result<u32, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated learning archive failure",
            ));
        }
        self.runs
            .lock()
            .expect("runs lock poisoned")
            .push((*couple_id, *requested_by));
        Ok(1)
    }
}
