//! In-memory ProfileRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{CoupleId, DomainError, ErrorCode, UserId};
use crate::ports::{Profile, ProfileRepository};

/// In-memory ProfileRepository with per-user failure injection for the
/// pairing saga steps.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<UserId, Profile>>,
    fail_link_for: Mutex<Option<UserId>>,
    fail_unlink_for: Mutex<Option<UserId>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile. Convenience for an unpaired user.
    pub fn insert_user(&self, user_id: UserId, display_name: &str) {
        self.insert(Profile {
            user_id,
            display_name: display_name.to_string(),
            couple_id: None,
            partner_id: None,
        });
    }

    /// Seed a full profile row.
    pub fn insert(&self, profile: Profile) {
        self.profiles
            .lock()
            .expect("profiles lock poisoned")
            .insert(profile.user_id, profile);
    }

    /// Current state of a profile, if present.
    pub fn get(&self, user_id: &UserId) -> Option<Profile> {
        self.profiles
            .lock()
            .expect("profiles lock poisoned")
            .get(user_id)
            .cloned()
    }

    /// Make `link_couple` fail for this user.
    pub fn fail_link_for(&self, user_id: UserId) {
        *self.fail_link_for.lock().expect("flag lock poisoned") = Some(user_id);
    }

    /// Make `unlink_couple` fail for this user.
    pub fn fail_unlink_for(&self, user_id: UserId) {
        *self.fail_unlink_for.lock().expect("flag lock poisoned") = Some(user_id);
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        Ok(self.get(user_id))
    }

    async fn link_couple(
        &self,
        user_id: &UserId,
        couple_id: &CoupleId,
        partner_id: &UserId,
    ) -> Result<(), DomainError> {
        if self.fail_link_for.lock().expect("flag lock poisoned").as_ref() == Some(user_id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated profile link failure",
            ));
        }
        let mut profiles = self.profiles.lock().expect("profiles lock poisoned");
        match profiles.get_mut(user_id) {
            Some(profile) => {
                profile.couple_id = Some(*couple_id);
                profile.partner_id = Some(*partner_id);
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("Profile not found: {}", user_id),
            )),
        }
    }

    async fn unlink_couple(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.fail_unlink_for.lock().expect("flag lock poisoned").as_ref() == Some(user_id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated profile unlink failure",
            ));
        }
        let mut profiles = self.profiles.lock().expect("profiles lock poisoned");
        match profiles.get_mut(user_id) {
            Some(profile) => {
                profile.couple_id = None;
                profile.partner_id = None;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("Profile not found: {}", user_id),
            )),
        }
    }
}
