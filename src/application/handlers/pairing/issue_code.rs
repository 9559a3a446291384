//! IssueInviteCodeHandler - mints or reuses a pairing invite code.

use std::sync::Arc;

use tracing::warn;

use crate::domain::couple::{CoupleError, InviteCode};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{InviteCodeRepository, ProfileRepository};

/// How many mint attempts before giving up on collisions. At 6 chars
/// over a 32-glyph alphabet one retry is already unheard of.
const MAX_MINT_ATTEMPTS: u32 = 5;

/// Command to issue an invite code.
#[derive(Debug, Clone)]
pub struct IssueInviteCodeCommand {
    pub user_id: UserId,
}

/// Result of issuing a code.
#[derive(Debug, Clone)]
pub struct IssueInviteCodeResult {
    pub code: String,
    pub expires_at: Timestamp,
    /// True when an existing unexpired code was handed back instead of
    /// minting a new one.
    pub reused: bool,
}

/// Handler for issuing invite codes.
pub struct IssueInviteCodeHandler {
    profiles: Arc<dyn ProfileRepository>,
    invites: Arc<dyn InviteCodeRepository>,
}

impl IssueInviteCodeHandler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        invites: Arc<dyn InviteCodeRepository>,
    ) -> Self {
        Self { profiles, invites }
    }

    pub async fn handle(
        &self,
        cmd: IssueInviteCodeCommand,
    ) -> Result<IssueInviteCodeResult, CoupleError> {
        let profile = self
            .profiles
            .find_by_user(&cmd.user_id)
            .await?
            .ok_or(CoupleError::UnknownUser(cmd.user_id))?;

        if profile.is_paired() {
            return Err(CoupleError::AlreadyPaired);
        }

        let now = Timestamp::now();

        // One live code per user; hand the existing one back.
        if let Some(existing) = self.invites.find_active_by_owner(&cmd.user_id, &now).await? {
            return Ok(IssueInviteCodeResult {
                code: existing.code,
                expires_at: existing.expires_at,
                reused: true,
            });
        }

        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let invite = InviteCode::mint(&mut rand::thread_rng(), cmd.user_id, now);
            if self.invites.save(&invite).await? {
                return Ok(IssueInviteCodeResult {
                    code: invite.code,
                    expires_at: invite.expires_at,
                    reused: false,
                });
            }
            warn!(attempt, "invite code collision, minting again");
        }

        Err(CoupleError::infrastructure(
            "Could not mint a unique invite code",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryInviteCodeRepository, InMemoryProfileRepository};
    use crate::domain::couple::{validate_code_format, CODE_TTL_DAYS};
    use crate::domain::foundation::CoupleId;
    use crate::ports::Profile;

    fn handler(
        profiles: Arc<InMemoryProfileRepository>,
        invites: Arc<InMemoryInviteCodeRepository>,
    ) -> IssueInviteCodeHandler {
        IssueInviteCodeHandler::new(profiles, invites)
    }

    #[tokio::test]
    async fn mints_a_well_formed_code_with_seven_day_expiry() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let user = UserId::new();
        profiles.insert_user(user, "Alex");

        let result = handler(profiles, invites.clone())
            .handle(IssueInviteCodeCommand { user_id: user })
            .await
            .unwrap();

        assert!(validate_code_format(&result.code).is_ok());
        assert!(!result.reused);
        let stored = invites.get(&result.code).unwrap();
        assert_eq!(stored.owner_id, user);
        assert_eq!(stored.expires_at, stored.created_at.add_days(CODE_TTL_DAYS));
    }

    #[tokio::test]
    async fn reuses_an_existing_active_code() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let user = UserId::new();
        profiles.insert_user(user, "Alex");

        let h = handler(profiles, invites);
        let first = h
            .handle(IssueInviteCodeCommand { user_id: user })
            .await
            .unwrap();
        let second = h
            .handle(IssueInviteCodeCommand { user_id: user })
            .await
            .unwrap();

        assert_eq!(first.code, second.code);
        assert!(second.reused);
    }

    #[tokio::test]
    async fn retries_on_collision() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let user = UserId::new();
        profiles.insert_user(user, "Alex");
        invites.collide_next(2);

        let result = handler(profiles, invites)
            .handle(IssueInviteCodeCommand { user_id: user })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn gives_up_after_too_many_collisions() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let user = UserId::new();
        profiles.insert_user(user, "Alex");
        invites.collide_next(MAX_MINT_ATTEMPTS + 1);

        let result = handler(profiles, invites)
            .handle(IssueInviteCodeCommand { user_id: user })
            .await;
        assert!(matches!(result, Err(CoupleError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn fails_when_already_paired() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let user = UserId::new();
        profiles.insert(Profile {
            user_id: user,
            display_name: "Alex".to_string(),
            couple_id: Some(CoupleId::new()),
            partner_id: Some(UserId::new()),
        });

        let result = handler(profiles, invites)
            .handle(IssueInviteCodeCommand { user_id: user })
            .await;
        assert_eq!(result.unwrap_err(), CoupleError::AlreadyPaired);
    }

    #[tokio::test]
    async fn fails_for_unknown_user() {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());

        let result = handler(profiles, invites)
            .handle(IssueInviteCodeCommand {
                user_id: UserId::new(),
            })
            .await;
        assert!(matches!(result, Err(CoupleError::UnknownUser(_))));
    }
}
