//! RedeemInviteCodeHandler - consumes an invite code and forms a couple.
//!
//! The store offers single-row writes only, so pairing is an ordered
//! sequence with a compensating action per step:
//!
//! 1. insert the couple row — nothing to compensate
//! 2. link the inviter's profile — on failure, delete the couple
//! 3. link the redeemer's profile — on failure, unlink the inviter and
//!    delete the couple
//! 4. mark the code used — a failure here is logged but never unwinds
//!    steps 1-3; the pairing stands and the code merely goes stale
//!
//! A failing compensation is logged at `error`; the surfaced error is
//! always the original step failure so the caller knows which operation
//! actually broke.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::couple::{validate_code_format, Couple, CoupleError, CoupleFormed};
use crate::domain::foundation::{
    CommandMetadata, CoupleId, DomainError, EventId, SerializableDomainEvent, Timestamp, UserId,
};
use crate::ports::{CoupleRepository, EventPublisher, InviteCodeRepository, ProfileRepository};

/// Command to redeem an invite code.
#[derive(Debug, Clone)]
pub struct RedeemInviteCodeCommand {
    pub user_id: UserId,
    pub code: String,
}

/// Result of a successful redemption.
#[derive(Debug, Clone)]
pub struct RedeemInviteCodeResult {
    pub couple_id: CoupleId,
    pub partner_id: UserId,
    pub partner_name: String,
}

/// Handler for redeeming invite codes.
pub struct RedeemInviteCodeHandler {
    couples: Arc<dyn CoupleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    invites: Arc<dyn InviteCodeRepository>,
    events: Arc<dyn EventPublisher>,
}

impl RedeemInviteCodeHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        invites: Arc<dyn InviteCodeRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            profiles,
            invites,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: RedeemInviteCodeCommand,
        metadata: CommandMetadata,
    ) -> Result<RedeemInviteCodeResult, CoupleError> {
        validate_code_format(&cmd.code).map_err(DomainError::from)?;
        let now = Timestamp::now();

        let redeemer = self
            .profiles
            .find_by_user(&cmd.user_id)
            .await?
            .ok_or(CoupleError::UnknownUser(cmd.user_id))?;
        if redeemer.is_paired() {
            return Err(CoupleError::AlreadyPaired);
        }

        // Unknown, used, expired, and self-redeem all collapse into one
        // answer; probing codes reveals nothing.
        let invite = self
            .invites
            .find_by_code(&cmd.code)
            .await?
            .ok_or(CoupleError::InvalidOrExpiredCode)?;
        if !invite.is_redeemable_by(&cmd.user_id, &now) {
            return Err(CoupleError::InvalidOrExpiredCode);
        }

        let inviter = self
            .profiles
            .find_by_user(&invite.owner_id)
            .await?
            .ok_or(CoupleError::UnknownUser(invite.owner_id))?;
        if inviter.is_paired() {
            return Err(CoupleError::AlreadyPaired);
        }

        // Step 1: the couple row.
        let couple = Couple::form(CoupleId::new(), invite.owner_id, cmd.user_id)?;
        self.couples.save(&couple).await?;

        // Step 2: inviter profile.
        if let Err(step_err) = self
            .profiles
            .link_couple(&invite.owner_id, couple.id(), &cmd.user_id)
            .await
        {
            if let Err(comp_err) = self.couples.delete(couple.id()).await {
                error!(
                    couple_id = %couple.id(),
                    error = %comp_err,
                    "pairing compensation failed: couple row left behind"
                );
            }
            return Err(step_err.into());
        }

        // Step 3: redeemer profile.
        if let Err(step_err) = self
            .profiles
            .link_couple(&cmd.user_id, couple.id(), &invite.owner_id)
            .await
        {
            if let Err(comp_err) = self.profiles.unlink_couple(&invite.owner_id).await {
                error!(
                    user_id = %invite.owner_id,
                    error = %comp_err,
                    "pairing compensation failed: inviter profile still linked"
                );
            }
            if let Err(comp_err) = self.couples.delete(couple.id()).await {
                error!(
                    couple_id = %couple.id(),
                    error = %comp_err,
                    "pairing compensation failed: couple row left behind"
                );
            }
            return Err(step_err.into());
        }

        // Step 4: consume the code. The pairing is already complete;
        // from the issuer's perspective the code is spent either way.
        match self.invites.mark_used(&cmd.code, &cmd.user_id, &now).await {
            Ok(true) => {}
            Ok(false) => warn!(code = %cmd.code, "invite code already consumed or expired when marking used"),
            Err(e) => warn!(code = %cmd.code, error = %e, "failed to mark invite code used; pairing stands"),
        }

        let event = CoupleFormed {
            event_id: EventId::new(),
            couple_id: *couple.id(),
            user_a: invite.owner_id,
            user_b: cmd.user_id,
            occurred_at: now,
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish couple.formed");
        }

        Ok(RedeemInviteCodeResult {
            couple_id: *couple.id(),
            partner_id: invite.owner_id,
            partner_name: inviter.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryCoupleRepository, InMemoryInviteCodeRepository, InMemoryProfileRepository,
    };
    use crate::domain::couple::InviteCode;

    struct Fixture {
        couples: Arc<InMemoryCoupleRepository>,
        profiles: Arc<InMemoryProfileRepository>,
        invites: Arc<InMemoryInviteCodeRepository>,
        events: Arc<InMemoryEventBus>,
        handler: RedeemInviteCodeHandler,
        inviter: UserId,
        redeemer: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let inviter = UserId::new();
        let redeemer = UserId::new();
        profiles.insert_user(inviter, "Alex");
        profiles.insert_user(redeemer, "Jordan");

        let handler = RedeemInviteCodeHandler::new(
            couples.clone(),
            profiles.clone(),
            invites.clone(),
            events.clone(),
        );

        Fixture {
            couples,
            profiles,
            invites,
            events,
            handler,
            inviter,
            redeemer,
        }
    }

    fn seed_code(f: &Fixture, code: &str) {
        let now = Timestamp::now();
        let mut invite = InviteCode::mint(&mut rand::thread_rng(), f.inviter, now);
        invite.code = code.to_string();
        f.invites.insert(invite);
    }

    fn metadata(user: UserId) -> CommandMetadata {
        CommandMetadata::new(user).with_correlation_id("test")
    }

    #[tokio::test]
    async fn redeem_links_both_profiles_and_consumes_the_code() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");

        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await
            .unwrap();

        assert_eq!(result.partner_id, f.inviter);
        assert_eq!(result.partner_name, "Alex");

        let inviter_profile = f.profiles.get(&f.inviter).unwrap();
        let redeemer_profile = f.profiles.get(&f.redeemer).unwrap();
        assert_eq!(inviter_profile.couple_id, Some(result.couple_id));
        assert_eq!(redeemer_profile.couple_id, Some(result.couple_id));
        assert_eq!(inviter_profile.partner_id, Some(f.redeemer));
        assert_eq!(redeemer_profile.partner_id, Some(f.inviter));

        assert!(f.invites.get("K7M3PQ").unwrap().is_used());
        assert!(f.events.has_event("couple.formed"));
    }

    #[tokio::test]
    async fn second_redeem_of_the_same_code_fails() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");

        f.handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await
            .unwrap();

        let third_user = UserId::new();
        f.profiles.insert_user(third_user, "Riley");
        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: third_user,
                    code: "K7M3PQ".to_string(),
                },
                metadata(third_user),
            )
            .await;
        assert_eq!(result.unwrap_err(), CoupleError::InvalidOrExpiredCode);
    }

    #[tokio::test]
    async fn self_redeem_is_rejected() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");

        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.inviter,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.inviter),
            )
            .await;
        assert_eq!(result.unwrap_err(), CoupleError::InvalidOrExpiredCode);
    }

    #[tokio::test]
    async fn unknown_code_is_rejected() {
        let f = fixture();
        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "ZZZZZZ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await;
        assert_eq!(result.unwrap_err(), CoupleError::InvalidOrExpiredCode);
    }

    #[tokio::test]
    async fn malformed_code_is_a_validation_error() {
        let f = fixture();
        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3P0".to_string(), // 0 is not in the alphabet
                },
                metadata(f.redeemer),
            )
            .await;
        assert!(matches!(result, Err(CoupleError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn redeemer_profile_failure_rolls_back_couple_and_inviter() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");
        // Step 3 (redeemer link) will fail.
        f.profiles.fail_link_for(f.redeemer);

        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await;

        assert!(matches!(result, Err(CoupleError::Infrastructure(_))));
        // No couple row survives and the inviter's profile is clean.
        assert_eq!(f.couples.count(), 0);
        let inviter_profile = f.profiles.get(&f.inviter).unwrap();
        assert!(inviter_profile.couple_id.is_none());
        assert!(inviter_profile.partner_id.is_none());
        // The code was never consumed.
        assert!(!f.invites.get("K7M3PQ").unwrap().is_used());
        assert_eq!(f.events.event_count(), 0);
    }

    #[tokio::test]
    async fn inviter_profile_failure_rolls_back_couple() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");
        // Step 2 (inviter link) will fail.
        f.profiles.fail_link_for(f.inviter);

        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(f.couples.count(), 0);
        assert!(f.profiles.get(&f.redeemer).unwrap().couple_id.is_none());
    }

    #[tokio::test]
    async fn mark_used_failure_does_not_unwind_the_pairing() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");
        f.invites.fail_mark_used(true);

        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await
            .unwrap();

        // Pairing succeeded even though the code row is stale.
        assert_eq!(f.couples.count(), 1);
        assert_eq!(
            f.profiles.get(&f.redeemer).unwrap().couple_id,
            Some(result.couple_id)
        );
        assert!(!f.invites.get("K7M3PQ").unwrap().is_used());
    }

    #[tokio::test]
    async fn paired_redeemer_is_rejected_before_any_write() {
        let f = fixture();
        seed_code(&f, "K7M3PQ");

        // Pair the redeemer with someone else first.
        let other = UserId::new();
        f.profiles.insert_user(other, "Casey");
        let existing = Couple::form(CoupleId::new(), f.redeemer, other).unwrap();
        f.couples.insert(existing.clone());
        f.profiles
            .link_couple(&f.redeemer, existing.id(), &other)
            .await
            .unwrap();

        let result = f
            .handler
            .handle(
                RedeemInviteCodeCommand {
                    user_id: f.redeemer,
                    code: "K7M3PQ".to_string(),
                },
                metadata(f.redeemer),
            )
            .await;
        assert_eq!(result.unwrap_err(), CoupleError::AlreadyPaired);
        assert!(!f.invites.get("K7M3PQ").unwrap().is_used());
    }
}
