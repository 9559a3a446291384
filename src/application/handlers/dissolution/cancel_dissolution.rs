//! CancelDissolutionHandler - either member closes the handshake.
//!
//! Cancel restores the couple to `active` and nothing else: agreements
//! moved to `dissolved_with_couple` at initiation stay dissolved. That
//! asymmetry is intentional (see the dissolution protocol docs).

use std::sync::Arc;

use tracing::warn;

use crate::domain::couple::{Couple, CoupleError, DissolutionCanceled};
use crate::domain::foundation::{
    CommandMetadata, CoupleStatus, EventId, SerializableDomainEvent, Timestamp, UserId,
};
use crate::ports::{CoupleRepository, EventPublisher, ProfileRepository};

/// Command to cancel a pending dissolution.
#[derive(Debug, Clone)]
pub struct CancelDissolutionCommand {
    pub user_id: UserId,
}

/// Handler for canceling dissolution.
pub struct CancelDissolutionHandler {
    couples: Arc<dyn CoupleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    events: Arc<dyn EventPublisher>,
}

impl CancelDissolutionHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            profiles,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelDissolutionCommand,
        metadata: CommandMetadata,
    ) -> Result<Couple, CoupleError> {
        let profile = self
            .profiles
            .find_by_user(&cmd.user_id)
            .await?
            .ok_or(CoupleError::UnknownUser(cmd.user_id))?;
        let couple_id = profile.couple_id.ok_or(CoupleError::NotInCouple)?;

        let mut couple = self
            .couples
            .find_by_id(&couple_id)
            .await?
            .ok_or(CoupleError::NotInCouple)?;

        couple.cancel_dissolution(&cmd.user_id)?;
        self.couples
            .update_guarded(&couple, CoupleStatus::PendingDissolution)
            .await?;

        let envelope = DissolutionCanceled {
            event_id: EventId::new(),
            couple_id,
            canceled_by: cmd.user_id,
            occurred_at: Timestamp::now(),
        }
        .to_envelope()
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish dissolution cancellation");
        }

        Ok(couple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryCoupleRepository, InMemoryProfileRepository};
    use crate::domain::foundation::CoupleId;
    use crate::ports::Profile;

    struct Fixture {
        couples: Arc<InMemoryCoupleRepository>,
        handler: CancelDissolutionHandler,
        couple: Couple,
        user_a: UserId,
        user_b: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let user_a = UserId::new();
        let user_b = UserId::new();
        let mut couple = Couple::form(CoupleId::new(), user_a, user_b).unwrap();
        couple.initiate_dissolution(&user_a, 1).unwrap();
        couples.insert(couple.clone());

        for (user, partner) in [(user_a, user_b), (user_b, user_a)] {
            profiles.insert(Profile {
                user_id: user,
                display_name: "member".to_string(),
                couple_id: Some(*couple.id()),
                partner_id: Some(partner),
            });
        }

        let handler = CancelDissolutionHandler::new(couples.clone(), profiles, events);

        Fixture {
            couples,
            handler,
            couple,
            user_a,
            user_b,
        }
    }

    fn metadata(user: UserId) -> CommandMetadata {
        CommandMetadata::new(user).with_correlation_id("test")
    }

    #[tokio::test]
    async fn either_member_can_cancel() {
        for pick_initiator in [true, false] {
            let f = fixture();
            let canceler = if pick_initiator { f.user_a } else { f.user_b };

            let couple = f
                .handler
                .handle(
                    CancelDissolutionCommand { user_id: canceler },
                    metadata(canceler),
                )
                .await
                .unwrap();

            assert_eq!(couple.status(), CoupleStatus::Active);
            assert!(couple.pending_dissolution().is_none());
            assert_eq!(
                f.couples.get(f.couple.id()).unwrap().status(),
                CoupleStatus::Active
            );
        }
    }

    #[tokio::test]
    async fn cancel_twice_errors_without_side_effects() {
        let f = fixture();
        f.handler
            .handle(
                CancelDissolutionCommand { user_id: f.user_a },
                metadata(f.user_a),
            )
            .await
            .unwrap();

        let result = f
            .handler
            .handle(
                CancelDissolutionCommand { user_id: f.user_a },
                metadata(f.user_a),
            )
            .await;
        assert!(matches!(result, Err(CoupleError::InvalidState(_))));
        assert_eq!(
            f.couples.get(f.couple.id()).unwrap().status(),
            CoupleStatus::Active
        );
    }
}
