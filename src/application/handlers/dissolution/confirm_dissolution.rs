//! ConfirmDissolutionHandler - the partner finalizes the dissolution.
//!
//! The confirmer's keep-learnings choice is recorded on their own row
//! and acted on independently; nothing here reads or rewrites the
//! initiator's choice. After the couple row finalizes, both profiles
//! are unlinked with ordered single-row writes; a failure there is
//! logged and surfaced, but the dissolution itself is already final and
//! is never rolled back.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::couple::{Couple, CoupleError, DissolutionConfirmed};
use crate::domain::foundation::{
    CommandMetadata, CoupleStatus, EventId, SerializableDomainEvent, Timestamp, UserId,
};
use crate::ports::{
    CoupleRepository, DissolutionChoice, EventPublisher, LearningArchiver, ProfileRepository,
};

/// Command to confirm dissolution.
#[derive(Debug, Clone)]
pub struct ConfirmDissolutionCommand {
    pub user_id: UserId,
    pub keep_learnings: bool,
}

/// Handler for confirming dissolution.
pub struct ConfirmDissolutionHandler {
    couples: Arc<dyn CoupleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    archiver: Arc<dyn LearningArchiver>,
    events: Arc<dyn EventPublisher>,
}

impl ConfirmDissolutionHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        archiver: Arc<dyn LearningArchiver>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            profiles,
            archiver,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmDissolutionCommand,
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

        let now = Timestamp::now();

        // Validates the handshake is open and the caller is the
        // non-initiating member.
        couple.confirm_dissolution(&cmd.user_id)?;

        // The confirmer's own retention choice, independent of the
        // initiator's row.
        self.couples
            .record_dissolution_choice(&DissolutionChoice {
                couple_id,
                user_id: cmd.user_id,
                keep_learnings: cmd.keep_learnings,
                recorded_at: now,
            })
            .await?;

        self.couples
            .update_guarded(&couple, CoupleStatus::PendingDissolution)
            .await?;

        if cmd.keep_learnings {
            if let Err(e) = self
                .archiver
                .archive_for_member(&couple_id, &cmd.user_id)
                .await
            {
                error!(
                    couple_id = %couple_id,
                    user_id = %cmd.user_id,
                    error = %e,
                    "learning extraction failed for confirmer; dissolution stands"
                );
            }
        }

        // Clear both members' linkage. The couple is already dissolved;
        // a failure here leaves a stale pointer to clean up, never a
        // half-dissolved couple.
        let mut unlink_failure = None;
        for member in couple.members() {
            if let Err(e) = self.profiles.unlink_couple(&member).await {
                error!(
                    user_id = %member,
                    couple_id = %couple_id,
                    error = %e,
                    "failed to unlink profile after dissolution"
                );
                unlink_failure = Some(e);
            }
        }
        if let Some(e) = unlink_failure {
            return Err(e.into());
        }

        let envelope = DissolutionConfirmed {
            event_id: EventId::new(),
            couple_id,
            confirmed_by: cmd.user_id,
            occurred_at: now,
        }
        .to_envelope()
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish dissolution confirmation");
        }

        Ok(couple)
    }
}
