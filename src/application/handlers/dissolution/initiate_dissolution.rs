//! InitiateDissolutionHandler - opens the dissolution handshake.
//!
//! This is the irreversible data-affecting step: flipping the couple to
//! `pending_dissolution` also moves every open agreement to
//! `dissolved_with_couple`. A later cancel restores the couple but never
//! the agreements; the relationship can resume, the commitment history
//! of the dissolved episode does not silently come back.
//!
//! Ordered steps:
//!
//! 1. record the initiator's keep-learnings choice (their own row;
//!    harmless if the handshake never completes)
//! 2. flip the couple `active -> pending_dissolution` (compare-and-set;
//!    losing the race to the partner's initiate surfaces as a conflict)
//! 3. dissolve the couple's open agreements — on failure, flip the
//!    couple back and surface the step failure
//! 4. if the initiator kept learnings, run the extraction; a failure
//!    here is logged, never surfaced

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::couple::{Couple, CoupleError, DissolutionInitiated};
use crate::domain::foundation::{
    CommandMetadata, CoupleStatus, EventId, SerializableDomainEvent, StateMachine, Timestamp,
    UserId,
};
use crate::ports::{
    AgreementRepository, CoupleRepository, DissolutionChoice, EventPublisher, LearningArchiver,
    ProfileRepository,
};

/// Command to initiate dissolution.
#[derive(Debug, Clone)]
pub struct InitiateDissolutionCommand {
    pub user_id: UserId,
    pub keep_learnings: bool,
}

/// Result of initiating dissolution.
#[derive(Debug, Clone)]
pub struct InitiateDissolutionResult {
    pub couple: Couple,
    pub agreements_dissolved: u32,
}

/// Handler for initiating dissolution.
pub struct InitiateDissolutionHandler {
    couples: Arc<dyn CoupleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    agreements: Arc<dyn AgreementRepository>,
    archiver: Arc<dyn LearningArchiver>,
    events: Arc<dyn EventPublisher>,
}

impl InitiateDissolutionHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        agreements: Arc<dyn AgreementRepository>,
        archiver: Arc<dyn LearningArchiver>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            profiles,
            agreements,
            archiver,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiateDissolutionCommand,
        metadata: CommandMetadata,
    ) -> Result<InitiateDissolutionResult, CoupleError> {
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

        // The open agreements this handshake is about to dissolve.
        let open_agreements = self
            .agreements
            .list_by_couple(&couple_id, None)
            .await?
            .into_iter()
            .filter(|a| !a.status().is_terminal())
            .count() as u32;

        // Step 1: the initiator's own retention choice.
        self.couples
            .record_dissolution_choice(&DissolutionChoice {
                couple_id,
                user_id: cmd.user_id,
                keep_learnings: cmd.keep_learnings,
                recorded_at: now,
            })
            .await?;

        // Step 2: open the handshake.
        couple.initiate_dissolution(&cmd.user_id, open_agreements)?;
        self.couples
            .update_guarded(&couple, CoupleStatus::Active)
            .await?;

        // Step 3: cascade to the agreements.
        let dissolved = match self.agreements.dissolve_all_for_couple(&couple_id).await {
            Ok(count) => count,
            Err(step_err) => {
                let mut reverted = couple.clone();
                if reverted.cancel_dissolution(&cmd.user_id).is_ok() {
                    if let Err(comp_err) = self
                        .couples
                        .update_guarded(&reverted, CoupleStatus::PendingDissolution)
                        .await
                    {
                        error!(
                            couple_id = %couple_id,
                            error = %comp_err,
                            "dissolution compensation failed: couple stuck pending with live agreements"
                        );
                    }
                }
                return Err(step_err.into());
            }
        };

        // Step 4: the initiator's extraction, gated on their choice.
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
                    "learning extraction failed for initiator; dissolution proceeds"
                );
            }
        }

        let envelope = DissolutionInitiated {
            event_id: EventId::new(),
            couple_id,
            initiated_by: cmd.user_id,
            agreements_dissolved: dissolved,
            occurred_at: now,
        }
        .to_envelope()
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish dissolution initiation");
        }

        Ok(InitiateDissolutionResult {
            couple,
            agreements_dissolved: dissolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryAgreementRepository, InMemoryCoupleRepository, InMemoryLearningArchiver,
        InMemoryProfileRepository,
    };
    use crate::domain::agreement::{Agreement, NewAgreement};
    use crate::domain::foundation::{AgreementId, AgreementKind, AgreementStatus, CoupleId};

    struct Fixture {
        couples: Arc<InMemoryCoupleRepository>,
        agreements: Arc<InMemoryAgreementRepository>,
        archiver: Arc<InMemoryLearningArchiver>,
        events: Arc<InMemoryEventBus>,
        handler: InitiateDissolutionHandler,
        couple: Couple,
        user_a: UserId,
        user_b: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let agreements = Arc::new(InMemoryAgreementRepository::new());
        let archiver = Arc::new(InMemoryLearningArchiver::new());
        let events = Arc::new(InMemoryEventBus::new());

        let user_a = UserId::new();
        let user_b = UserId::new();
        let couple = Couple::form(CoupleId::new(), user_a, user_b).unwrap();
        couples.insert(couple.clone());
        profiles.insert(crate::ports::Profile {
            user_id: user_a,
            display_name: "Alex".to_string(),
            couple_id: Some(*couple.id()),
            partner_id: Some(user_b),
        });
        profiles.insert(crate::ports::Profile {
            user_id: user_b,
            display_name: "Jordan".to_string(),
            couple_id: Some(*couple.id()),
            partner_id: Some(user_a),
        });

        let handler = InitiateDissolutionHandler::new(
            couples.clone(),
            profiles,
            agreements.clone(),
            archiver.clone(),
            events.clone(),
        );

        Fixture {
            couples,
            agreements,
            archiver,
            events,
            handler,
            couple,
            user_a,
            user_b,
        }
    }

    fn seed_agreement(f: &Fixture, responsible: Option<UserId>) -> Agreement {
        let agreement = Agreement::propose(
            AgreementId::new(),
            NewAgreement {
                couple_id: *f.couple.id(),
                created_by: f.user_a,
                title: "Sunday planning hour".to_string(),
                description: None,
                underlying_need: None,
                kind: AgreementKind::Ritual,
                themes: vec![],
                responsible_user_id: responsible,
                check_in_frequency_days: 7,
                created_in_session_id: None,
            },
            &f.couple,
        )
        .unwrap();
        f.agreements.insert(agreement.clone());
        agreement
    }

    fn metadata(user: UserId) -> CommandMetadata {
        CommandMetadata::new(user).with_correlation_id("test")
    }

    #[tokio::test]
    async fn initiate_dissolves_open_agreements_and_records_choice() {
        let f = fixture();
        let open = seed_agreement(&f, Some(f.user_a)); // active
        let pending = seed_agreement(&f, Some(f.user_b)); // pending approval
        let mut achieved = seed_agreement(&f, Some(f.user_a));
        achieved.achieve().unwrap();
        f.agreements.insert(achieved.clone());

        let result = f
            .handler
            .handle(
                InitiateDissolutionCommand {
                    user_id: f.user_a,
                    keep_learnings: false,
                },
                metadata(f.user_a),
            )
            .await
            .unwrap();

        assert_eq!(result.couple.status(), CoupleStatus::PendingDissolution);
        assert_eq!(result.agreements_dissolved, 2);
        assert_eq!(
            f.agreements.get(open.id()).unwrap().status(),
            AgreementStatus::DissolvedWithCouple
        );
        assert_eq!(
            f.agreements.get(pending.id()).unwrap().status(),
            AgreementStatus::DissolvedWithCouple
        );
        // Terminal agreements stay as they were.
        assert_eq!(
            f.agreements.get(achieved.id()).unwrap().status(),
            AgreementStatus::Achieved
        );

        let choice = f.couples.choice(f.couple.id(), &f.user_a).unwrap();
        assert!(!choice.keep_learnings);
        assert!(f.events.has_event("couple.dissolution_initiated"));
    }

    #[tokio::test]
    async fn keep_learnings_runs_the_archiver_for_the_initiator_only() {
        let f = fixture();
        seed_agreement(&f, Some(f.user_a));

        f.handler
            .handle(
                InitiateDissolutionCommand {
                    user_id: f.user_a,
                    keep_learnings: true,
                },
                metadata(f.user_a),
            )
            .await
            .unwrap();

        assert!(f.archiver.ran_for(f.couple.id(), &f.user_a));
        assert!(!f.archiver.ran_for(f.couple.id(), &f.user_b));
    }

    #[tokio::test]
    async fn archiver_failure_does_not_block_dissolution() {
        let f = fixture();
        f.archiver.fail(true);

        let result = f
            .handler
            .handle(
                InitiateDissolutionCommand {
                    user_id: f.user_a,
                    keep_learnings: true,
                },
                metadata(f.user_a),
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(
            f.couples.get(f.couple.id()).unwrap().status(),
            CoupleStatus::PendingDissolution
        );
    }

    #[tokio::test]
    async fn unpaired_user_is_not_in_couple() {
        let f = fixture();
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let lonely = UserId::new();
        profiles.insert_user(lonely, "Riley");
        let handler = InitiateDissolutionHandler::new(
            f.couples.clone(),
            profiles,
            f.agreements.clone(),
            f.archiver.clone(),
            f.events.clone(),
        );

        let result = handler
            .handle(
                InitiateDissolutionCommand {
                    user_id: lonely,
                    keep_learnings: false,
                },
                metadata(lonely),
            )
            .await;
        assert_eq!(result.unwrap_err(), CoupleError::NotInCouple);
    }

    #[tokio::test]
    async fn second_initiate_conflicts() {
        let f = fixture();
        f.handler
            .handle(
                InitiateDissolutionCommand {
                    user_id: f.user_a,
                    keep_learnings: false,
                },
                metadata(f.user_a),
            )
            .await
            .unwrap();

        let result = f
            .handler
            .handle(
                InitiateDissolutionCommand {
                    user_id: f.user_b,
                    keep_learnings: true,
                },
                metadata(f.user_b),
            )
            .await;
        assert!(matches!(result, Err(CoupleError::InvalidState(_))));
    }
}
