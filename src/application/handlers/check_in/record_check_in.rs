//! RecordCheckInHandler - appends a check-in and updates the streak.
//!
//! Two rows change here (the new check-in and the agreement), so the
//! writes are ordered with a compensation: the check-in row lands first,
//! then the agreement update guarded on it still being active. If the
//! guard misses, the check-in row is deleted again and the conflict
//! surfaces.
//!
//! Due-ness is deliberately not enforced; early check-ins are voluntary
//! and the UI surfaces `is_check_in_due` before offering the call.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::agreement::{Agreement, AgreementError, CheckIn, CheckInRecorded};
use crate::domain::foundation::{
    AgreementId, AgreementStatus, CheckInId, CheckInStatus, CommandMetadata, EventId,
    SerializableDomainEvent, Timestamp, UserId,
};
use crate::ports::{AgreementRepository, CheckInRepository, CoupleRepository, EventPublisher};

/// Command to record a check-in.
#[derive(Debug, Clone)]
pub struct RecordCheckInCommand {
    pub agreement_id: AgreementId,
    pub user_id: UserId,
    pub status: CheckInStatus,
    pub what_worked: Option<String>,
    pub what_was_hard: Option<String>,
}

/// Result of recording a check-in.
#[derive(Debug, Clone)]
pub struct RecordCheckInResult {
    pub agreement: Agreement,
    pub check_in: CheckIn,
}

/// Handler for recording check-ins.
pub struct RecordCheckInHandler {
    couples: Arc<dyn CoupleRepository>,
    agreements: Arc<dyn AgreementRepository>,
    check_ins: Arc<dyn CheckInRepository>,
    events: Arc<dyn EventPublisher>,
}

impl RecordCheckInHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        agreements: Arc<dyn AgreementRepository>,
        check_ins: Arc<dyn CheckInRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            agreements,
            check_ins,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordCheckInCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordCheckInResult, AgreementError> {
        let mut agreement = self
            .agreements
            .find_by_id(&cmd.agreement_id)
            .await?
            .ok_or(AgreementError::NotFound(cmd.agreement_id))?;

        let couple = self
            .couples
            .find_by_id(agreement.couple_id())
            .await?
            .ok_or_else(|| {
                AgreementError::infrastructure(format!(
                    "Couple {} missing for agreement {}",
                    agreement.couple_id(),
                    agreement.id()
                ))
            })?;

        if !agreement.can_check_in(&cmd.user_id, &couple) {
            return Err(AgreementError::Forbidden);
        }

        let now = Timestamp::now();
        let expected = agreement.status();
        // Rejects anything but an active agreement with NotActive.
        agreement.record_check_in(cmd.status, now)?;

        let check_in = CheckIn::new(
            CheckInId::new(),
            cmd.agreement_id,
            cmd.user_id,
            cmd.status,
            cmd.what_worked,
            cmd.what_was_hard,
            now,
        )?;
        self.check_ins.save(&check_in).await?;

        if let Err(step_err) = self
            .agreements
            .update_guarded(&agreement, expected)
            .await
        {
            if let Err(comp_err) = self.check_ins.delete(&check_in.id).await {
                error!(
                    check_in_id = %check_in.id,
                    error = %comp_err,
                    "check-in compensation failed: orphan row left behind"
                );
            }
            return Err(step_err.into());
        }

        debug_assert_eq!(expected, AgreementStatus::Active);

        let envelope = CheckInRecorded {
            event_id: EventId::new(),
            check_in_id: check_in.id,
            agreement_id: cmd.agreement_id,
            status: cmd.status,
            success_streak: agreement.success_streak(),
            occurred_at: now,
        }
        .to_envelope()
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish check-in event");
        }

        Ok(RecordCheckInResult {
            agreement,
            check_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryAgreementRepository, InMemoryCheckInRepository, InMemoryCoupleRepository,
    };
    use crate::domain::agreement::NewAgreement;
    use crate::domain::couple::Couple;
    use crate::domain::foundation::{AgreementKind, CoupleId};

    struct Fixture {
        agreements: Arc<InMemoryAgreementRepository>,
        check_ins: Arc<InMemoryCheckInRepository>,
        events: Arc<InMemoryEventBus>,
        handler: RecordCheckInHandler,
        couple: Couple,
        user_a: UserId,
        user_b: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let agreements = Arc::new(InMemoryAgreementRepository::new());
        let check_ins = Arc::new(InMemoryCheckInRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let user_a = UserId::new();
        let user_b = UserId::new();
        let couple = Couple::form(CoupleId::new(), user_a, user_b).unwrap();
        couples.insert(couple.clone());

        let handler = RecordCheckInHandler::new(
            couples,
            agreements.clone(),
            check_ins.clone(),
            events.clone(),
        );

        Fixture {
            agreements,
            check_ins,
            events,
            handler,
            couple,
            user_a,
            user_b,
        }
    }

    fn seed_active(f: &Fixture, responsible: Option<UserId>) -> Agreement {
        let agreement = Agreement::propose(
            AgreementId::new(),
            NewAgreement {
                couple_id: *f.couple.id(),
                created_by: f.user_a,
                title: "Check in before bed".to_string(),
                description: None,
                underlying_need: None,
                kind: AgreementKind::Communication,
                themes: vec![],
                responsible_user_id: responsible.or(Some(f.user_a)),
                check_in_frequency_days: 7,
                created_in_session_id: None,
            },
            &f.couple,
        )
        .unwrap();
        f.agreements.insert(agreement.clone());
        agreement
    }

    fn cmd(agreement: &Agreement, user: UserId, status: CheckInStatus) -> RecordCheckInCommand {
        RecordCheckInCommand {
            agreement_id: *agreement.id(),
            user_id: user,
            status,
            what_worked: None,
            what_was_hard: None,
        }
    }

    fn metadata(user: UserId) -> CommandMetadata {
        CommandMetadata::new(user).with_correlation_id("test")
    }

    #[tokio::test]
    async fn streak_follows_the_good_good_difficult_good_sequence() {
        let f = fixture();
        let agreement = seed_active(&f, None);

        let sequence = [
            (CheckInStatus::Good, 1),
            (CheckInStatus::Good, 2),
            (CheckInStatus::Difficult, 0),
            (CheckInStatus::Good, 1),
        ];
        for (status, expected_streak) in sequence {
            let result = f
                .handler
                .handle(cmd(&agreement, f.user_a, status), metadata(f.user_a))
                .await
                .unwrap();
            assert_eq!(result.agreement.success_streak(), expected_streak);
        }
        assert_eq!(f.check_ins.all().len(), 4);
    }

    #[tokio::test]
    async fn check_in_reschedules_the_next_one() {
        let f = fixture();
        let agreement = seed_active(&f, None);

        let result = f
            .handler
            .handle(
                cmd(&agreement, f.user_a, CheckInStatus::Partial),
                metadata(f.user_a),
            )
            .await
            .unwrap();

        let reported_at = result.check_in.created_at;
        assert_eq!(
            *result.agreement.next_check_in_at(),
            reported_at.add_days(7)
        );
        assert_eq!(result.agreement.success_streak(), 1);
    }

    #[tokio::test]
    async fn non_responsible_member_is_forbidden() {
        let f = fixture();
        let agreement = seed_active(&f, Some(f.user_a));

        let result = f
            .handler
            .handle(
                cmd(&agreement, f.user_b, CheckInStatus::Good),
                metadata(f.user_b),
            )
            .await;
        assert_eq!(result.unwrap_err(), AgreementError::Forbidden);
        assert!(f.check_ins.all().is_empty());
    }

    #[tokio::test]
    async fn paused_agreement_rejects_check_ins() {
        let f = fixture();
        let mut agreement = seed_active(&f, None);
        agreement.pause().unwrap();
        f.agreements.insert(agreement.clone());

        let result = f
            .handler
            .handle(
                cmd(&agreement, f.user_a, CheckInStatus::Good),
                metadata(f.user_a),
            )
            .await;
        assert_eq!(result.unwrap_err(), AgreementError::NotActive);
    }

    #[tokio::test]
    async fn failed_agreement_update_deletes_the_check_in_row() {
        let f = fixture();
        let agreement = seed_active(&f, None);
        f.agreements.fail_update(true);

        let result = f
            .handler
            .handle(
                cmd(&agreement, f.user_a, CheckInStatus::Good),
                metadata(f.user_a),
            )
            .await;

        assert!(result.is_err());
        // The appended row was compensated away.
        assert!(f.check_ins.all().is_empty());
        assert_eq!(f.check_ins.deleted_ids().len(), 1);
        assert_eq!(f.events.event_count(), 0);
    }

    #[tokio::test]
    async fn successful_check_in_publishes_event() {
        let f = fixture();
        let agreement = seed_active(&f, None);

        f.handler
            .handle(
                cmd(&agreement, f.user_a, CheckInStatus::Good),
                metadata(f.user_a),
            )
            .await
            .unwrap();
        assert!(f.events.has_event("agreement.check_in_recorded"));
    }

    #[tokio::test]
    async fn missing_agreement_is_not_found() {
        let f = fixture();
        let result = f
            .handler
            .handle(
                RecordCheckInCommand {
                    agreement_id: AgreementId::new(),
                    user_id: f.user_a,
                    status: CheckInStatus::Good,
                    what_worked: None,
                    what_was_hard: None,
                },
                metadata(f.user_a),
            )
            .await;
        assert!(matches!(result, Err(AgreementError::NotFound(_))));
    }
}
