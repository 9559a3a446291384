//! TransitionAgreementHandler - approve, pause, resume, achieve, archive.
//!
//! Approval never reads-modifies-writes the approval set: the handler
//! asks the store for an atomic add-if-absent append, then promotes
//! `pending_approval -> active` with a compare-and-set once the set is
//! complete. Losing either race to the partner's concurrent call is
//! indistinguishable from arriving second, which is what makes retries
//! safe.
//!
//! The other transitions are status-guarded single-row updates; a guard
//! miss surfaces as a stale-transition conflict rather than silently
//! overwriting whichever transition won.

use std::sync::Arc;

use tracing::warn;

use crate::domain::agreement::{
    Agreement, AgreementActivated, AgreementError, AgreementTransitioned, ApprovalOutcome,
};
use crate::domain::foundation::{
    AgreementId, AgreementStatus, CommandMetadata, EventId, SerializableDomainEvent, Timestamp,
    UserId,
};
use crate::ports::{AgreementRepository, CoupleRepository, EventPublisher};

/// Lifecycle action requested on an agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementAction {
    Approve,
    Pause,
    Resume,
    Achieve,
    Archive,
}

/// Command to transition an agreement.
#[derive(Debug, Clone)]
pub struct TransitionAgreementCommand {
    pub agreement_id: AgreementId,
    pub user_id: UserId,
    pub action: AgreementAction,
}

/// Handler for agreement lifecycle transitions.
pub struct TransitionAgreementHandler {
    couples: Arc<dyn CoupleRepository>,
    agreements: Arc<dyn AgreementRepository>,
    events: Arc<dyn EventPublisher>,
}

impl TransitionAgreementHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        agreements: Arc<dyn AgreementRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            agreements,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: TransitionAgreementCommand,
        metadata: CommandMetadata,
    ) -> Result<Agreement, AgreementError> {
        let agreement = self
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

        couple.authorize_member(&cmd.user_id)?;

        match cmd.action {
            AgreementAction::Approve => self.approve(agreement, &couple, &cmd, &metadata).await,
            _ => self.lifecycle(agreement, &cmd, &metadata).await,
        }
    }

    async fn approve(
        &self,
        mut agreement: Agreement,
        couple: &crate::domain::couple::Couple,
        cmd: &TransitionAgreementCommand,
        metadata: &CommandMetadata,
    ) -> Result<Agreement, AgreementError> {
        // Domain validation only; the authoritative write is the atomic
        // append below.
        let outcome = agreement.approve(&cmd.user_id, couple)?;
        if outcome == ApprovalOutcome::AlreadyApproved {
            return Ok(agreement);
        }

        let merged = self
            .agreements
            .append_approval(&cmd.agreement_id, &cmd.user_id)
            .await?;

        if merged.status() == AgreementStatus::PendingApproval && merged.approval_complete(couple)
        {
            let won = self
                .agreements
                .transition_status(
                    &cmd.agreement_id,
                    AgreementStatus::PendingApproval,
                    AgreementStatus::Active,
                )
                .await?;
            if won {
                self.publish(
                    AgreementActivated {
                        event_id: EventId::new(),
                        agreement_id: cmd.agreement_id,
                        couple_id: *merged.couple_id(),
                        occurred_at: Timestamp::now(),
                    }
                    .to_envelope(),
                    metadata,
                )
                .await;
            }
        }

        self.agreements
            .find_by_id(&cmd.agreement_id)
            .await?
            .ok_or(AgreementError::NotFound(cmd.agreement_id))
    }

    async fn lifecycle(
        &self,
        mut agreement: Agreement,
        cmd: &TransitionAgreementCommand,
        metadata: &CommandMetadata,
    ) -> Result<Agreement, AgreementError> {
        let expected = agreement.status();
        match cmd.action {
            AgreementAction::Pause => agreement.pause()?,
            AgreementAction::Resume => agreement.resume()?,
            AgreementAction::Achieve => agreement.achieve()?,
            AgreementAction::Archive => agreement.archive()?,
            AgreementAction::Approve => unreachable!("approve is handled separately"),
        }

        self.agreements.update_guarded(&agreement, expected).await?;

        self.publish(
            AgreementTransitioned {
                event_id: EventId::new(),
                agreement_id: *agreement.id(),
                couple_id: *agreement.couple_id(),
                from: expected,
                to: agreement.status(),
                acted_by: Some(cmd.user_id),
                occurred_at: Timestamp::now(),
            }
            .to_envelope(),
            metadata,
        )
        .await;

        Ok(agreement)
    }

    async fn publish(
        &self,
        envelope: crate::domain::foundation::EventEnvelope,
        metadata: &CommandMetadata,
    ) {
        let envelope = envelope
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());
        if let Err(e) = self.events.publish(envelope).await {
            warn!(error = %e, "failed to publish agreement event");
        }
    }
}
