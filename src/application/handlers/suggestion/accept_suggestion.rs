//! AcceptSuggestionHandler - turns a pending suggestion into an agreement.
//!
//! Exactly one agreement may ever be created from a suggestion, so the
//! sequence claims the suggestion first with a compare-and-set
//! (`pending -> accepted`), then creates the agreement, then links it
//! back. A racing accept or dismiss loses the claim and sees
//! `AlreadyResolved` without a second agreement ever existing. If
//! agreement creation fails after the claim, the claim is reverted.
//!
//! A failure on the final back-link leaves an accepted suggestion
//! without `created_agreement_id`. That is deliberately NOT compensated
//! by deleting the agreement: the accept itself succeeded, and reverting
//! the claim would reopen the door to a duplicate agreement. The gap is
//! logged and the storage failure surfaces to the caller.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::agreement::{
    Agreement, AgreementActivated, AgreementCreated, NewAgreement,
};
use crate::domain::foundation::{
    AgreementId, AgreementKind, AgreementStatus, CommandMetadata, EventId, ResponsibleParty,
    SerializableDomainEvent, SuggestionId, Timestamp, UserId,
};
use crate::domain::suggestion::{Suggestion, SuggestionAccepted, SuggestionError};
use crate::ports::{AgreementRepository, CoupleRepository, EventPublisher, SuggestionRepository};

/// Default cadence when neither the suggestion flow nor the accepting
/// member picked one.
const DEFAULT_CHECK_IN_FREQUENCY_DAYS: u32 = 7;

/// Member edits applied on top of the suggestion at acceptance.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEdits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub underlying_need: Option<String>,
    pub kind: Option<AgreementKind>,
    pub responsible: Option<ResponsibleParty>,
    pub check_in_frequency_days: Option<u32>,
    pub themes: Option<Vec<String>>,
}

/// Command to accept a suggestion.
#[derive(Debug, Clone)]
pub struct AcceptSuggestionCommand {
    pub suggestion_id: SuggestionId,
    pub user_id: UserId,
    pub edits: SuggestionEdits,
}

/// Result of accepting a suggestion.
#[derive(Debug, Clone)]
pub struct AcceptSuggestionResult {
    pub agreement: Agreement,
    pub suggestion: Suggestion,
    pub needs_partner_approval: bool,
}

/// Handler for accepting suggestions.
pub struct AcceptSuggestionHandler {
    couples: Arc<dyn CoupleRepository>,
    suggestions: Arc<dyn SuggestionRepository>,
    agreements: Arc<dyn AgreementRepository>,
    events: Arc<dyn EventPublisher>,
}

impl AcceptSuggestionHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        suggestions: Arc<dyn SuggestionRepository>,
        agreements: Arc<dyn AgreementRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            couples,
            suggestions,
            agreements,
            events,
        }
    }

    pub async fn handle(
        &self,
        cmd: AcceptSuggestionCommand,
        metadata: CommandMetadata,
    ) -> Result<AcceptSuggestionResult, SuggestionError> {
        let suggestion = self
            .suggestions
            .find_by_id(&cmd.suggestion_id)
            .await?
            .ok_or(SuggestionError::NotFound(cmd.suggestion_id))?;

        let couple = self
            .couples
            .find_by_id(suggestion.couple_id())
            .await?
            .ok_or_else(|| {
                SuggestionError::infrastructure(format!(
                    "Couple {} missing for suggestion {}",
                    suggestion.couple_id(),
                    suggestion.id()
                ))
            })?;

        if !suggestion.status().is_pending() {
            return Err(SuggestionError::AlreadyResolved);
        }
        // Callers map this to a "waiting on partner" state when the
        // responsible party is the other member.
        if !suggestion.can_be_accepted_by(&cmd.user_id, &couple) {
            return Err(SuggestionError::Forbidden);
        }

        let now = Timestamp::now();

        // Claim the suggestion before creating anything; the CAS is
        // what guarantees at most one agreement per suggestion.
        let claimed = self
            .suggestions
            .mark_accepted(&cmd.suggestion_id, &cmd.user_id, &now)
            .await?;
        if !claimed {
            return Err(SuggestionError::AlreadyResolved);
        }

        let responsible_party = cmd.edits.responsible.unwrap_or(suggestion.responsible());
        let responsible_user_id = match responsible_party {
            ResponsibleParty::Both => None,
            ResponsibleParty::UserA => Some(*couple.user_a()),
            ResponsibleParty::UserB => Some(*couple.user_b()),
        };

        let params = NewAgreement {
            couple_id: *suggestion.couple_id(),
            created_by: cmd.user_id,
            title: cmd
                .edits
                .title
                .unwrap_or_else(|| suggestion.title().to_string()),
            description: cmd.edits.description,
            underlying_need: cmd
                .edits
                .underlying_need
                .or_else(|| suggestion.underlying_need().map(str::to_string)),
            kind: cmd.edits.kind.unwrap_or_default(),
            themes: cmd.edits.themes.unwrap_or_default(),
            responsible_user_id,
            check_in_frequency_days: cmd
                .edits
                .check_in_frequency_days
                .unwrap_or(DEFAULT_CHECK_IN_FREQUENCY_DAYS),
            created_in_session_id: suggestion.session_id().copied(),
        };

        let agreement = match Agreement::propose(AgreementId::new(), params, &couple) {
            Ok(agreement) => agreement,
            Err(domain_err) => {
                self.revert_claim(&cmd.suggestion_id).await;
                return Err(domain_err.into());
            }
        };

        if let Err(step_err) = self.agreements.save(&agreement).await {
            self.revert_claim(&cmd.suggestion_id).await;
            return Err(step_err.into());
        }

        if let Err(link_err) = self
            .suggestions
            .link_agreement(&cmd.suggestion_id, agreement.id())
            .await
        {
            // The accept stands; see the module docs for why this gap
            // is tolerated rather than compensated.
            error!(
                suggestion_id = %cmd.suggestion_id,
                agreement_id = %agreement.id(),
                error = %link_err,
                "accepted suggestion left without its agreement back-link"
            );
            return Err(link_err.into());
        }

        let needs_partner_approval = agreement.status() == AgreementStatus::PendingApproval;

        let mut envelopes = vec![
            SuggestionAccepted {
                event_id: EventId::new(),
                suggestion_id: cmd.suggestion_id,
                agreement_id: *agreement.id(),
                accepted_by: cmd.user_id,
                occurred_at: now,
            }
            .to_envelope(),
            AgreementCreated {
                event_id: EventId::new(),
                agreement_id: *agreement.id(),
                couple_id: *agreement.couple_id(),
                created_by: cmd.user_id,
                needs_partner_approval,
                occurred_at: now,
            }
            .to_envelope(),
        ];
        if agreement.status() == AgreementStatus::Active {
            envelopes.push(
                AgreementActivated {
                    event_id: EventId::new(),
                    agreement_id: *agreement.id(),
                    couple_id: *agreement.couple_id(),
                    occurred_at: now,
                }
                .to_envelope(),
            );
        }
        let envelopes = envelopes
            .into_iter()
            .map(|e| {
                e.with_correlation_id(metadata.correlation_id())
                    .with_user_id(metadata.user_id.to_string())
            })
            .collect();
        if let Err(e) = self.events.publish_all(envelopes).await {
            warn!(error = %e, "failed to publish suggestion acceptance events");
        }

        let suggestion = self
            .suggestions
            .find_by_id(&cmd.suggestion_id)
            .await?
            .ok_or(SuggestionError::NotFound(cmd.suggestion_id))?;

        Ok(AcceptSuggestionResult {
            agreement,
            suggestion,
            needs_partner_approval,
        })
    }

    async fn revert_claim(&self, suggestion_id: &SuggestionId) {
        if let Err(comp_err) = self.suggestions.revert_to_pending(suggestion_id).await {
            error!(
                suggestion_id = %suggestion_id,
                error = %comp_err,
                "acceptance compensation failed: suggestion stuck in accepted state"
            );
        }
    }
}
