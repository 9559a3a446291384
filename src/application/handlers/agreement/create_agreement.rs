//! CreateAgreementHandler - proposes a new agreement within a couple.

use std::sync::Arc;

use tracing::warn;

use crate::domain::agreement::{
    Agreement, AgreementActivated, AgreementCreated, AgreementError, NewAgreement,
};
use crate::domain::foundation::{
    AgreementId, AgreementKind, AgreementStatus, CommandMetadata, CoupleId, CoupleStatus, EventId,
    SerializableDomainEvent, SessionId, Timestamp, UserId,
};
use crate::ports::{AgreementRepository, CoupleRepository, EventPublisher};

/// Command to create an agreement.
#[derive(Debug, Clone)]
pub struct CreateAgreementCommand {
    pub couple_id: CoupleId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub underlying_need: Option<String>,
    pub kind: AgreementKind,
    pub themes: Vec<String>,
    pub responsible_user_id: Option<UserId>,
    pub check_in_frequency_days: u32,
    pub session_id: Option<SessionId>,
}

/// Result of creating an agreement.
#[derive(Debug, Clone)]
pub struct CreateAgreementResult {
    pub agreement: Agreement,
    pub needs_partner_approval: bool,
}

/// Handler for creating agreements.
pub struct CreateAgreementHandler {
    couples: Arc<dyn CoupleRepository>,
    agreements: Arc<dyn AgreementRepository>,
    events: Arc<dyn EventPublisher>,
}

impl CreateAgreementHandler {
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
        cmd: CreateAgreementCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateAgreementResult, AgreementError> {
        let couple = self
            .couples
            .find_by_id(&cmd.couple_id)
            .await?
            .ok_or(AgreementError::CoupleNotFound(cmd.couple_id))?;

        if couple.status() != CoupleStatus::Active {
            return Err(AgreementError::invalid_state(
                "New agreements require an active couple",
            ));
        }

        let agreement = Agreement::propose(
            AgreementId::new(),
            NewAgreement {
                couple_id: cmd.couple_id,
                created_by: cmd.user_id,
                title: cmd.title,
                description: cmd.description,
                underlying_need: cmd.underlying_need,
                kind: cmd.kind,
                themes: cmd.themes,
                responsible_user_id: cmd.responsible_user_id,
                check_in_frequency_days: cmd.check_in_frequency_days,
                created_in_session_id: cmd.session_id,
            },
            &couple,
        )?;

        self.agreements.save(&agreement).await?;

        let needs_partner_approval = agreement.status() == AgreementStatus::PendingApproval;

        let now = Timestamp::now();
        let mut envelopes = vec![AgreementCreated {
            event_id: EventId::new(),
            agreement_id: *agreement.id(),
            couple_id: cmd.couple_id,
            created_by: cmd.user_id,
            needs_partner_approval,
            occurred_at: now,
        }
        .to_envelope()];
        if agreement.status() == AgreementStatus::Active {
            envelopes.push(
                AgreementActivated {
                    event_id: EventId::new(),
                    agreement_id: *agreement.id(),
                    couple_id: cmd.couple_id,
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
            warn!(error = %e, "failed to publish agreement creation events");
        }

        Ok(CreateAgreementResult {
            agreement,
            needs_partner_approval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryAgreementRepository, InMemoryCoupleRepository};
    use crate::domain::couple::Couple;

    struct Fixture {
        agreements: Arc<InMemoryAgreementRepository>,
        events: Arc<InMemoryEventBus>,
        handler: CreateAgreementHandler,
        couple: Couple,
        user_a: UserId,
        user_b: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let agreements = Arc::new(InMemoryAgreementRepository::new());
        let events = Arc::new(InMemoryEventBus::new());

        let user_a = UserId::new();
        let user_b = UserId::new();
        let couple = Couple::form(CoupleId::new(), user_a, user_b).unwrap();
        couples.insert(couple.clone());

        let handler =
            CreateAgreementHandler::new(couples, agreements.clone(), events.clone());

        Fixture {
            agreements,
            events,
            handler,
            couple,
            user_a,
            user_b,
        }
    }

    fn command(f: &Fixture) -> CreateAgreementCommand {
        CreateAgreementCommand {
            couple_id: *f.couple.id(),
            user_id: f.user_a,
            title: "Phone-free dinners".to_string(),
            description: None,
            underlying_need: Some("presence".to_string()),
            kind: AgreementKind::Behavior,
            themes: vec!["attention".to_string()],
            responsible_user_id: None,
            check_in_frequency_days: 7,
            session_id: None,
        }
    }

    fn metadata(user: UserId) -> CommandMetadata {
        CommandMetadata::new(user).with_correlation_id("test")
    }

    #[tokio::test]
    async fn joint_agreement_needs_partner_approval() {
        let f = fixture();
        let result = f
            .handler
            .handle(command(&f), metadata(f.user_a))
            .await
            .unwrap();

        assert!(result.needs_partner_approval);
        assert_eq!(result.agreement.status(), AgreementStatus::PendingApproval);
        assert!(f.agreements.get(result.agreement.id()).is_some());
        assert!(f.events.has_event("agreement.created"));
        assert!(!f.events.has_event("agreement.activated"));
    }

    #[tokio::test]
    async fn self_responsible_agreement_activates_immediately() {
        let f = fixture();
        let mut cmd = command(&f);
        cmd.responsible_user_id = Some(f.user_a);

        let result = f.handler.handle(cmd, metadata(f.user_a)).await.unwrap();
        assert!(!result.needs_partner_approval);
        assert_eq!(result.agreement.status(), AgreementStatus::Active);
        assert!(f.events.has_event("agreement.activated"));
    }

    #[tokio::test]
    async fn joint_session_agreement_activates_immediately() {
        let f = fixture();
        let mut cmd = command(&f);
        cmd.session_id = Some(SessionId::new());

        let result = f.handler.handle(cmd, metadata(f.user_b)).await.unwrap();
        assert!(!result.needs_partner_approval);
        assert_eq!(result.agreement.status(), AgreementStatus::Active);
    }

    #[tokio::test]
    async fn unknown_couple_is_not_found() {
        let f = fixture();
        let mut cmd = command(&f);
        cmd.couple_id = CoupleId::new();

        let result = f.handler.handle(cmd, metadata(f.user_a)).await;
        assert!(matches!(result, Err(AgreementError::CoupleNotFound(_))));
    }

    #[tokio::test]
    async fn outsider_creator_is_forbidden() {
        let f = fixture();
        let outsider = UserId::new();
        let mut cmd = command(&f);
        cmd.user_id = outsider;

        let result = f.handler.handle(cmd, metadata(outsider)).await;
        assert_eq!(result.unwrap_err(), AgreementError::Forbidden);
    }

    #[tokio::test]
    async fn dissolving_couple_rejects_new_agreements() {
        let f = fixture();
        let mut couple = f.couple.clone();
        couple.initiate_dissolution(&f.user_a, 0).unwrap();
        // Overwrite the stored couple with the pending-dissolution state.
        let couples = Arc::new(InMemoryCoupleRepository::new());
        couples.insert(couple);
        let handler = CreateAgreementHandler::new(
            couples,
            f.agreements.clone(),
            f.events.clone(),
        );

        let result = handler.handle(command(&f), metadata(f.user_a)).await;
        assert!(matches!(result, Err(AgreementError::InvalidState(_))));
    }

    #[tokio::test]
    async fn save_failure_surfaces_and_publishes_nothing() {
        let f = fixture();
        f.agreements.fail_save(true);

        let result = f.handler.handle(command(&f), metadata(f.user_a)).await;
        assert!(matches!(result, Err(AgreementError::Infrastructure(_))));
        assert_eq!(f.events.event_count(), 0);
    }
}
