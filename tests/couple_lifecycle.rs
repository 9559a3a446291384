//! End-to-end lifecycle test over the application handlers.
//!
//! Walks one couple from invite code to dissolution using the
//! in-memory adapters: pair, suggest, accept, approve, check in, and
//! finally unwind with independent keep-learnings choices.

use std::sync::Arc;

use accord::adapters::events::InMemoryEventBus;
use accord::adapters::memory::{
    InMemoryAgreementRepository, InMemoryCheckInRepository, InMemoryCoupleRepository,
    InMemoryInviteCodeRepository, InMemoryLearningArchiver, InMemoryProfileRepository,
    InMemorySuggestionRepository,
};
use accord::application::handlers::agreement::{
    AgreementAction, ListAgreementsHandler, ListAgreementsQuery, TransitionAgreementCommand,
    TransitionAgreementHandler,
};
use accord::application::handlers::check_in::{RecordCheckInCommand, RecordCheckInHandler};
use accord::application::handlers::dissolution::{
    ConfirmDissolutionCommand, ConfirmDissolutionHandler, CoupleStatusQuery,
    GetCoupleStatusHandler, InitiateDissolutionCommand, InitiateDissolutionHandler,
};
use accord::application::handlers::pairing::{
    IssueInviteCodeCommand, IssueInviteCodeHandler, RedeemInviteCodeCommand,
    RedeemInviteCodeHandler,
};
use accord::application::handlers::suggestion::{
    AcceptSuggestionCommand, AcceptSuggestionHandler, IngestSuggestionCommand,
    IngestSuggestionHandler, SuggestionEdits,
};
use accord::domain::couple::CoupleError;
use accord::domain::foundation::{
    AgreementStatus, CheckInStatus, CommandMetadata, CoupleStatus, ResponsibleParty, UserId,
};

/// Everything wired against shared in-memory stores.
struct World {
    profiles: Arc<InMemoryProfileRepository>,
    agreements: Arc<InMemoryAgreementRepository>,
    couples: Arc<InMemoryCoupleRepository>,
    archiver: Arc<InMemoryLearningArchiver>,
    events: Arc<InMemoryEventBus>,

    issue: IssueInviteCodeHandler,
    redeem: RedeemInviteCodeHandler,
    ingest: IngestSuggestionHandler,
    accept: AcceptSuggestionHandler,
    transition: TransitionAgreementHandler,
    check_in: RecordCheckInHandler,
    list: ListAgreementsHandler,
    initiate: InitiateDissolutionHandler,
    confirm: ConfirmDissolutionHandler,
    status: GetCoupleStatusHandler,
}

impl World {
    fn new() -> Self {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let invites = Arc::new(InMemoryInviteCodeRepository::new());
        let agreements = Arc::new(InMemoryAgreementRepository::new());
        let check_ins = Arc::new(InMemoryCheckInRepository::new());
        let suggestions = Arc::new(InMemorySuggestionRepository::new());
        let archiver = Arc::new(InMemoryLearningArchiver::new());
        let events = Arc::new(InMemoryEventBus::new());

        Self {
            issue: IssueInviteCodeHandler::new(profiles.clone(), invites.clone()),
            redeem: RedeemInviteCodeHandler::new(
                couples.clone(),
                profiles.clone(),
                invites.clone(),
                events.clone(),
            ),
            ingest: IngestSuggestionHandler::new(
                couples.clone(),
                suggestions.clone(),
                events.clone(),
            ),
            accept: AcceptSuggestionHandler::new(
                couples.clone(),
                suggestions.clone(),
                agreements.clone(),
                events.clone(),
            ),
            transition: TransitionAgreementHandler::new(
                couples.clone(),
                agreements.clone(),
                events.clone(),
            ),
            check_in: RecordCheckInHandler::new(
                couples.clone(),
                agreements.clone(),
                check_ins.clone(),
                events.clone(),
            ),
            list: ListAgreementsHandler::new(
                couples.clone(),
                agreements.clone(),
                check_ins.clone(),
            ),
            initiate: InitiateDissolutionHandler::new(
                couples.clone(),
                profiles.clone(),
                agreements.clone(),
                archiver.clone(),
                events.clone(),
            ),
            confirm: ConfirmDissolutionHandler::new(
                couples.clone(),
                profiles.clone(),
                archiver.clone(),
                events.clone(),
            ),
            status: GetCoupleStatusHandler::new(couples.clone(), profiles.clone()),
            profiles,
            agreements,
            couples,
            archiver,
            events,
        }
    }
}

fn meta(user: UserId) -> CommandMetadata {
    CommandMetadata::new(user).with_correlation_id("lifecycle-test")
}

#[tokio::test]
async fn full_couple_lifecycle() {
    let world = World::new();

    let alex = UserId::new();
    let jordan = UserId::new();
    world.profiles.insert_user(alex, "Alex");
    world.profiles.insert_user(jordan, "Jordan");

    // ── Pairing ──────────────────────────────────────────────────────────

    let issued = world
        .issue
        .handle(IssueInviteCodeCommand { user_id: alex })
        .await
        .unwrap();

    let paired = world
        .redeem
        .handle(
            RedeemInviteCodeCommand {
                user_id: jordan,
                code: issued.code.clone(),
            },
            meta(jordan),
        )
        .await
        .unwrap();
    assert_eq!(paired.partner_name, "Alex");

    // Both profiles point at the same couple.
    let couple_id = paired.couple_id;
    assert_eq!(world.profiles.get(&alex).unwrap().couple_id, Some(couple_id));
    assert_eq!(
        world.profiles.get(&jordan).unwrap().couple_id,
        Some(couple_id)
    );

    // A third user cannot reuse the consumed code.
    let riley = UserId::new();
    world.profiles.insert_user(riley, "Riley");
    let replay = world
        .redeem
        .handle(
            RedeemInviteCodeCommand {
                user_id: riley,
                code: issued.code,
            },
            meta(riley),
        )
        .await;
    assert_eq!(replay.unwrap_err(), CoupleError::InvalidOrExpiredCode);

    // ── Suggestion intake -> agreement ───────────────────────────────────

    let suggestion = world
        .ingest
        .handle(IngestSuggestionCommand {
            couple_id,
            session_id: None,
            title: "Weekly appreciation exchange".to_string(),
            underlying_need: Some("feeling valued".to_string()),
            responsible: ResponsibleParty::Both,
        })
        .await
        .unwrap();

    let accepted = world
        .accept
        .handle(
            AcceptSuggestionCommand {
                suggestion_id: *suggestion.id(),
                user_id: alex,
                edits: SuggestionEdits {
                    check_in_frequency_days: Some(7),
                    ..Default::default()
                },
            },
            meta(alex),
        )
        .await
        .unwrap();

    let agreement_id = *accepted.agreement.id();
    assert_eq!(
        accepted.suggestion.created_agreement_id(),
        Some(&agreement_id)
    );
    // No originating session, jointly responsible: Jordan still has to
    // approve.
    assert!(accepted.needs_partner_approval);

    // ── Approval ─────────────────────────────────────────────────────────

    let active = world
        .transition
        .handle(
            TransitionAgreementCommand {
                agreement_id,
                user_id: jordan,
                action: AgreementAction::Approve,
            },
            meta(jordan),
        )
        .await
        .unwrap();
    assert_eq!(active.status(), AgreementStatus::Active);

    // ── Check-ins ────────────────────────────────────────────────────────

    for (status, expected_streak) in [
        (CheckInStatus::Good, 1),
        (CheckInStatus::Partial, 2),
        (CheckInStatus::NeedsChange, 0),
    ] {
        let result = world
            .check_in
            .handle(
                RecordCheckInCommand {
                    agreement_id,
                    user_id: jordan,
                    status,
                    what_worked: None,
                    what_was_hard: None,
                },
                meta(jordan),
            )
            .await
            .unwrap();
        assert_eq!(result.agreement.success_streak(), expected_streak);
    }

    let listed = world
        .list
        .handle(ListAgreementsQuery {
            couple_id,
            user_id: alex,
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].recent_check_ins.len(), 3);
    // 2 of 3 recent check-ins succeeded.
    assert_eq!(listed.items[0].recent_success_rate, Some(67));

    // ── Dissolution with independent choices ─────────────────────────────

    let initiated = world
        .initiate
        .handle(
            InitiateDissolutionCommand {
                user_id: alex,
                keep_learnings: false,
            },
            meta(alex),
        )
        .await
        .unwrap();
    assert_eq!(initiated.agreements_dissolved, 1);
    assert_eq!(
        world.agreements.get(&agreement_id).unwrap().status(),
        AgreementStatus::DissolvedWithCouple
    );

    // The partner sees the pending handshake.
    let jordan_view = world
        .status
        .handle(CoupleStatusQuery { user_id: jordan })
        .await
        .unwrap();
    assert_eq!(jordan_view.status, CoupleStatus::PendingDissolution);
    assert!(
        jordan_view
            .pending_dissolution
            .unwrap()
            .awaiting_your_confirmation
    );

    let dissolved = world
        .confirm
        .handle(
            ConfirmDissolutionCommand {
                user_id: jordan,
                keep_learnings: true,
            },
            meta(jordan),
        )
        .await
        .unwrap();
    assert_eq!(dissolved.status(), CoupleStatus::Dissolved);

    // Each member's choice was honored independently: only Jordan's
    // extraction ran, and both rows kept their own values.
    assert!(world.archiver.ran_for(&couple_id, &jordan));
    assert!(!world.archiver.ran_for(&couple_id, &alex));
    assert!(!world.couples.choice(&couple_id, &alex).unwrap().keep_learnings);
    assert!(world.couples.choice(&couple_id, &jordan).unwrap().keep_learnings);

    // Both profiles are unlinked again.
    for user in [alex, jordan] {
        let profile = world.profiles.get(&user).unwrap();
        assert!(profile.couple_id.is_none());
        assert!(profile.partner_id.is_none());
    }

    // The whole journey left an event trail.
    for event_type in [
        "couple.formed",
        "suggestion.received",
        "suggestion.accepted",
        "agreement.created",
        "agreement.activated",
        "agreement.check_in_recorded",
        "couple.dissolution_initiated",
        "couple.dissolution_confirmed",
    ] {
        assert!(
            world.events.has_event(event_type),
            "missing event {}",
            event_type
        );
    }
}
