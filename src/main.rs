//! Accord server binary: configuration, tracing, storage, routing.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use accord::adapters::events::TracingEventPublisher;
use accord::adapters::http::{
    agreement_routes, couple_routes, suggestion_routes, AgreementHandlers, CoupleHandlers,
    SuggestionHandlers,
};
use accord::adapters::postgres::{
    PostgresAgreementRepository, PostgresCheckInRepository, PostgresCoupleRepository,
    PostgresInviteCodeRepository, PostgresLearningArchiver, PostgresProfileRepository,
    PostgresSuggestionRepository,
};
use accord::application::handlers::agreement::{
    CreateAgreementHandler, ListAgreementsHandler, TransitionAgreementHandler,
};
use accord::application::handlers::check_in::RecordCheckInHandler;
use accord::application::handlers::dissolution::{
    CancelDissolutionHandler, ConfirmDissolutionHandler, GetCoupleStatusHandler,
    InitiateDissolutionHandler,
};
use accord::application::handlers::pairing::{IssueInviteCodeHandler, RedeemInviteCodeHandler};
use accord::application::handlers::suggestion::{
    AcceptSuggestionHandler, DismissSuggestionHandler, IngestSuggestionHandler,
    ListSuggestionsHandler,
};
use accord::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!(environment = ?config.server.environment, "starting accord");

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Repositories
    let couples = Arc::new(PostgresCoupleRepository::new(pool.clone()));
    let profiles = Arc::new(PostgresProfileRepository::new(pool.clone()));
    let invites = Arc::new(PostgresInviteCodeRepository::new(pool.clone()));
    let agreements = Arc::new(PostgresAgreementRepository::new(pool.clone()));
    let check_ins = Arc::new(PostgresCheckInRepository::new(pool.clone()));
    let suggestions = Arc::new(PostgresSuggestionRepository::new(pool.clone()));
    let archiver = Arc::new(PostgresLearningArchiver::new(pool.clone()));
    let events = Arc::new(TracingEventPublisher::new());

    // Application handlers
    let issue = Arc::new(IssueInviteCodeHandler::new(
        profiles.clone(),
        invites.clone(),
    ));
    let redeem = Arc::new(RedeemInviteCodeHandler::new(
        couples.clone(),
        profiles.clone(),
        invites.clone(),
        events.clone(),
    ));
    let couple_status = Arc::new(GetCoupleStatusHandler::new(
        couples.clone(),
        profiles.clone(),
    ));
    let initiate = Arc::new(InitiateDissolutionHandler::new(
        couples.clone(),
        profiles.clone(),
        agreements.clone(),
        archiver.clone(),
        events.clone(),
    ));
    let confirm = Arc::new(ConfirmDissolutionHandler::new(
        couples.clone(),
        profiles.clone(),
        archiver.clone(),
        events.clone(),
    ));
    let cancel = Arc::new(CancelDissolutionHandler::new(
        couples.clone(),
        profiles.clone(),
        events.clone(),
    ));

    let create_agreement = Arc::new(CreateAgreementHandler::new(
        couples.clone(),
        agreements.clone(),
        events.clone(),
    ));
    let transition_agreement = Arc::new(TransitionAgreementHandler::new(
        couples.clone(),
        agreements.clone(),
        events.clone(),
    ));
    let list_agreements = Arc::new(ListAgreementsHandler::new(
        couples.clone(),
        agreements.clone(),
        check_ins.clone(),
    ));
    let record_check_in = Arc::new(RecordCheckInHandler::new(
        couples.clone(),
        agreements.clone(),
        check_ins.clone(),
        events.clone(),
    ));

    let ingest_suggestion = Arc::new(IngestSuggestionHandler::new(
        couples.clone(),
        suggestions.clone(),
        events.clone(),
    ));
    let accept_suggestion = Arc::new(AcceptSuggestionHandler::new(
        couples.clone(),
        suggestions.clone(),
        agreements.clone(),
        events.clone(),
    ));
    let dismiss_suggestion = Arc::new(DismissSuggestionHandler::new(
        couples.clone(),
        suggestions.clone(),
        events.clone(),
    ));
    let list_suggestions = Arc::new(ListSuggestionsHandler::new(
        couples.clone(),
        suggestions.clone(),
    ));

    // Routers
    let agreements_api = agreement_routes(AgreementHandlers::new(
        create_agreement,
        transition_agreement,
        list_agreements,
        record_check_in,
        accept_suggestion.clone(),
    ))
    .merge(suggestion_routes(SuggestionHandlers::new(
        ingest_suggestion,
        accept_suggestion,
        dismiss_suggestion,
        list_suggestions,
    )));

    let couple_api = couple_routes(CoupleHandlers::new(
        issue,
        redeem,
        couple_status,
        initiate,
        confirm,
        cancel,
    ));

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .nest("/api/agreements", agreements_api)
        .nest("/api/couple", couple_api)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
