//! HTTP handlers for agreement endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{error_response, invalid_input};
use crate::application::handlers::agreement::{
    AgreementAction, CreateAgreementCommand, CreateAgreementHandler, ListAgreementsHandler,
    ListAgreementsQuery, TransitionAgreementCommand, TransitionAgreementHandler,
};
use crate::application::handlers::check_in::{RecordCheckInCommand, RecordCheckInHandler};
use crate::application::handlers::suggestion::{
    AcceptSuggestionCommand, AcceptSuggestionHandler, SuggestionEdits,
};
use crate::domain::agreement::AgreementError;
use crate::domain::foundation::{
    AgreementId, AgreementStatus, CommandMetadata, CoupleId, SessionId, SuggestionId, UserId,
};
use crate::domain::suggestion::SuggestionError;

use super::dto::{
    AgreementActionDto, AgreementListResponse, AgreementResponse, CreateAgreementRequest,
    CreateAgreementResponse, ListAgreementsParams, RecordCheckInRequest,
    TransitionAgreementRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AgreementHandlers {
    create_handler: Arc<CreateAgreementHandler>,
    transition_handler: Arc<TransitionAgreementHandler>,
    list_handler: Arc<ListAgreementsHandler>,
    check_in_handler: Arc<RecordCheckInHandler>,
    /// POST /agreements with `fromSuggestionId` routes through the
    /// suggestion intake so the suggestion resolves exactly once.
    accept_handler: Arc<AcceptSuggestionHandler>,
}

impl AgreementHandlers {
    pub fn new(
        create_handler: Arc<CreateAgreementHandler>,
        transition_handler: Arc<TransitionAgreementHandler>,
        list_handler: Arc<ListAgreementsHandler>,
        check_in_handler: Arc<RecordCheckInHandler>,
        accept_handler: Arc<AcceptSuggestionHandler>,
    ) -> Self {
        Self {
            create_handler,
            transition_handler,
            list_handler,
            check_in_handler,
            accept_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/agreements - Enriched agreement list for a couple
pub async fn list_agreements(
    State(handlers): State<AgreementHandlers>,
    Query(params): Query<ListAgreementsParams>,
) -> Response {
    let couple_id = match params.couple_id.parse::<CoupleId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid couple ID"),
    };
    let user_id = match params.user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid user ID"),
    };
    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => match AgreementStatus::parse(raw) {
            Some(status) => Some(status),
            None => return invalid_input("Invalid agreement status filter"),
        },
    };

    match handlers
        .list_handler
        .handle(ListAgreementsQuery {
            couple_id,
            user_id,
            status,
        })
        .await
    {
        Ok(list) => {
            let response: AgreementListResponse = list.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_agreement_error(e),
    }
}

/// POST /api/agreements - Create an agreement (directly or from a suggestion)
pub async fn create_agreement(
    State(handlers): State<AgreementHandlers>,
    Json(req): Json<CreateAgreementRequest>,
) -> Response {
    let couple_id = match req.couple_id.parse::<CoupleId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid couple ID"),
    };
    let user_id = match req.user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid user ID"),
    };
    let responsible_user_id = match &req.responsible_user_id {
        None => None,
        Some(raw) => match raw.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(_) => return invalid_input("Invalid responsible user ID"),
        },
    };
    let session_id = match &req.session_id {
        None => None,
        Some(raw) => match raw.parse::<SessionId>() {
            Ok(id) => Some(id),
            Err(_) => return invalid_input("Invalid session ID"),
        },
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");

    // A suggestion-backed create resolves the suggestion and inherits
    // its couple scope; the body's fields act as the member's edits.
    if let Some(raw) = &req.from_suggestion_id {
        let suggestion_id = match raw.parse::<SuggestionId>() {
            Ok(id) => id,
            Err(_) => return invalid_input("Invalid suggestion ID"),
        };
        // The suggestion's own responsible-party hint applies; editing
        // it goes through PATCH /agreements/suggestions/:id.
        let cmd = AcceptSuggestionCommand {
            suggestion_id,
            user_id,
            edits: SuggestionEdits {
                title: Some(req.title),
                description: req.description,
                underlying_need: req.underlying_need,
                kind: Some(req.kind),
                responsible: None,
                check_in_frequency_days: Some(req.check_in_frequency_days),
                themes: Some(req.themes),
            },
        };
        return match handlers.accept_handler.handle(cmd, metadata).await {
            Ok(result) => (
                StatusCode::CREATED,
                Json(CreateAgreementResponse {
                    success: true,
                    agreement: (&result.agreement).into(),
                    needs_partner_approval: result.needs_partner_approval,
                }),
            )
                .into_response(),
            Err(e) => handle_suggestion_error(e),
        };
    }

    let cmd = CreateAgreementCommand {
        couple_id,
        user_id,
        title: req.title,
        description: req.description,
        underlying_need: req.underlying_need,
        kind: req.kind,
        themes: req.themes,
        responsible_user_id,
        check_in_frequency_days: req.check_in_frequency_days,
        session_id,
    };

    match handlers.create_handler.handle(cmd, metadata).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(CreateAgreementResponse {
                success: true,
                agreement: (&result.agreement).into(),
                needs_partner_approval: result.needs_partner_approval,
            }),
        )
            .into_response(),
        Err(e) => handle_agreement_error(e),
    }
}

/// PATCH /api/agreements/:id - Lifecycle transitions
pub async fn transition_agreement(
    State(handlers): State<AgreementHandlers>,
    Path(agreement_id): Path<String>,
    Json(req): Json<TransitionAgreementRequest>,
) -> Response {
    let agreement_id = match agreement_id.parse::<AgreementId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid agreement ID"),
    };
    let user_id = match req.user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid user ID"),
    };

    let action = match req.action {
        AgreementActionDto::Approve => AgreementAction::Approve,
        AgreementActionDto::Pause => AgreementAction::Pause,
        AgreementActionDto::Resume => AgreementAction::Resume,
        AgreementActionDto::Achieve => AgreementAction::Achieve,
        AgreementActionDto::Archive => AgreementAction::Archive,
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");
    match handlers
        .transition_handler
        .handle(
            TransitionAgreementCommand {
                agreement_id,
                user_id,
                action,
            },
            metadata,
        )
        .await
    {
        Ok(agreement) => (
            StatusCode::OK,
            Json(AgreementResponse {
                success: true,
                agreement: (&agreement).into(),
            }),
        )
            .into_response(),
        Err(e) => handle_agreement_error(e),
    }
}

/// POST /api/agreements/:id/checkin - Record a check-in
pub async fn record_check_in(
    State(handlers): State<AgreementHandlers>,
    Path(agreement_id): Path<String>,
    Json(req): Json<RecordCheckInRequest>,
) -> Response {
    let agreement_id = match agreement_id.parse::<AgreementId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid agreement ID"),
    };
    let user_id = match req.user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid user ID"),
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");
    match handlers
        .check_in_handler
        .handle(
            RecordCheckInCommand {
                agreement_id,
                user_id,
                status: req.status,
                what_worked: req.what_worked,
                what_was_hard: req.what_was_hard,
            },
            metadata,
        )
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(AgreementResponse {
                success: true,
                agreement: (&result.agreement).into(),
            }),
        )
            .into_response(),
        Err(e) => handle_agreement_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_agreement_error(error: AgreementError) -> Response {
    error_response(error.code(), error.message())
}

fn handle_suggestion_error(error: SuggestionError) -> Response {
    error_response(error.code(), error.message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_active_maps_to_400() {
        let response = handle_agreement_error(AgreementError::NotActive);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stale_transition_maps_to_409() {
        let response = handle_agreement_error(AgreementError::StaleTransition);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_agreement_error(AgreementError::NotFound(AgreementId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn already_resolved_suggestion_maps_to_409() {
        let response = handle_suggestion_error(SuggestionError::AlreadyResolved);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
