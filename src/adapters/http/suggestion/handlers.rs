//! HTTP handlers for suggestion endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{error_response, invalid_input};
use crate::application::handlers::suggestion::{
    AcceptSuggestionCommand, AcceptSuggestionHandler, DismissSuggestionCommand,
    DismissSuggestionHandler, IngestSuggestionCommand, IngestSuggestionHandler,
    ListSuggestionsHandler, ListSuggestionsQuery, SuggestionEdits,
};
use crate::domain::foundation::{CommandMetadata, CoupleId, SessionId, SuggestionId, UserId};
use crate::domain::suggestion::SuggestionError;

use super::dto::{
    AcceptSuggestionResponse, IngestSuggestionRequest, ListSuggestionsParams,
    ResolveSuggestionRequest, SuggestionActionDto, SuggestionDto, SuggestionEditsDto,
    SuggestionListResponse, SuggestionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SuggestionHandlers {
    ingest_handler: Arc<IngestSuggestionHandler>,
    accept_handler: Arc<AcceptSuggestionHandler>,
    dismiss_handler: Arc<DismissSuggestionHandler>,
    list_handler: Arc<ListSuggestionsHandler>,
}

impl SuggestionHandlers {
    pub fn new(
        ingest_handler: Arc<IngestSuggestionHandler>,
        accept_handler: Arc<AcceptSuggestionHandler>,
        dismiss_handler: Arc<DismissSuggestionHandler>,
        list_handler: Arc<ListSuggestionsHandler>,
    ) -> Self {
        Self {
            ingest_handler,
            accept_handler,
            dismiss_handler,
            list_handler,
        }
    }
}

fn to_edits(dto: Option<SuggestionEditsDto>) -> SuggestionEdits {
    let dto = dto.unwrap_or_default();
    SuggestionEdits {
        title: dto.title,
        description: dto.description,
        underlying_need: dto.underlying_need,
        kind: dto.kind,
        responsible: dto.responsible,
        check_in_frequency_days: dto.check_in_frequency_days,
        themes: dto.themes,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/agreements/suggestions - Pending suggestions for a couple
pub async fn list_suggestions(
    State(handlers): State<SuggestionHandlers>,
    Query(params): Query<ListSuggestionsParams>,
) -> Response {
    let couple_id = match params.couple_id.parse::<CoupleId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid couple ID"),
    };
    let user_id = match params.user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid user ID"),
    };

    match handlers
        .list_handler
        .handle(ListSuggestionsQuery { couple_id, user_id })
        .await
    {
        Ok(list) => {
            let response: SuggestionListResponse = list.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_suggestion_error(e),
    }
}

/// POST /api/agreements/suggestions - Ingest from the analysis collaborator
pub async fn ingest_suggestion(
    State(handlers): State<SuggestionHandlers>,
    Json(req): Json<IngestSuggestionRequest>,
) -> Response {
    let couple_id = match req.couple_id.parse::<CoupleId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid couple ID"),
    };
    let session_id = match &req.session_id {
        None => None,
        Some(raw) => match raw.parse::<SessionId>() {
            Ok(id) => Some(id),
            Err(_) => return invalid_input("Invalid session ID"),
        },
    };

    match handlers
        .ingest_handler
        .handle(IngestSuggestionCommand {
            couple_id,
            session_id,
            title: req.title,
            underlying_need: req.underlying_need,
            responsible: req.responsible,
        })
        .await
    {
        Ok(suggestion) => (
            StatusCode::CREATED,
            Json(SuggestionResponse {
                success: true,
                suggestion: SuggestionDto::from(&suggestion),
            }),
        )
            .into_response(),
        Err(e) => handle_suggestion_error(e),
    }
}

/// PATCH /api/agreements/suggestions/:id - Accept or dismiss
pub async fn resolve_suggestion(
    State(handlers): State<SuggestionHandlers>,
    Path(suggestion_id): Path<String>,
    Json(req): Json<ResolveSuggestionRequest>,
) -> Response {
    let suggestion_id = match suggestion_id.parse::<SuggestionId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid suggestion ID"),
    };
    let user_id = match req.user_id.parse::<UserId>() {
        Ok(id) => id,
        Err(_) => return invalid_input("Invalid user ID"),
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");

    match req.action {
        SuggestionActionDto::Accept => {
            match handlers
                .accept_handler
                .handle(
                    AcceptSuggestionCommand {
                        suggestion_id,
                        user_id,
                        edits: to_edits(req.edits),
                    },
                    metadata,
                )
                .await
            {
                Ok(result) => (
                    StatusCode::OK,
                    Json(AcceptSuggestionResponse {
                        success: true,
                        suggestion: SuggestionDto::from(&result.suggestion),
                        agreement: (&result.agreement).into(),
                        needs_partner_approval: result.needs_partner_approval,
                    }),
                )
                    .into_response(),
                Err(e) => handle_suggestion_error(e),
            }
        }
        SuggestionActionDto::Dismiss => {
            match handlers
                .dismiss_handler
                .handle(
                    DismissSuggestionCommand {
                        suggestion_id,
                        user_id,
                    },
                    metadata,
                )
                .await
            {
                Ok(()) => (
                    StatusCode::OK,
                    Json(serde_json::json!({"success": true})),
                )
                    .into_response(),
                Err(e) => handle_suggestion_error(e),
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_suggestion_error(error: SuggestionError) -> Response {
    error_response(error.code(), error.message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_resolved_maps_to_409() {
        let response = handle_suggestion_error(SuggestionError::AlreadyResolved);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn forbidden_maps_to_403_for_waiting_on_partner() {
        let response = handle_suggestion_error(SuggestionError::Forbidden);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
