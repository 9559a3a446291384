//! HTTP handlers for pairing and dissolution endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{error_response, invalid_input};
use crate::application::handlers::dissolution::{
    CancelDissolutionCommand, CancelDissolutionHandler, ConfirmDissolutionCommand,
    ConfirmDissolutionHandler, CoupleStatusQuery, GetCoupleStatusHandler,
    InitiateDissolutionCommand, InitiateDissolutionHandler,
};
use crate::application::handlers::pairing::{
    IssueInviteCodeCommand, IssueInviteCodeHandler, RedeemInviteCodeCommand,
    RedeemInviteCodeHandler,
};
use crate::domain::couple::CoupleError;
use crate::domain::foundation::{CommandMetadata, UserId};

use super::dto::{
    CoupleStatusResponse, DisconnectAction, DisconnectRequest, DisconnectResponse,
    IssueCodeResponse, PairRequest, PairResponse, UserQuery,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct CoupleHandlers {
    issue_handler: Arc<IssueInviteCodeHandler>,
    redeem_handler: Arc<RedeemInviteCodeHandler>,
    status_handler: Arc<GetCoupleStatusHandler>,
    initiate_handler: Arc<InitiateDissolutionHandler>,
    confirm_handler: Arc<ConfirmDissolutionHandler>,
    cancel_handler: Arc<CancelDissolutionHandler>,
}

impl CoupleHandlers {
    pub fn new(
        issue_handler: Arc<IssueInviteCodeHandler>,
        redeem_handler: Arc<RedeemInviteCodeHandler>,
        status_handler: Arc<GetCoupleStatusHandler>,
        initiate_handler: Arc<InitiateDissolutionHandler>,
        confirm_handler: Arc<ConfirmDissolutionHandler>,
        cancel_handler: Arc<CancelDissolutionHandler>,
    ) -> Self {
        Self {
            issue_handler,
            redeem_handler,
            status_handler,
            initiate_handler,
            confirm_handler,
            cancel_handler,
        }
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, Response> {
    raw.parse::<UserId>()
        .map_err(|_| invalid_input("Invalid user ID"))
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/couple/pair - Issue (or reuse) an invite code
pub async fn issue_code(
    State(handlers): State<CoupleHandlers>,
    Query(query): Query<UserQuery>,
) -> Response {
    let user_id = match parse_user_id(&query.user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .issue_handler
        .handle(IssueInviteCodeCommand { user_id })
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(IssueCodeResponse {
                code: result.code,
                expires_at: result.expires_at.to_rfc3339(),
            }),
        )
            .into_response(),
        Err(e) => handle_couple_error(e),
    }
}

/// POST /api/couple/pair - Redeem an invite code
pub async fn redeem_code(
    State(handlers): State<CoupleHandlers>,
    Json(req): Json<PairRequest>,
) -> Response {
    let user_id = match parse_user_id(&req.user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");
    match handlers
        .redeem_handler
        .handle(
            RedeemInviteCodeCommand {
                user_id,
                code: req.code,
            },
            metadata,
        )
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(PairResponse {
                success: true,
                couple_id: result.couple_id.to_string(),
                partner_name: result.partner_name,
            }),
        )
            .into_response(),
        Err(e) => handle_couple_error(e),
    }
}

/// GET /api/couple/status - Couple state for one member
pub async fn couple_status(
    State(handlers): State<CoupleHandlers>,
    Query(query): Query<UserQuery>,
) -> Response {
    let user_id = match parse_user_id(&query.user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .status_handler
        .handle(CoupleStatusQuery { user_id })
        .await
    {
        Ok(view) => {
            let response: CoupleStatusResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_couple_error(e),
    }
}

/// POST /api/couple/disconnect - Dissolution handshake steps
pub async fn disconnect(
    State(handlers): State<CoupleHandlers>,
    Json(req): Json<DisconnectRequest>,
) -> Response {
    let user_id = match parse_user_id(&req.user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let metadata = CommandMetadata::new(user_id).with_correlation_id("http-request");
    let keep_learnings = req.keep_learnings.unwrap_or(false);

    match req.action {
        DisconnectAction::Initiate => {
            match handlers
                .initiate_handler
                .handle(
                    InitiateDissolutionCommand {
                        user_id,
                        keep_learnings,
                    },
                    metadata,
                )
                .await
            {
                Ok(result) => (
                    StatusCode::OK,
                    Json(DisconnectResponse {
                        success: true,
                        status: result.couple.status(),
                        agreements_dissolved: Some(result.agreements_dissolved),
                    }),
                )
                    .into_response(),
                Err(e) => handle_couple_error(e),
            }
        }
        DisconnectAction::Confirm => {
            match handlers
                .confirm_handler
                .handle(
                    ConfirmDissolutionCommand {
                        user_id,
                        keep_learnings,
                    },
                    metadata,
                )
                .await
            {
                Ok(couple) => (
                    StatusCode::OK,
                    Json(DisconnectResponse {
                        success: true,
                        status: couple.status(),
                        agreements_dissolved: None,
                    }),
                )
                    .into_response(),
                Err(e) => handle_couple_error(e),
            }
        }
        DisconnectAction::Cancel => {
            match handlers
                .cancel_handler
                .handle(CancelDissolutionCommand { user_id }, metadata)
                .await
            {
                Ok(couple) => (
                    StatusCode::OK,
                    Json(DisconnectResponse {
                        success: true,
                        status: couple.status(),
                        agreements_dissolved: None,
                    }),
                )
                    .into_response(),
                Err(e) => handle_couple_error(e),
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_couple_error(error: CoupleError) -> Response {
    error_response(error.code(), error.message())
}
