//! HTTP DTOs for pairing and dissolution endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::dissolution::{CoupleStatusView, PendingDissolutionView};
use crate::domain::foundation::CoupleStatus;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Query for GET /couple/pair and /couple/status.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

/// Body for POST /couple/pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRequest {
    pub user_id: String,
    pub code: String,
}

/// Dissolution handshake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectAction {
    Initiate,
    Confirm,
    Cancel,
}

/// Body for POST /couple/disconnect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub user_id: String,
    pub action: DisconnectAction,
    #[serde(default)]
    pub keep_learnings: Option<bool>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for GET /couple/pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCodeResponse {
    pub code: String,
    pub expires_at: String,
}

/// Response for POST /couple/pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairResponse {
    pub success: bool,
    pub couple_id: String,
    pub partner_name: String,
}

/// Response for POST /couple/disconnect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectResponse {
    pub success: bool,
    pub status: CoupleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreements_dissolved: Option<u32>,
}

/// Open handshake details in the status view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDissolutionResponse {
    pub initiated_by: String,
    pub initiated_at: String,
    pub agreements_dissolved: u32,
    pub awaiting_your_confirmation: bool,
}

impl From<PendingDissolutionView> for PendingDissolutionResponse {
    fn from(view: PendingDissolutionView) -> Self {
        Self {
            initiated_by: view.initiated_by.to_string(),
            initiated_at: view.initiated_at.to_rfc3339(),
            agreements_dissolved: view.agreements_dissolved,
            awaiting_your_confirmation: view.awaiting_your_confirmation,
        }
    }
}

/// Response for GET /couple/status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleStatusResponse {
    pub couple_id: String,
    pub status: CoupleStatus,
    pub partner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_dissolution: Option<PendingDissolutionResponse>,
}

impl From<CoupleStatusView> for CoupleStatusResponse {
    fn from(view: CoupleStatusView) -> Self {
        Self {
            couple_id: view.couple_id.to_string(),
            status: view.status,
            partner_id: view.partner_id.to_string(),
            partner_name: view.partner_name,
            pending_dissolution: view.pending_dissolution.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_request_deserializes_camel_case() {
        let json = r#"{"userId": "8c5e0f54-3cfa-4d6a-9a08-1a1de1b10c52", "code": "K7M3PQ"}"#;
        let req: PairRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.code, "K7M3PQ");
    }

    #[test]
    fn disconnect_request_parses_actions() {
        let json = r#"{"userId": "8c5e0f54-3cfa-4d6a-9a08-1a1de1b10c52", "action": "initiate", "keepLearnings": true}"#;
        let req: DisconnectRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.action, DisconnectAction::Initiate);
        assert_eq!(req.keep_learnings, Some(true));
    }

    #[test]
    fn disconnect_request_defaults_keep_learnings_to_none() {
        let json = r#"{"userId": "8c5e0f54-3cfa-4d6a-9a08-1a1de1b10c52", "action": "cancel"}"#;
        let req: DisconnectRequest = serde_json::from_str(json).unwrap();
        assert!(req.keep_learnings.is_none());
    }

    #[test]
    fn couple_status_serializes_pending_dissolution() {
        use crate::domain::foundation::{CoupleId, Timestamp, UserId};

        let initiator = UserId::new();
        let view = CoupleStatusView {
            couple_id: CoupleId::new(),
            status: CoupleStatus::PendingDissolution,
            partner_id: initiator,
            partner_name: Some("Alex".to_string()),
            pending_dissolution: Some(PendingDissolutionView {
                initiated_by: initiator,
                initiated_at: Timestamp::now(),
                agreements_dissolved: 2,
                awaiting_your_confirmation: true,
            }),
        };
        let response: CoupleStatusResponse = view.into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "pending_dissolution");
        assert_eq!(
            json["pendingDissolution"]["awaitingYourConfirmation"],
            true
        );
    }
}
