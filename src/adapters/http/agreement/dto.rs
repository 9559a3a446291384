//! HTTP DTOs for agreement endpoints.
//!
//! These types decouple the wire format (camelCase, `type` for the
//! agreement kind) from the domain types.

use serde::{Deserialize, Serialize};

use crate::application::handlers::agreement::{AgreementList, AgreementListItem};
use crate::domain::agreement::{Agreement, CheckIn};
use crate::domain::foundation::{AgreementKind, AgreementStatus, CheckInStatus};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Query parameters for GET /agreements.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAgreementsParams {
    pub couple_id: String,
    pub user_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for POST /agreements.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgreementRequest {
    pub couple_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub underlying_need: Option<String>,
    #[serde(rename = "type")]
    pub kind: AgreementKind,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub responsible_user_id: Option<String>,
    pub check_in_frequency_days: u32,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub from_suggestion_id: Option<String>,
}

/// Lifecycle action names accepted by PATCH /agreements/:id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementActionDto {
    Approve,
    Pause,
    Resume,
    Achieve,
    Archive,
}

/// Body for PATCH /agreements/:id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAgreementRequest {
    pub action: AgreementActionDto,
    pub user_id: String,
}

/// Body for POST /agreements/:id/checkin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCheckInRequest {
    pub user_id: String,
    pub status: CheckInStatus,
    #[serde(default)]
    pub what_worked: Option<String>,
    #[serde(default)]
    pub what_was_hard: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// An agreement as exposed over the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementDto {
    pub id: String,
    pub couple_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_need: Option<String>,
    #[serde(rename = "type")]
    pub kind: AgreementKind,
    pub themes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_user_id: Option<String>,
    pub requires_mutual_approval: bool,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_in_session_id: Option<String>,
    pub status: AgreementStatus,
    pub approved_by: Vec<String>,
    pub success_streak: u32,
    pub check_in_frequency_days: u32,
    pub next_check_in_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Agreement> for AgreementDto {
    fn from(agreement: &Agreement) -> Self {
        Self {
            id: agreement.id().to_string(),
            couple_id: agreement.couple_id().to_string(),
            title: agreement.title().to_string(),
            description: agreement.description().map(str::to_string),
            underlying_need: agreement.underlying_need().map(str::to_string),
            kind: agreement.kind(),
            themes: agreement.themes().to_vec(),
            responsible_user_id: agreement.responsible_user_id().map(|u| u.to_string()),
            requires_mutual_approval: agreement.requires_mutual_approval(),
            created_by: agreement.created_by().to_string(),
            created_in_session_id: agreement.created_in_session_id().map(|s| s.to_string()),
            status: agreement.status(),
            approved_by: agreement.approved_by().iter().map(|u| u.to_string()).collect(),
            success_streak: agreement.success_streak(),
            check_in_frequency_days: agreement.check_in_frequency_days(),
            next_check_in_at: agreement.next_check_in_at().to_rfc3339(),
            created_at: agreement.created_at().to_rfc3339(),
            updated_at: agreement.updated_at().to_rfc3339(),
        }
    }
}

/// A check-in as exposed over the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDto {
    pub id: String,
    pub agreement_id: String,
    pub reported_by: String,
    pub status: CheckInStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_worked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_was_hard: Option<String>,
    pub created_at: String,
}

impl From<&CheckIn> for CheckInDto {
    fn from(check_in: &CheckIn) -> Self {
        Self {
            id: check_in.id.to_string(),
            agreement_id: check_in.agreement_id.to_string(),
            reported_by: check_in.reported_by.to_string(),
            status: check_in.status,
            what_worked: check_in.what_worked.clone(),
            what_was_hard: check_in.what_was_hard.clone(),
            created_at: check_in.created_at.to_rfc3339(),
        }
    }
}

/// One enriched list entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementListItemDto {
    #[serde(flatten)]
    pub agreement: AgreementDto,
    pub recent_check_ins: Vec<CheckInDto>,
    pub recent_success_rate: Option<u32>,
    pub is_check_in_due: bool,
}

impl From<&AgreementListItem> for AgreementListItemDto {
    fn from(item: &AgreementListItem) -> Self {
        Self {
            agreement: (&item.agreement).into(),
            recent_check_ins: item.recent_check_ins.iter().map(Into::into).collect(),
            recent_success_rate: item.recent_success_rate,
            is_check_in_due: item.is_check_in_due,
        }
    }
}

/// Response for GET /agreements.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementListResponse {
    pub agreements: Vec<AgreementListItemDto>,
}

impl From<AgreementList> for AgreementListResponse {
    fn from(list: AgreementList) -> Self {
        Self {
            agreements: list.items.iter().map(Into::into).collect(),
        }
    }
}

/// Response for POST /agreements.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgreementResponse {
    pub success: bool,
    pub agreement: AgreementDto,
    pub needs_partner_approval: bool,
}

/// Response for PATCH /agreements/:id and the check-in endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementResponse {
    pub success: bool,
    pub agreement: AgreementDto,
}
