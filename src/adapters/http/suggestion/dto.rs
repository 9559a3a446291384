//! HTTP DTOs for suggestion endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::agreement::dto::AgreementDto;
use crate::application::handlers::suggestion::{SuggestionList, SuggestionListItem};
use crate::domain::foundation::{AgreementKind, ResponsibleParty, SuggestionStatus};
use crate::domain::suggestion::Suggestion;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Query parameters for GET /agreements/suggestions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSuggestionsParams {
    pub couple_id: String,
    pub user_id: String,
}

/// Body for POST /agreements/suggestions (the analysis collaborator).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSuggestionRequest {
    pub couple_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub underlying_need: Option<String>,
    pub responsible: ResponsibleParty,
}

/// Member edits carried by an accept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEditsDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub underlying_need: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<AgreementKind>,
    #[serde(default)]
    pub responsible: Option<ResponsibleParty>,
    #[serde(default)]
    pub check_in_frequency_days: Option<u32>,
    #[serde(default)]
    pub themes: Option<Vec<String>>,
}

/// Resolution action for PATCH /agreements/suggestions/:id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionActionDto {
    Accept,
    Dismiss,
}

/// Body for PATCH /agreements/suggestions/:id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSuggestionRequest {
    pub action: SuggestionActionDto,
    pub user_id: String,
    #[serde(default)]
    pub edits: Option<SuggestionEditsDto>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// A suggestion as exposed over the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDto {
    pub id: String,
    pub couple_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_need: Option<String>,
    pub responsible: ResponsibleParty,
    pub status: SuggestionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_agreement_id: Option<String>,
    pub created_at: String,
}

impl From<&Suggestion> for SuggestionDto {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            id: suggestion.id().to_string(),
            couple_id: suggestion.couple_id().to_string(),
            session_id: suggestion.session_id().map(|s| s.to_string()),
            title: suggestion.title().to_string(),
            underlying_need: suggestion.underlying_need().map(str::to_string),
            responsible: suggestion.responsible(),
            status: suggestion.status(),
            created_agreement_id: suggestion.created_agreement_id().map(|a| a.to_string()),
            created_at: suggestion.created_at().to_rfc3339(),
        }
    }
}

/// One pending suggestion with the caller's eligibility.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionListItemDto {
    #[serde(flatten)]
    pub suggestion: SuggestionDto,
    pub can_accept: bool,
}

impl From<&SuggestionListItem> for SuggestionListItemDto {
    fn from(item: &SuggestionListItem) -> Self {
        Self {
            suggestion: (&item.suggestion).into(),
            can_accept: item.can_accept,
        }
    }
}

/// Response for GET /agreements/suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionListResponse {
    pub suggestions: Vec<SuggestionListItemDto>,
}

impl From<SuggestionList> for SuggestionListResponse {
    fn from(list: SuggestionList) -> Self {
        Self {
            suggestions: list.items.iter().map(Into::into).collect(),
        }
    }
}

/// Response for an accepted suggestion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptSuggestionResponse {
    pub success: bool,
    pub suggestion: SuggestionDto,
    pub agreement: AgreementDto,
    pub needs_partner_approval: bool,
}

/// Response for a dismissed suggestion or a fresh ingest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub success: bool,
    pub suggestion: SuggestionDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_request_deserializes() {
        let json = r#"{
            "coupleId": "1f0a8f8e-7a0e-4a86-b7e4-16c5ee2e4a8e",
            "title": "Trade cooking nights",
            "responsible": "user_a"
        }"#;
        let req: IngestSuggestionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.responsible, ResponsibleParty::UserA);
        assert!(req.session_id.is_none());
    }

    #[test]
    fn resolve_request_parses_accept_with_edits() {
        let json = r#"{
            "action": "accept",
            "userId": "7a2f0b55-2a56-4f07-b1f4-4f1e9b9a2a01",
            "edits": {"title": "Trade cooking nights weekly", "type": "ritual", "checkInFrequencyDays": 14}
        }"#;
        let req: ResolveSuggestionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.action, SuggestionActionDto::Accept);
        let edits = req.edits.unwrap();
        assert_eq!(edits.kind, Some(AgreementKind::Ritual));
        assert_eq!(edits.check_in_frequency_days, Some(14));
    }

    #[test]
    fn resolve_request_parses_bare_dismiss() {
        let json = r#"{"action": "dismiss", "userId": "7a2f0b55-2a56-4f07-b1f4-4f1e9b9a2a01"}"#;
        let req: ResolveSuggestionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.action, SuggestionActionDto::Dismiss);
        assert!(req.edits.is_none());
    }
}
