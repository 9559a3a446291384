//! Suggestion aggregate entity.
//!
//! A suggestion is a candidate agreement proposed by the external
//! analysis collaborator after a session. Either member can edit and
//! accept it (subject to the responsible-party rule) or dismiss it.
//! At most one agreement is ever created from a suggestion.

use serde::{Deserialize, Serialize};

use crate::domain::couple::Couple;
use crate::domain::foundation::{
    AgreementId, CoupleId, DomainError, ErrorCode, ResponsibleParty, SessionId, SuggestionId,
    SuggestionStatus, Timestamp, UserId,
};

/// Input for ingesting a suggestion from the analysis collaborator.
#[derive(Debug, Clone)]
pub struct NewSuggestion {
    pub couple_id: CoupleId,
    pub session_id: Option<SessionId>,
    pub title: String,
    pub underlying_need: Option<String>,
    pub responsible: ResponsibleParty,
}

/// Suggestion aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    id: SuggestionId,
    couple_id: CoupleId,
    session_id: Option<SessionId>,
    title: String,
    underlying_need: Option<String>,
    responsible: ResponsibleParty,
    status: SuggestionStatus,
    created_agreement_id: Option<AgreementId>,
    resolved_by: Option<UserId>,
    resolved_at: Option<Timestamp>,
    created_at: Timestamp,
}

impl Suggestion {
    /// Records a freshly-ingested suggestion.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty title
    pub fn receive(id: SuggestionId, params: NewSuggestion) -> Result<Self, DomainError> {
        if params.title.trim().is_empty() {
            return Err(DomainError::validation("title", "Title cannot be empty"));
        }

        Ok(Self {
            id,
            couple_id: params.couple_id,
            session_id: params.session_id,
            title: params.title.trim().to_string(),
            underlying_need: params.underlying_need,
            responsible: params.responsible,
            status: SuggestionStatus::Pending,
            created_agreement_id: None,
            resolved_by: None,
            resolved_at: None,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitutes a suggestion from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SuggestionId,
        couple_id: CoupleId,
        session_id: Option<SessionId>,
        title: String,
        underlying_need: Option<String>,
        responsible: ResponsibleParty,
        status: SuggestionStatus,
        created_agreement_id: Option<AgreementId>,
        resolved_by: Option<UserId>,
        resolved_at: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            couple_id,
            session_id,
            title,
            underlying_need,
            responsible,
            status,
            created_agreement_id,
            resolved_by,
            resolved_at,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SuggestionId {
        &self.id
    }

    pub fn couple_id(&self) -> &CoupleId {
        &self.couple_id
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn underlying_need(&self) -> Option<&str> {
        self.underlying_need.as_deref()
    }

    pub fn responsible(&self) -> ResponsibleParty {
        self.responsible
    }

    pub fn status(&self) -> SuggestionStatus {
        self.status
    }

    pub fn created_agreement_id(&self) -> Option<&AgreementId> {
        self.created_agreement_id.as_ref()
    }

    pub fn resolved_by(&self) -> Option<&UserId> {
        self.resolved_by.as_ref()
    }

    pub fn resolved_at(&self) -> Option<&Timestamp> {
        self.resolved_at.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolves the responsible-party hint to a concrete user id, when
    /// it names a single member.
    pub fn responsible_user(&self, couple: &Couple) -> Option<UserId> {
        match self.responsible {
            ResponsibleParty::Both => None,
            ResponsibleParty::UserA => Some(*couple.user_a()),
            ResponsibleParty::UserB => Some(*couple.user_b()),
        }
    }

    /// Whether this user's party matches the suggestion's responsible
    /// field. Callers surface a mismatch as "waiting on partner", not a
    /// hard failure.
    pub fn can_be_accepted_by(&self, user_id: &UserId, couple: &Couple) -> bool {
        if !couple.is_member(user_id) {
            return false;
        }
        match self.responsible_user(couple) {
            None => true,
            Some(responsible) => &responsible == user_id,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks the suggestion accepted and links the agreement created
    /// from it.
    ///
    /// # Errors
    ///
    /// - `AlreadyResolved` unless pending
    /// - `Forbidden` if the caller's party does not match `responsible`
    pub fn accept(
        &mut self,
        user_id: &UserId,
        couple: &Couple,
        agreement_id: AgreementId,
    ) -> Result<(), DomainError> {
        self.ensure_pending()?;
        if !self.can_be_accepted_by(user_id, couple) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the responsible party can accept this suggestion",
            ));
        }
        self.status = SuggestionStatus::Accepted;
        self.created_agreement_id = Some(agreement_id);
        self.resolved_by = Some(*user_id);
        self.resolved_at = Some(Timestamp::now());
        Ok(())
    }

    /// Marks the suggestion dismissed. Either member may dismiss,
    /// regardless of the responsible party.
    ///
    /// # Errors
    ///
    /// - `AlreadyResolved` unless pending
    /// - `Forbidden` if the caller is not a couple member
    pub fn dismiss(&mut self, user_id: &UserId, couple: &Couple) -> Result<(), DomainError> {
        self.ensure_pending()?;
        couple.authorize_member(user_id)?;
        self.status = SuggestionStatus::Dismissed;
        self.resolved_by = Some(*user_id);
        self.resolved_at = Some(Timestamp::now());
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status.is_pending() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::AlreadyResolved,
                format!("Suggestion has already been {}", self.status),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_couple() -> (Couple, UserId, UserId) {
        let a = UserId::new();
        let b = UserId::new();
        let couple = Couple::form(CoupleId::new(), a, b).unwrap();
        (couple, a, b)
    }

    fn suggestion_for(couple: &Couple, responsible: ResponsibleParty) -> Suggestion {
        Suggestion::receive(
            SuggestionId::new(),
            NewSuggestion {
                couple_id: *couple.id(),
                session_id: Some(SessionId::new()),
                title: "Take turns planning weekends".to_string(),
                underlying_need: Some("shared mental load".to_string()),
                responsible,
            },
        )
        .unwrap()
    }

    #[test]
    fn receive_starts_pending_and_unlinked() {
        let (couple, _, _) = test_couple();
        let suggestion = suggestion_for(&couple, ResponsibleParty::Both);
        assert_eq!(suggestion.status(), SuggestionStatus::Pending);
        assert!(suggestion.created_agreement_id().is_none());
    }

    #[test]
    fn receive_rejects_empty_title() {
        let result = Suggestion::receive(
            SuggestionId::new(),
            NewSuggestion {
                couple_id: CoupleId::new(),
                session_id: None,
                title: " ".to_string(),
                underlying_need: None,
                responsible: ResponsibleParty::Both,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn both_responsible_lets_either_member_accept() {
        let (couple, a, b) = test_couple();
        let suggestion = suggestion_for(&couple, ResponsibleParty::Both);
        assert!(suggestion.can_be_accepted_by(&a, &couple));
        assert!(suggestion.can_be_accepted_by(&b, &couple));
        assert!(!suggestion.can_be_accepted_by(&UserId::new(), &couple));
    }

    #[test]
    fn targeted_suggestion_only_accepts_from_its_party() {
        let (couple, a, b) = test_couple();
        let suggestion = suggestion_for(&couple, ResponsibleParty::UserB);
        assert!(!suggestion.can_be_accepted_by(&a, &couple));
        assert!(suggestion.can_be_accepted_by(&b, &couple));
    }

    #[test]
    fn accept_links_agreement_and_resolves() {
        let (couple, a, _) = test_couple();
        let mut suggestion = suggestion_for(&couple, ResponsibleParty::UserA);
        let agreement_id = AgreementId::new();
        suggestion.accept(&a, &couple, agreement_id).unwrap();
        assert_eq!(suggestion.status(), SuggestionStatus::Accepted);
        assert_eq!(suggestion.created_agreement_id(), Some(&agreement_id));
        assert_eq!(suggestion.resolved_by(), Some(&a));
    }

    #[test]
    fn accept_twice_is_already_resolved() {
        let (couple, a, _) = test_couple();
        let mut suggestion = suggestion_for(&couple, ResponsibleParty::Both);
        suggestion.accept(&a, &couple, AgreementId::new()).unwrap();
        let result = suggestion.accept(&a, &couple, AgreementId::new());
        assert_eq!(result.unwrap_err().code, ErrorCode::AlreadyResolved);
    }

    #[test]
    fn wrong_party_accept_is_forbidden() {
        let (couple, a, _) = test_couple();
        let mut suggestion = suggestion_for(&couple, ResponsibleParty::UserB);
        let result = suggestion.accept(&a, &couple, AgreementId::new());
        assert_eq!(result.unwrap_err().code, ErrorCode::Forbidden);
    }

    #[test]
    fn either_member_may_dismiss_regardless_of_party() {
        let (couple, a, _) = test_couple();
        let mut suggestion = suggestion_for(&couple, ResponsibleParty::UserB);
        suggestion.dismiss(&a, &couple).unwrap();
        assert_eq!(suggestion.status(), SuggestionStatus::Dismissed);
    }

    #[test]
    fn dismiss_twice_is_already_resolved() {
        let (couple, _, b) = test_couple();
        let mut suggestion = suggestion_for(&couple, ResponsibleParty::Both);
        suggestion.dismiss(&b, &couple).unwrap();
        let result = suggestion.dismiss(&b, &couple);
        assert_eq!(result.unwrap_err().code, ErrorCode::AlreadyResolved);
    }

    #[test]
    fn outsider_cannot_dismiss() {
        let (couple, _, _) = test_couple();
        let mut suggestion = suggestion_for(&couple, ResponsibleParty::Both);
        let result = suggestion.dismiss(&UserId::new(), &couple);
        assert_eq!(result.unwrap_err().code, ErrorCode::Forbidden);
    }
}
