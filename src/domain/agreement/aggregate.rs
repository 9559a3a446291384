//! Agreement aggregate entity.
//!
//! An agreement is a shared behavioral commitment scoped to one couple.
//! It owns the approval set and the lifecycle state machine, plus the
//! check-in schedule and success streak.
//!
//! # Approval
//!
//! Approval is a *set* of user ids, never a boolean or counter, so that
//! two concurrent approvals merge instead of overwriting each other. The
//! creator is an implicit member of the set from creation. Activation
//! requires the set to cover the required approvers:
//!
//! - jointly responsible (`responsible_user_id` absent): both members
//! - concretely responsible: the responsible member
//!
//! An agreement created inside a joint session starts with both members
//! in the set (implicit co-present consent).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::couple::Couple;
use crate::domain::foundation::{
    AgreementId, AgreementKind, AgreementStatus, CheckInStatus, CoupleId, DomainError, ErrorCode,
    SessionId, StateMachine, Timestamp, UserId,
};

/// Maximum length for agreement titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Check-in cadence bounds, in days.
const MIN_FREQUENCY_DAYS: u32 = 1;
const MAX_FREQUENCY_DAYS: u32 = 90;

/// Input for proposing a new agreement.
#[derive(Debug, Clone)]
pub struct NewAgreement {
    pub couple_id: CoupleId,
    pub created_by: UserId,
    pub title: String,
    pub description: Option<String>,
    pub underlying_need: Option<String>,
    pub kind: AgreementKind,
    pub themes: Vec<String>,
    pub responsible_user_id: Option<UserId>,
    pub check_in_frequency_days: u32,
    pub created_in_session_id: Option<SessionId>,
}

/// What an approval call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The user had already approved (or the agreement is already
    /// active); nothing changed.
    AlreadyApproved,
    /// The approval was recorded but the set is still incomplete.
    Recorded,
    /// This approval completed the set; the agreement is now active.
    Activated,
}

/// Agreement aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    id: AgreementId,
    couple_id: CoupleId,
    title: String,
    description: Option<String>,
    underlying_need: Option<String>,
    kind: AgreementKind,
    themes: Vec<String>,
    responsible_user_id: Option<UserId>,
    created_by: UserId,
    created_in_session_id: Option<SessionId>,
    status: AgreementStatus,
    approved_by: BTreeSet<UserId>,
    success_streak: u32,
    check_in_frequency_days: u32,
    next_check_in_at: Timestamp,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Agreement {
    /// Proposes a new agreement within a couple.
    ///
    /// Computes the initial approval set and status:
    /// the creator always counts as having approved; a joint-session
    /// origin counts as approval by both members; the agreement starts
    /// `active` if that already covers the required approvers, else
    /// `pending_approval`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the creator is not a couple member
    /// - `ValidationFailed` for a bad title, cadence, or a responsible
    ///   user outside the couple
    pub fn propose(id: AgreementId, params: NewAgreement, couple: &Couple) -> Result<Self, DomainError> {
        couple.authorize_member(&params.created_by)?;
        Self::validate_title(&params.title)?;
        Self::validate_frequency(params.check_in_frequency_days)?;

        if let Some(responsible) = &params.responsible_user_id {
            if !couple.is_member(responsible) {
                return Err(DomainError::validation(
                    "responsible_user_id",
                    "Responsible user must be a member of the couple",
                ));
            }
        }

        let mut approved_by = BTreeSet::new();
        approved_by.insert(params.created_by);
        if params.created_in_session_id.is_some() {
            // Co-presence in the originating session counts as consent
            // from both members.
            approved_by.insert(*couple.user_a());
            approved_by.insert(*couple.user_b());
        }

        let now = Timestamp::now();
        let mut agreement = Self {
            id,
            couple_id: params.couple_id,
            title: params.title.trim().to_string(),
            description: params.description,
            underlying_need: params.underlying_need,
            kind: params.kind,
            themes: params.themes,
            responsible_user_id: params.responsible_user_id,
            created_by: params.created_by,
            created_in_session_id: params.created_in_session_id,
            status: AgreementStatus::PendingApproval,
            approved_by,
            success_streak: 0,
            check_in_frequency_days: params.check_in_frequency_days,
            next_check_in_at: now.add_days(params.check_in_frequency_days as i64),
            created_at: now,
            updated_at: now,
        };

        if agreement.approval_complete(couple) {
            agreement.status = AgreementStatus::Active;
        }

        Ok(agreement)
    }

    /// Reconstitutes an agreement from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: AgreementId,
        couple_id: CoupleId,
        title: String,
        description: Option<String>,
        underlying_need: Option<String>,
        kind: AgreementKind,
        themes: Vec<String>,
        responsible_user_id: Option<UserId>,
        created_by: UserId,
        created_in_session_id: Option<SessionId>,
        status: AgreementStatus,
        approved_by: BTreeSet<UserId>,
        success_streak: u32,
        check_in_frequency_days: u32,
        next_check_in_at: Timestamp,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            couple_id,
            title,
            description,
            underlying_need,
            kind,
            themes,
            responsible_user_id,
            created_by,
            created_in_session_id,
            status,
            approved_by,
            success_streak,
            check_in_frequency_days,
            next_check_in_at,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &AgreementId {
        &self.id
    }

    pub fn couple_id(&self) -> &CoupleId {
        &self.couple_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn underlying_need(&self) -> Option<&str> {
        self.underlying_need.as_deref()
    }

    pub fn kind(&self) -> AgreementKind {
        self.kind
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn responsible_user_id(&self) -> Option<&UserId> {
        self.responsible_user_id.as_ref()
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn created_in_session_id(&self) -> Option<&SessionId> {
        self.created_in_session_id.as_ref()
    }

    pub fn status(&self) -> AgreementStatus {
        self.status
    }

    pub fn approved_by(&self) -> &BTreeSet<UserId> {
        &self.approved_by
    }

    pub fn success_streak(&self) -> u32 {
        self.success_streak
    }

    pub fn check_in_frequency_days(&self) -> u32 {
        self.check_in_frequency_days
    }

    pub fn next_check_in_at(&self) -> &Timestamp {
        &self.next_check_in_at
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Both members are on the hook when no concrete responsible user
    /// is named.
    pub fn requires_mutual_approval(&self) -> bool {
        self.responsible_user_id.is_none()
    }

    /// A check-in is due once the scheduled time has been reached.
    pub fn is_check_in_due(&self, now: &Timestamp) -> bool {
        self.next_check_in_at.has_passed(now)
    }

    /// Whether the given user may report check-ins for this agreement:
    /// the responsible member, or either member when jointly responsible.
    pub fn can_check_in(&self, user_id: &UserId, couple: &Couple) -> bool {
        match &self.responsible_user_id {
            Some(responsible) => responsible == user_id,
            None => couple.is_member(user_id),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Approval
    // ─────────────────────────────────────────────────────────────────────────

    /// The set of users whose approval is required for activation.
    pub fn required_approvers(&self, couple: &Couple) -> BTreeSet<UserId> {
        match &self.responsible_user_id {
            None => couple.members().into_iter().collect(),
            Some(responsible) => [*responsible].into_iter().collect(),
        }
    }

    /// True once every required approver is in the approval set.
    pub fn approval_complete(&self, couple: &Couple) -> bool {
        self.required_approvers(couple)
            .is_subset(&self.approved_by)
    }

    /// Records an approval. Idempotent per user.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the user is not a couple member
    /// - `InvalidStateTransition` if the agreement is terminal
    pub fn approve(&mut self, user_id: &UserId, couple: &Couple) -> Result<ApprovalOutcome, DomainError> {
        couple.authorize_member(user_id)?;

        match self.status {
            AgreementStatus::PendingApproval => {}
            // Already live; a repeated approval is a harmless no-op.
            AgreementStatus::Active | AgreementStatus::Paused => {
                return Ok(ApprovalOutcome::AlreadyApproved)
            }
            terminal => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Cannot approve an agreement in status {}", terminal),
                ))
            }
        }

        if !self.approved_by.insert(*user_id) {
            return Ok(ApprovalOutcome::AlreadyApproved);
        }
        self.updated_at = Timestamp::now();

        if self.approval_complete(couple) {
            self.status = self.status.transition_to(AgreementStatus::Active)?;
            Ok(ApprovalOutcome::Activated)
        } else {
            Ok(ApprovalOutcome::Recorded)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Pauses an active agreement.
    pub fn pause(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(AgreementStatus::Paused)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Resumes a paused agreement.
    pub fn resume(&mut self) -> Result<(), DomainError> {
        if self.status != AgreementStatus::Paused {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot resume an agreement in status {}", self.status),
            ));
        }
        self.status = self.status.transition_to(AgreementStatus::Active)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks an active agreement achieved. Terminal.
    pub fn achieve(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(AgreementStatus::Achieved)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Archives the agreement (soft delete; retained for history).
    pub fn archive(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(AgreementStatus::Archived)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cascade from couple dissolution. Terminal; never reversed, even
    /// when the dissolution handshake is later canceled.
    pub fn dissolve_with_couple(&mut self) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(AgreementStatus::DissolvedWithCouple)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Check-ins
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a check-in report: adjusts the streak and schedules the
    /// next check-in from `now`.
    ///
    /// Early reports are accepted; due-ness is a display concern, not a
    /// gate.
    ///
    /// # Errors
    ///
    /// - `NotActive` unless the agreement is active
    pub fn record_check_in(&mut self, status: CheckInStatus, now: Timestamp) -> Result<(), DomainError> {
        if self.status != AgreementStatus::Active {
            return Err(DomainError::new(
                ErrorCode::NotActive,
                format!("Cannot check in on an agreement in status {}", self.status),
            ));
        }

        self.success_streak = if status.is_successful() {
            self.success_streak + 1
        } else {
            0
        };
        self.next_check_in_at = now.add_days(self.check_in_frequency_days as i64);
        self.updated_at = now;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn validate_title(title: &str) -> Result<(), DomainError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("title", "Title cannot be empty"));
        }
        if trimmed.len() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("Title must be {} characters or less", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }

    fn validate_frequency(days: u32) -> Result<(), DomainError> {
        if !(MIN_FREQUENCY_DAYS..=MAX_FREQUENCY_DAYS).contains(&days) {
            return Err(DomainError::validation(
                "check_in_frequency_days",
                format!(
                    "Check-in cadence must be between {} and {} days",
                    MIN_FREQUENCY_DAYS, MAX_FREQUENCY_DAYS
                ),
            ));
        }
        Ok(())
    }
}
