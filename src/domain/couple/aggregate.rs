//! Couple aggregate entity.
//!
//! A couple is the pairing of exactly two users and the scope for every
//! agreement. Membership is immutable after creation; the only way shared
//! state changes hands is through the dissolution handshake.
//!
//! # Ownership
//!
//! Couples are owned jointly by both members. No single member may
//! unilaterally mutate shared fields except through the dissolution
//! protocol modeled here.

use crate::domain::foundation::{
    CoupleId, CoupleStatus, DomainError, ErrorCode, StateMachine, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

/// Ephemeral state carried by a couple while the dissolution handshake
/// is open. Visible to the non-initiating member until they confirm or
/// cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDissolution {
    /// Member who started the handshake.
    pub initiated_by: UserId,

    /// When the handshake was opened.
    pub initiated_at: Timestamp,

    /// How many agreements were moved to `dissolved_with_couple` when
    /// the handshake opened. Informational; cancel does not restore them.
    pub agreements_dissolved: u32,
}

/// Couple aggregate - the two-user pairing scope.
///
/// # Invariants
///
/// - `user_a != user_b`
/// - `pending_dissolution` is `Some` exactly while status is
///   `pending_dissolution`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Couple {
    id: CoupleId,
    user_a: UserId,
    user_b: UserId,
    status: CoupleStatus,
    pending_dissolution: Option<PendingDissolution>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Couple {
    /// Forms a new active couple.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if both members are the same user
    pub fn form(id: CoupleId, user_a: UserId, user_b: UserId) -> Result<Self, DomainError> {
        if user_a == user_b {
            return Err(DomainError::validation(
                "user_b",
                "A couple requires two distinct users",
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            user_a,
            user_b,
            status: CoupleStatus::Active,
            pending_dissolution: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a couple from persistence (no validation).
    pub fn reconstitute(
        id: CoupleId,
        user_a: UserId,
        user_b: UserId,
        status: CoupleStatus,
        pending_dissolution: Option<PendingDissolution>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_a,
            user_b,
            status,
            pending_dissolution,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &CoupleId {
        &self.id
    }

    pub fn user_a(&self) -> &UserId {
        &self.user_a
    }

    pub fn user_b(&self) -> &UserId {
        &self.user_b
    }

    pub fn status(&self) -> CoupleStatus {
        self.status
    }

    pub fn pending_dissolution(&self) -> Option<&PendingDissolution> {
        self.pending_dissolution.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Both members, in storage order.
    pub fn members(&self) -> [UserId; 2] {
        [self.user_a, self.user_b]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks whether the given user is one of the two members.
    pub fn is_member(&self, user_id: &UserId) -> bool {
        &self.user_a == user_id || &self.user_b == user_id
    }

    /// Returns the other member.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `user_id` is not a member
    pub fn partner_of(&self, user_id: &UserId) -> Result<UserId, DomainError> {
        if user_id == &self.user_a {
            Ok(self.user_b)
        } else if user_id == &self.user_b {
            Ok(self.user_a)
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not a member of this couple",
            ))
        }
    }

    /// Validates that the user is a member.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if not a member
    pub fn authorize_member(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_member(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User is not a member of this couple",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dissolution handshake
    // ─────────────────────────────────────────────────────────────────────────

    /// Opens the dissolution handshake.
    ///
    /// `agreements_dissolved` records how many agreements the caller
    /// moved to `dissolved_with_couple` alongside this flip.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the initiator is not a member
    /// - `InvalidStateTransition` unless the couple is active
    pub fn initiate_dissolution(
        &mut self,
        initiated_by: &UserId,
        agreements_dissolved: u32,
    ) -> Result<(), DomainError> {
        self.authorize_member(initiated_by)?;
        self.status = self.status.transition_to(CoupleStatus::PendingDissolution)?;
        let now = Timestamp::now();
        self.pending_dissolution = Some(PendingDissolution {
            initiated_by: *initiated_by,
            initiated_at: now,
            agreements_dissolved,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Finalizes the dissolution. Only the non-initiating member may
    /// confirm.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if not a member, or if the initiator tries to
    ///   confirm their own request
    /// - `InvalidStateTransition` unless a handshake is open
    pub fn confirm_dissolution(&mut self, confirmed_by: &UserId) -> Result<(), DomainError> {
        self.authorize_member(confirmed_by)?;
        let pending = self.pending_dissolution.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                "No dissolution is pending for this couple",
            )
        })?;
        if &pending.initiated_by == confirmed_by {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "The initiating member cannot confirm their own dissolution request",
            ));
        }
        self.status = self.status.transition_to(CoupleStatus::Dissolved)?;
        self.pending_dissolution = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancels an open handshake. Either member may cancel.
    ///
    /// Agreements already moved to `dissolved_with_couple` stay
    /// dissolved; only the couple itself resumes.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if not a member
    /// - `InvalidStateTransition` unless a handshake is open
    pub fn cancel_dissolution(&mut self, canceled_by: &UserId) -> Result<(), DomainError> {
        self.authorize_member(canceled_by)?;
        if self.pending_dissolution.is_none() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "No dissolution is pending for this couple",
            ));
        }
        self.status = self.status.transition_to(CoupleStatus::Active)?;
        self.pending_dissolution = None;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
