//! GetCoupleStatusHandler - couple state as seen by one member.
//!
//! This is how the non-initiating member learns a dissolution handshake
//! is waiting on them.

use std::sync::Arc;

use crate::domain::couple::CoupleError;
use crate::domain::foundation::{CoupleId, CoupleStatus, Timestamp, UserId};
use crate::ports::{CoupleRepository, ProfileRepository};

/// Query for the caller's couple state.
#[derive(Debug, Clone)]
pub struct CoupleStatusQuery {
    pub user_id: UserId,
}

/// Open-handshake details for display.
#[derive(Debug, Clone)]
pub struct PendingDissolutionView {
    pub initiated_by: UserId,
    pub initiated_at: Timestamp,
    pub agreements_dissolved: u32,
    /// True when the caller is the member who must confirm or cancel.
    pub awaiting_your_confirmation: bool,
}

/// Couple state for one member.
#[derive(Debug, Clone)]
pub struct CoupleStatusView {
    pub couple_id: CoupleId,
    pub status: CoupleStatus,
    pub partner_id: UserId,
    pub partner_name: Option<String>,
    pub pending_dissolution: Option<PendingDissolutionView>,
}

/// Handler for the couple-status query.
pub struct GetCoupleStatusHandler {
    couples: Arc<dyn CoupleRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GetCoupleStatusHandler {
    pub fn new(couples: Arc<dyn CoupleRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { couples, profiles }
    }

    pub async fn handle(&self, query: CoupleStatusQuery) -> Result<CoupleStatusView, CoupleError> {
        let profile = self
            .profiles
            .find_by_user(&query.user_id)
            .await?
            .ok_or(CoupleError::UnknownUser(query.user_id))?;
        let couple_id = profile.couple_id.ok_or(CoupleError::NotInCouple)?;

        let couple = self
            .couples
            .find_by_id(&couple_id)
            .await?
            .ok_or(CoupleError::NotInCouple)?;

        let partner_id = couple.partner_of(&query.user_id)?;
        let partner_name = self
            .profiles
            .find_by_user(&partner_id)
            .await?
            .map(|p| p.display_name);

        let pending_dissolution = couple.pending_dissolution().map(|p| PendingDissolutionView {
            initiated_by: p.initiated_by,
            initiated_at: p.initiated_at,
            agreements_dissolved: p.agreements_dissolved,
            awaiting_your_confirmation: p.initiated_by != query.user_id,
        });

        Ok(CoupleStatusView {
            couple_id,
            status: couple.status(),
            partner_id,
            partner_name,
            pending_dissolution,
        })
    }
}
