//! Domain events emitted by pairing and dissolution.

use serde::Serialize;

use crate::domain::foundation::{CoupleId, DomainEvent, EventId, Timestamp, UserId};

/// An invite code was redeemed and two users became a couple.
#[derive(Debug, Clone, Serialize)]
pub struct CoupleFormed {
    pub event_id: EventId,
    pub couple_id: CoupleId,
    pub user_a: UserId,
    pub user_b: UserId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for CoupleFormed {
    fn event_type(&self) -> &'static str {
        "couple.formed"
    }
    fn aggregate_id(&self) -> String {
        self.couple_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// One member opened the dissolution handshake.
#[derive(Debug, Clone, Serialize)]
pub struct DissolutionInitiated {
    pub event_id: EventId,
    pub couple_id: CoupleId,
    pub initiated_by: UserId,
    pub agreements_dissolved: u32,
    pub occurred_at: Timestamp,
}

impl DomainEvent for DissolutionInitiated {
    fn event_type(&self) -> &'static str {
        "couple.dissolution_initiated"
    }
    fn aggregate_id(&self) -> String {
        self.couple_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// The partner confirmed; the couple is dissolved.
#[derive(Debug, Clone, Serialize)]
pub struct DissolutionConfirmed {
    pub event_id: EventId,
    pub couple_id: CoupleId,
    pub confirmed_by: UserId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for DissolutionConfirmed {
    fn event_type(&self) -> &'static str {
        "couple.dissolution_confirmed"
    }
    fn aggregate_id(&self) -> String {
        self.couple_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// A member canceled the open handshake; the couple resumed.
#[derive(Debug, Clone, Serialize)]
pub struct DissolutionCanceled {
    pub event_id: EventId,
    pub couple_id: CoupleId,
    pub canceled_by: UserId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for DissolutionCanceled {
    fn event_type(&self) -> &'static str {
        "couple.dissolution_canceled"
    }
    fn aggregate_id(&self) -> String {
        self.couple_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}
