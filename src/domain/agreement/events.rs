//! Domain events emitted by agreement operations.

use serde::Serialize;

use crate::domain::foundation::{
    AgreementId, AgreementStatus, CheckInId, CheckInStatus, CoupleId, DomainEvent, EventId,
    Timestamp, UserId,
};

/// A new agreement entered the store.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementCreated {
    pub event_id: EventId,
    pub agreement_id: AgreementId,
    pub couple_id: CoupleId,
    pub created_by: UserId,
    pub needs_partner_approval: bool,
    pub occurred_at: Timestamp,
}

impl DomainEvent for AgreementCreated {
    fn event_type(&self) -> &'static str {
        "agreement.created"
    }
    fn aggregate_id(&self) -> String {
        self.agreement_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// The approval set completed and the agreement went live.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementActivated {
    pub event_id: EventId,
    pub agreement_id: AgreementId,
    pub couple_id: CoupleId,
    pub occurred_at: Timestamp,
}

impl DomainEvent for AgreementActivated {
    fn event_type(&self) -> &'static str {
        "agreement.activated"
    }
    fn aggregate_id(&self) -> String {
        self.agreement_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// A lifecycle transition (pause, resume, achieve, archive, dissolve).
#[derive(Debug, Clone, Serialize)]
pub struct AgreementTransitioned {
    pub event_id: EventId,
    pub agreement_id: AgreementId,
    pub couple_id: CoupleId,
    pub from: AgreementStatus,
    pub to: AgreementStatus,
    pub acted_by: Option<UserId>,
    pub occurred_at: Timestamp,
}

impl DomainEvent for AgreementTransitioned {
    fn event_type(&self) -> &'static str {
        "agreement.transitioned"
    }
    fn aggregate_id(&self) -> String {
        self.agreement_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}

/// A check-in report landed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInRecorded {
    pub event_id: EventId,
    pub check_in_id: CheckInId,
    pub agreement_id: AgreementId,
    pub status: CheckInStatus,
    pub success_streak: u32,
    pub occurred_at: Timestamp,
}

impl DomainEvent for CheckInRecorded {
    fn event_type(&self) -> &'static str {
        "agreement.check_in_recorded"
    }
    fn aggregate_id(&self) -> String {
        self.agreement_id.to_string()
    }
    fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
    fn event_id(&self) -> EventId {
        self.event_id
    }
}
