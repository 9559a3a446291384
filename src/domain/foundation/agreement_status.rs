//! AgreementStatus enum - the agreement lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of an agreement.
///
/// Transition table:
///
/// ```text
/// [pending_approval] --approve (set complete)--> active
/// [pending_approval] --archive-->                archived
/// active  --pause-->   paused
/// paused  --resume-->  active
/// active  --achieve--> achieved
/// {active, paused} --archive--> archived
/// any non-terminal --couple dissolved--> dissolved_with_couple
/// ```
///
/// `achieved`, `archived` and `dissolved_with_couple` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    #[default]
    PendingApproval,
    Active,
    Paused,
    Achieved,
    Archived,
    DissolvedWithCouple,
}

impl AgreementStatus {
    /// Returns true while the agreement still represents a live commitment.
    pub fn is_open(&self) -> bool {
        !StateMachine::is_terminal(self)
    }

    /// Returns the stable wire representation used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::PendingApproval => "pending_approval",
            AgreementStatus::Active => "active",
            AgreementStatus::Paused => "paused",
            AgreementStatus::Achieved => "achieved",
            AgreementStatus::Archived => "archived",
            AgreementStatus::DissolvedWithCouple => "dissolved_with_couple",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_approval" => Some(AgreementStatus::PendingApproval),
            "active" => Some(AgreementStatus::Active),
            "paused" => Some(AgreementStatus::Paused),
            "achieved" => Some(AgreementStatus::Achieved),
            "archived" => Some(AgreementStatus::Archived),
            "dissolved_with_couple" => Some(AgreementStatus::DissolvedWithCouple),
            _ => None,
        }
    }
}

impl StateMachine for AgreementStatus {
    fn can_transition_to(&self, target: Self) -> bool {
        use AgreementStatus::*;
        matches!(
            (self, target),
            (PendingApproval, Active)
                | (PendingApproval, Archived)
                | (Active, Paused)
                | (Paused, Active)
                | (Active, Achieved)
                | (Active, Archived)
                | (Paused, Archived)
                | (PendingApproval, DissolvedWithCouple)
                | (Active, DissolvedWithCouple)
                | (Paused, DissolvedWithCouple)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AgreementStatus::*;
        match self {
            PendingApproval => vec![Active, Archived, DissolvedWithCouple],
            Active => vec![Paused, Achieved, Archived, DissolvedWithCouple],
            Paused => vec![Active, Archived, DissolvedWithCouple],
            Achieved | Archived | DissolvedWithCouple => vec![],
        }
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
