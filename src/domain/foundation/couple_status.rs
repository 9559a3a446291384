//! CoupleStatus enum - lifecycle of the two-user pairing.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a couple.
///
/// `pending_dissolution` is the handshake window: the initiator has
/// asked to unwind the pairing and the partner has not yet confirmed
/// or canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoupleStatus {
    #[default]
    Active,
    PendingDissolution,
    Dissolved,
}

impl CoupleStatus {
    /// Returns the stable wire representation used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoupleStatus::Active => "active",
            CoupleStatus::PendingDissolution => "pending_dissolution",
            CoupleStatus::Dissolved => "dissolved",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CoupleStatus::Active),
            "pending_dissolution" => Some(CoupleStatus::PendingDissolution),
            "dissolved" => Some(CoupleStatus::Dissolved),
            _ => None,
        }
    }
}

impl StateMachine for CoupleStatus {
    fn can_transition_to(&self, target: Self) -> bool {
        use CoupleStatus::*;
        matches!(
            (self, target),
            (Active, PendingDissolution)
                | (PendingDissolution, Dissolved)
                | (PendingDissolution, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CoupleStatus::*;
        match self {
            Active => vec![PendingDissolution],
            PendingDissolution => vec![Dissolved, Active],
            Dissolved => vec![],
        }
    }
}

impl fmt::Display for CoupleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
