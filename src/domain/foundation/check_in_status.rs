//! CheckInStatus enum - how a check-in self-report went.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome reported in a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Good,
    Partial,
    Difficult,
    NeedsChange,
}

impl CheckInStatus {
    /// Whether this report counts toward the success streak.
    ///
    /// `good` and `partial` extend the streak; `difficult` and
    /// `needs_change` reset it.
    pub fn is_successful(&self) -> bool {
        matches!(self, CheckInStatus::Good | CheckInStatus::Partial)
    }

    /// Returns the stable wire representation used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInStatus::Good => "good",
            CheckInStatus::Partial => "partial",
            CheckInStatus::Difficult => "difficult",
            CheckInStatus::NeedsChange => "needs_change",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "good" => Some(CheckInStatus::Good),
            "partial" => Some(CheckInStatus::Partial),
            "difficult" => Some(CheckInStatus::Difficult),
            "needs_change" => Some(CheckInStatus::NeedsChange),
            _ => None,
        }
    }
}

impl fmt::Display for CheckInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_and_partial_are_successful() {
        assert!(CheckInStatus::Good.is_successful());
        assert!(CheckInStatus::Partial.is_successful());
        assert!(!CheckInStatus::Difficult.is_successful());
        assert!(!CheckInStatus::NeedsChange.is_successful());
    }

    #[test]
    fn wire_format_round_trips() {
        for status in [
            CheckInStatus::Good,
            CheckInStatus::Partial,
            CheckInStatus::Difficult,
            CheckInStatus::NeedsChange,
        ] {
            assert_eq!(CheckInStatus::parse(status.as_str()), Some(status));
        }
    }
}
