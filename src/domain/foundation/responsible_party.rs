//! ResponsibleParty enum - which couple member a suggestion targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Responsible party named by an agreement suggestion.
///
/// The external analysis collaborator does not know concrete user ids;
/// it speaks in couple positions. The intake resolves these against the
/// couple's membership when the suggestion is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponsibleParty {
    #[default]
    Both,
    UserA,
    UserB,
}

impl ResponsibleParty {
    /// Returns the stable wire representation used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponsibleParty::Both => "both",
            ResponsibleParty::UserA => "user_a",
            ResponsibleParty::UserB => "user_b",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "both" => Some(ResponsibleParty::Both),
            "user_a" => Some(ResponsibleParty::UserA),
            "user_b" => Some(ResponsibleParty::UserB),
            _ => None,
        }
    }
}

impl fmt::Display for ResponsibleParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_round_trips() {
        for party in [
            ResponsibleParty::Both,
            ResponsibleParty::UserA,
            ResponsibleParty::UserB,
        ] {
            assert_eq!(ResponsibleParty::parse(party.as_str()), Some(party));
        }
    }
}
