//! SuggestionStatus enum - resolution state of an agreement suggestion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution state of a suggestion produced by the external analysis
/// collaborator. `accepted` and `dismissed` are final; a suggestion is
/// resolved at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Dismissed,
}

impl SuggestionStatus {
    /// True while the suggestion is still awaiting a decision.
    pub fn is_pending(&self) -> bool {
        matches!(self, SuggestionStatus::Pending)
    }

    /// Returns the stable wire representation used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Dismissed => "dismissed",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SuggestionStatus::Pending),
            "accepted" => Some(SuggestionStatus::Accepted),
            "dismissed" => Some(SuggestionStatus::Dismissed),
            _ => None,
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
