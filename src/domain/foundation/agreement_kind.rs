//! AgreementKind enum - the category vocabulary for agreements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an agreement. Fixed vocabulary; the core is not a
/// general workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgreementKind {
    #[default]
    Behavior,
    Communication,
    Ritual,
    Experiment,
    Commitment,
}

impl AgreementKind {
    /// Returns the stable wire representation used in storage and APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementKind::Behavior => "behavior",
            AgreementKind::Communication => "communication",
            AgreementKind::Ritual => "ritual",
            AgreementKind::Experiment => "experiment",
            AgreementKind::Commitment => "commitment",
        }
    }

    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "behavior" => Some(AgreementKind::Behavior),
            "communication" => Some(AgreementKind::Communication),
            "ritual" => Some(AgreementKind::Ritual),
            "experiment" => Some(AgreementKind::Experiment),
            "commitment" => Some(AgreementKind::Commitment),
            _ => None,
        }
    }
}

impl fmt::Display for AgreementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
