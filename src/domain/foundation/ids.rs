//! Strongly-typed identifier value objects.
//!
//! Every identifier in the domain is a UUID behind a newtype so that a
//! `CoupleId` can never be passed where an `AgreementId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a user profile.
    ///
    /// Profiles themselves are owned by the (out of scope) auth system;
    /// this core only references them.
    UserId
}

uuid_id! {
    /// Unique identifier for a couple (the two-user pairing scope).
    CoupleId
}

uuid_id! {
    /// Unique identifier for an agreement.
    AgreementId
}

uuid_id! {
    /// Unique identifier for a check-in report.
    CheckInId
}

uuid_id! {
    /// Unique identifier for an externally-proposed agreement suggestion.
    SuggestionId
}

uuid_id! {
    /// Identifier of the conversation session an agreement or suggestion
    /// originated from. The session itself lives outside this core.
    SessionId
}

uuid_id! {
    /// Unique identifier for a domain event instance.
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(CoupleId::new(), CoupleId::new());
        assert_ne!(AgreementId::new(), AgreementId::new());
    }

    #[test]
    fn id_round_trips_through_display_and_parse() {
        let id = AgreementId::new();
        let parsed: AgreementId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_rejects_malformed_string() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = SuggestionId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = CheckInId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }
}
