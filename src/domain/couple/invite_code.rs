//! Invite code value object and minting.
//!
//! A code is the one-time token that links two users into a couple. Codes
//! are short enough to read over a voice call, so the alphabet excludes
//! the glyphs people misread: I, O, 0 and 1.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// Restricted 32-glyph alphabet. No I/O/0/1.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Invite codes are exactly this many characters.
pub const CODE_LENGTH: usize = 6;

/// Codes expire this many days after minting.
pub const CODE_TTL_DAYS: i64 = 7;

/// Draws a fresh code from the restricted alphabet.
///
/// Collisions at 6 characters over a 32-glyph alphabet are negligible
/// (one in 32^6 ≈ a billion) but the caller must still handle them by
/// retrying the mint.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Validates that a redeemer-supplied code has the right shape before
/// touching storage.
pub fn validate_code_format(code: &str) -> Result<(), ValidationError> {
    if code.len() != CODE_LENGTH {
        return Err(ValidationError::invalid_format(
            "code",
            format!("expected exactly {} characters", CODE_LENGTH),
        ));
    }
    if !code.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
        return Err(ValidationError::invalid_format(
            "code",
            "contains characters outside the invite alphabet",
        ));
    }
    Ok(())
}

/// A single-use pairing invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteCode {
    pub code: String,
    pub owner_id: UserId,
    pub expires_at: Timestamp,
    pub used_by: Option<UserId>,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl InviteCode {
    /// Mints a new invite for `owner_id`, expiring in [`CODE_TTL_DAYS`].
    pub fn mint<R: Rng + ?Sized>(rng: &mut R, owner_id: UserId, now: Timestamp) -> Self {
        Self {
            code: generate_code(rng),
            owner_id,
            expires_at: now.add_days(CODE_TTL_DAYS),
            used_by: None,
            used_at: None,
            created_at: now,
        }
    }

    /// True once someone has redeemed this code.
    pub fn is_used(&self) -> bool {
        self.used_by.is_some()
    }

    /// True once the expiry has passed.
    pub fn is_expired(&self, now: &Timestamp) -> bool {
        self.expires_at.has_passed(now)
    }

    /// A code is redeemable while unused, unexpired, and not owned by
    /// the redeemer. All three failures look identical to the caller;
    /// an attacker probing codes learns nothing from the distinction.
    pub fn is_redeemable_by(&self, redeemer: &UserId, now: &Timestamp) -> bool {
        !self.is_used() && !self.is_expired(now) && &self.owner_id != redeemer
    }

    /// Marks the code consumed.
    pub fn mark_used(&mut self, used_by: UserId, now: Timestamp) {
        self.used_by = Some(used_by);
        self.used_at = Some(now);
    }
}
