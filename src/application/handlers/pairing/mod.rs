//! Pairing service - invite code issuance and redemption.

mod issue_code;
mod redeem_code;

pub use issue_code::{IssueInviteCodeCommand, IssueInviteCodeHandler, IssueInviteCodeResult};
pub use redeem_code::{RedeemInviteCodeCommand, RedeemInviteCodeHandler, RedeemInviteCodeResult};
