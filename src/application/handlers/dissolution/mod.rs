//! Dissolution protocol - the initiate/confirm/cancel handshake.

mod cancel_dissolution;
mod confirm_dissolution;
mod couple_status;
mod initiate_dissolution;

pub use cancel_dissolution::{CancelDissolutionCommand, CancelDissolutionHandler};
pub use confirm_dissolution::{ConfirmDissolutionCommand, ConfirmDissolutionHandler};
pub use couple_status::{
    CoupleStatusQuery, CoupleStatusView, GetCoupleStatusHandler, PendingDissolutionView,
};
pub use initiate_dissolution::{
    InitiateDissolutionCommand, InitiateDissolutionHandler, InitiateDissolutionResult,
};
