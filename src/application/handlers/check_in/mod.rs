//! Check-in engine - periodic self-reports against active agreements.

mod record_check_in;

pub use record_check_in::{RecordCheckInCommand, RecordCheckInHandler, RecordCheckInResult};
