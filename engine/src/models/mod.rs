//! Plain data records exchanged with the surrounding application.

pub mod attendance;
pub mod balance;
pub mod break_record;
pub mod holiday;
pub mod leave_request;
pub mod user;
