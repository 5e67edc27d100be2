mod id;

pub use id::{AttendanceId, HolidayId, LeaveRequestId, UserId};
