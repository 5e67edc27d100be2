//! The accounting engine. Every function here is pure over its inputs and an
//! explicit `now`/`today`, except the month-end close which also talks to a
//! ledger.

pub mod balance;
pub mod bond;
pub mod holiday;
pub mod leave_days;
pub mod month_end;
pub mod time_accounting;
