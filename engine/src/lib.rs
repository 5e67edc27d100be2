//! Attendance time accounting, leave balances and bond projections for the HR
//! dashboard.

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;
pub mod validation;

pub use error::{EngineError, Result};
