//! Validation rules for payloads entering the engine.

pub mod rules;

pub use validator::Validate;
