use thiserror::Error;

/// Failures the engine reports to its caller.
///
/// Every operation that returns one of these leaves its inputs untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Standard break already taken today")]
    StandardBreakAlreadyTaken,

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

impl EngineError {
    /// Stable machine-readable code for the surrounding application.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidState(_) => "INVALID_STATE",
            EngineError::StandardBreakAlreadyTaken => "STANDARD_BREAK_TAKEN",
            EngineError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EngineError::InvalidRange(_) => "INVALID_RANGE",
            EngineError::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            EngineError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        messages.sort();
        EngineError::Validation(messages)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
