//! Error types for the maintenance engine.
//!
//! Only validation failures and unknown ids cross the engine boundary.
//! Provider and parse failures are absorbed by the generator (see
//! `llm_client::LlmError` and `generator::parse::ParseError`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// HTTP status code for this error at the API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::Validation(_) => 400,
            EngineError::NotFound { .. } => 404,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
