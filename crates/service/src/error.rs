//! Typed error enum for the service layer.

use mysqlc_llm::LlmError;
use mysqlc_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage and LLM failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Database or history file operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Model API call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Caller provided invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Translation was requested without a configured model client.
    #[error("not configured: {0}")]
    NotConfigured(String),
}
