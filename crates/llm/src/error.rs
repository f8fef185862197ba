//! Failures while asking the model to translate a question.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never got a status line back.
    #[error("could not reach the model API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model API answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable {what} from the model API: {source}")]
    BadReply {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("the model API sent no reply text")]
    NoReply,
    #[error("no '{family}' model is offered by the API")]
    NoModel { family: String },
    #[error("could not set up the model API client: {0}")]
    Setup(String),
    #[error("model API still failing after {attempts} attempts: {last}")]
    GaveUp { attempts: usize, last: Box<LlmError> },
}

impl LlmError {
    /// Rate limiting, gateway trouble and dropped requests are worth another try.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}
