//! LLM client for natural-language to SQL translation
//!
//! Talks to an OpenAI-compatible chat endpoint, picks a model from the
//! provider listing, and keeps the per-session conversation.

mod ai_types;
mod chat;
mod client;
mod error;
mod model_select;
mod translator;

#[cfg(test)]
mod tests;

pub use chat::ChatModel;
pub use client::{DEFAULT_BASE_URL, LlmClient, truncate};
pub use error::LlmError;
pub use model_select::{DEFAULT_MODEL_FAMILY, select_model};
pub use translator::{Translation, Translator, extract_sql};
