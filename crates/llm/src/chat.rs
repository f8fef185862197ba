use async_trait::async_trait;
use mysqlc_core::Turn;

use crate::error::LlmError;

/// A chat-capable language model provider.
///
/// Held once per session and handed to the [`Translator`](crate::Translator).
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifiers of the models the provider currently offers.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Continue a conversation seeded with `transcript` and return the reply.
    async fn send_message(
        &self,
        model: &str,
        transcript: &[Turn],
        message: &str,
    ) -> Result<String, LlmError>;
}
