use async_trait::async_trait;
use mysqlc_core::{Role, Turn};

use crate::ai_types::{ChatRequest, ChatResponse, Message, ModelList};
use crate::chat::ChatModel;
use crate::error::LlmError;

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 0.95;
const MAX_TOKENS: u32 = 8192;

/// Client for an OpenAI-compatible chat API.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmClient {
    /// Creates a new LLM client with the given API key and base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Setup(e.to_string()))?;
        Ok(Self { client, api_key, base_url })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, retrying transient failures, and return the body.
    async fn send_with_retry<F>(&self, build: F) -> Result<String, LlmError>
    where
        F: Fn() -> reqwest::RequestBuilder + Send + Sync,
    {
        const MAX_RETRIES: usize = 3;
        const RETRY_DELAYS: [u64; 4] = [0, 1, 2, 4];
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay_secs = RETRY_DELAYS.get(attempt).copied().unwrap_or(4);
                let delay = std::time::Duration::from_secs(delay_secs);
                tokio::time::sleep(delay).await;
                tracing::warn!("LLM retry attempt {attempt}/{MAX_RETRIES} after {delay:?}");
            }

            let response = match build().bearer_auth(&self.api_key).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Transport(e));
                    continue;
                },
            };

            let status = response.status();
            if status.is_success() {
                match response.text().await {
                    Ok(body) => return Ok(body),
                    Err(e) => {
                        last_error = Some(LlmError::Transport(e));
                        continue;
                    },
                }
            }

            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            let err = LlmError::Status { status: status.as_u16(), body };
            if err.is_retryable() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(LlmError::GaveUp {
            attempts: MAX_RETRIES + 1,
            last: Box::new(last_error.unwrap_or(LlmError::NoReply)),
        })
    }

    /// Send a chat completion request and return the reply text.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the API returns a
    /// non-success status, the response body cannot be parsed, or the choices
    /// array is empty.
    pub(crate) async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.send_with_retry(|| self.client.post(&url).json(request)).await?;

        let chat_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::BadReply {
                what: format!("chat completion (body: {})", truncate(&body, 200)),
                source: e,
            })?;

        let first_choice = chat_response.choices.into_iter().next().ok_or(LlmError::NoReply)?;
        Ok(first_choice.message.content.unwrap_or_default())
    }

    /// List model identifiers offered by the provider.
    ///
    /// # Errors
    /// Returns an error if the request fails or the listing cannot be parsed.
    pub async fn list_model_names(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let body = self.send_with_retry(|| self.client.get(&url)).await?;
        let list: ModelList = serde_json::from_str(&body).map_err(|e| LlmError::BadReply {
            what: format!("model list (body: {})", truncate(&body, 200)),
            source: e,
        })?;
        Ok(list
            .data
            .into_iter()
            .map(|m| m.id.strip_prefix("models/").map_or_else(|| m.id.clone(), str::to_owned))
            .collect())
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.list_model_names().await
    }

    async fn send_message(
        &self,
        model: &str,
        transcript: &[Turn],
        message: &str,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<Message> = transcript
            .iter()
            .map(|turn| Message { role: wire_role(turn.role).to_owned(), content: turn.text.clone() })
            .collect();
        messages.push(Message { role: "user".to_owned(), content: message.to_owned() });

        let request = ChatRequest {
            model: model.to_owned(),
            messages,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
        };
        self.chat_completion(&request).await
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
