/// LLM Client — the single point of entry for all text-generation calls.
///
/// No other module talks to the provider directly. The client speaks the
/// OpenAI-compatible chat-completions protocol, which Together AI (the
/// default provider) and most hosted model APIs accept.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct-Lite";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured for the text-generation provider")]
    MissingApiKey,

    #[error("Provider rejected the API key (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not parse provider response: {0}")]
    Parse(#[source] reqwest::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Connection settings for the provider, split out of the app config.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// One prompt plus sampling parameters.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// The generated text, exactly as the provider returned it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Usage>,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(LlmError::Client)?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Sends one chat completion and returns the text verbatim.
    ///
    /// Fails with `MissingApiKey` before any network I/O when no key is set.
    /// Retries 429, 5xx and transport failures with exponential backoff;
    /// authentication failures are returned immediately.
    pub async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: 0.9,
        };
        let url = self.endpoint();

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // 1s, 2s, ...
                let delay = Duration::from_millis(BACKOFF_BASE_MS << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.settings.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, message);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let raw = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&raw)
                    .map(|e| e.error.message)
                    .unwrap_or(raw);
                return Err(
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        LlmError::Auth {
                            status: status.as_u16(),
                            message,
                        }
                    } else {
                        LlmError::Api {
                            status: status.as_u16(),
                            message,
                        }
                    },
                );
            }

            let parsed: ChatResponse = response.json().await.map_err(LlmError::Parse)?;

            if let Some(usage) = &parsed.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            let text = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|t| !t.trim().is_empty())
                .ok_or(LlmError::EmptyContent)?;

            return Ok(Completion {
                text,
                usage: parsed.usage,
            });
        }

        Err(last_error.unwrap_or(LlmError::EmptyContent))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-process stand-in for the provider, bound to an ephemeral port.

    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::{LlmClient, LlmSettings};

    /// What the stub answers with.
    #[derive(Clone)]
    pub enum StubReply {
        /// Echo the user message back as the completion.
        EchoPrompt,
        /// Fixed completion text.
        Text(String),
        /// Bare status code with a provider-style error body.
        Status(u16),
    }

    #[derive(Clone)]
    struct StubState {
        reply: StubReply,
        hits: Arc<AtomicUsize>,
    }

    pub struct StubProvider {
        pub base_url: String,
        pub hits: Arc<AtomicUsize>,
    }

    impl StubProvider {
        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        pub fn client(&self, api_key: &str) -> LlmClient {
            client_for(&self.base_url, api_key)
        }
    }

    pub fn client_for(base_url: &str, api_key: &str) -> LlmClient {
        LlmClient::new(LlmSettings {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            model: "stub-model".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn handle(State(state): State<StubState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        state.hits.fetch_add(1, Ordering::SeqCst);
        let content = match state.reply {
            StubReply::Status(code) => {
                let status = StatusCode::from_u16(code).unwrap();
                return (status, Json(json!({"error": {"message": "stubbed failure"}})));
            }
            StubReply::Text(text) => text,
            StubReply::EchoPrompt => body["messages"]
                .as_array()
                .and_then(|m| m.iter().find(|m| m["role"] == "user"))
                .and_then(|m| m["content"].as_str())
                .unwrap_or_default()
                .to_string(),
        };
        (
            StatusCode::OK,
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 20}
            })),
        )
    }

    pub async fn spawn_stub(reply: StubReply) -> StubProvider {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v1/chat/completions", post(handle))
            .with_state(StubState {
                reply,
                hits: hits.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubProvider {
            base_url: format!("http://{addr}/v1"),
            hits,
        }
    }
}
