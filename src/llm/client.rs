//! Chat-completions client for the Groq OpenAI-compatible API.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{ConfigError, ModelError};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes git commit histories \
and classifies an author's contributions into fixed categories, focusing on concrete \
technical changes.";

/// Maximum response body kept in provider error messages.
const MAX_ERROR_BODY: usize = 500;

/// A text completion service: prompt in, reply text out.
///
/// This abstraction allows replacing the remote model in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Groq chat-completions client holding the bearer credential.
pub struct GroqClient {
    http: Client,
    config: ModelConfig,
}

impl GroqClient {
    pub fn new(config: ModelConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(concat!("gauthor/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            "Sending {} char prompt to {} ({})",
            prompt.len(),
            self.config.model,
            self.config.completions_url()
        );

        let response = self
            .http
            .post(self.config.completions_url())
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.config.credential.expose()),
            )
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ModelError::Authentication(status.as_u16()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(ModelError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        Ok(content)
    }
}

impl GroqClient {
    fn map_transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.config.timeout.as_secs())
        } else if err.is_decode() {
            ModelError::UnparseableReply(format!("invalid completion payload: {err}"))
        } else {
            ModelError::Request(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;

    #[test]
    fn test_request_serializes_openai_shape() {
        let request = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
            temperature: 0.1,
            max_tokens: 2000,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "u");
        assert_eq!(value["max_tokens"], 2000);
    }

    #[test]
    fn test_response_without_choices_deserializes() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = GroqClient::new(ModelConfig::new(Credential::new("k"))).unwrap();
        assert_eq!(client.config().model, crate::config::DEFAULT_MODEL);
    }
}
