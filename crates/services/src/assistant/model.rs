use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;

/// Something that answers a prompt with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// # Errors
    ///
    /// Returns `AssistantError` when the request fails or yields no text.
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError>;
}

#[derive(Clone, Debug)]
pub struct ChatCompletionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ChatCompletionsConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("STUDY_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("STUDY_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("STUDY_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionsModel {
    client: Client,
    config: ChatCompletionsConfig,
}

impl ChatCompletionsModel {
    #[must_use]
    pub fn new(config: ChatCompletionsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        ChatCompletionsConfig::from_env().map(Self::new)
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.7,
            max_tokens: 2048,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AssistantError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

/// Quota exhaustion is reported with 429 by most providers; the body tells
/// it apart from ordinary rate limiting.
fn classify_failure(status: reqwest::StatusCode, body: &str) -> AssistantError {
    if body.to_ascii_lowercase().contains("quota") {
        let detail: String = body.chars().take(200).collect();
        return AssistantError::Quota(detail);
    }
    AssistantError::HttpStatus(status)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn quota_bodies_are_not_plain_rate_limits() {
        let err = classify_failure(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":"insufficient_quota"}}"#,
        );
        assert!(matches!(err, AssistantError::Quota(_)));

        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, AssistantError::HttpStatus(StatusCode::TOO_MANY_REQUESTS)));
        assert!(err.is_transient());

        assert!(!classify_failure(StatusCode::UNAUTHORIZED, "").is_transient());
    }

    #[test]
    fn response_without_content_parses() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());
    }
}
