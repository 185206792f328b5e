use async_trait::async_trait;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::errors::PromptGenError;

const OPENAI_API_BASE: &str = "https://api.openai.com";
const GROQ_API_BASE: &str = "https://api.groq.com/openai";

/// OpenAI-compatible chat completions. Also serves Groq, which exposes the
/// same API under a different base URL and key.
pub struct OpenAIProvider {
    label: &'static str,
    model: String,
    client: Client,
    timeout_secs: u64,
    api_base: String,
    key_env: &'static str,
    api_key: Option<String>,
}

impl OpenAIProvider {
    pub fn new(model: String, timeout_secs: u64) -> Self {
        Self {
            label: "openai",
            model,
            client: Client::new(),
            timeout_secs,
            api_base: OPENAI_API_BASE.to_string(),
            key_env: "OPENAI_API_KEY",
            api_key: None,
        }
    }

    pub fn groq(model: String, timeout_secs: u64) -> Self {
        Self {
            label: "groq",
            api_base: GROQ_API_BASE.to_string(),
            key_env: "GROQ_API_KEY",
            ..Self::new(model, timeout_secs)
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Use `key` instead of reading the provider's env var.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(k) => Ok(k.clone()),
            None => std::env::var(self.key_env)
                .map_err(|_| anyhow!("{} env var is not set", self.key_env)),
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        debug!(provider = self.label, %url, model = %self.model, prompt_bytes = prompt.len(), "POST chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{} request failed", self.label))?;

        let status = resp.status();
        let text = resp.text().await.with_context(|| format!("{} read body failed", self.label))?;
        debug!(provider = self.label, status = status.as_u16(), body_bytes = text.len(), "chat completion returned");

        if !status.is_success() {
            return Err(PromptGenError::Provider(format!("{} API error ({}): {}", self.label, status, text)).into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| PromptGenError::Provider(format!("failed to parse {} response: {e}", self.label)))?;

        let content = parsed.choices.into_iter().next().and_then(|c| c.message.content);
        super::non_empty(self.label, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAIProvider {
        OpenAIProvider::groq("llama-3.3-70b-versatile".into(), 5)
            .with_api_base(server.uri())
            .with_api_key("test-key")
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": { "role": "assistant", "content": "## Main Prompt\nhi" } } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = provider_for(&server).complete("prompt").await.unwrap();
        assert_eq!(out, "## Main Prompt\nhi");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("prompt").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("429"), "got: {msg}");
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": { "role": "assistant", "content": null } } ]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("empty completion"), "got: {err}");
    }

    #[tokio::test]
    async fn garbage_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("failed to parse groq response"), "got: {err}");
    }
}
