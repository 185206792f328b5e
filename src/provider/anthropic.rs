use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::PromptGenError;
use super::Provider;

pub struct Anthropic {
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: String,
    pub api_version: String,
    client: Client,
}

impl Anthropic {
    pub fn new(model: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(Self {
            model,
            api_key: None,
            api_base: "https://api.anthropic.com".into(),
            api_version: "2023-06-01".into(),
            client,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(k) => Ok(k.clone()),
            None => std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow!("ANTHROPIC_API_KEY env var is not set")),
        }
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let body = MsgRequest {
            model: &self.model,
            max_tokens: 4096,
            messages: vec![Msg { role: "user", content: prompt }],
        };

        debug!(provider = "anthropic", %url, model = %self.model, "POST messages");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key()?)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("anthropic read body failed")?;
        debug!(provider = "anthropic", status = status.as_u16(), body_bytes = text.len(), "messages returned");

        if !status.is_success() {
            return Err(PromptGenError::Provider(format!("anthropic API error ({status}): {text}")).into());
        }

        let parsed: MsgResponse = serde_json::from_str(&text)
            .map_err(|e| PromptGenError::Provider(format!("anthropic response parse error: {e}")))?;

        // Text blocks only; tool-use blocks carry no completion text.
        let content: String = parsed
            .content
            .into_iter()
            .filter(|b| b.r#type == "text")
            .map(|b| b.text)
            .collect();

        super::non_empty(self.name(), Some(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> Anthropic {
        let mut p = Anthropic::new("claude-test".into(), 5).unwrap().with_api_base(server.uri());
        p.api_key = Some("k".into());
        p
    }

    #[tokio::test]
    async fn joins_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "k"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "text", "text": "## Main Prompt\n" },
                    { "type": "text", "text": "Build it" }
                ]
            })))
            .mount(&server)
            .await;

        let out = provider_for(&server).complete("p").await.unwrap();
        assert_eq!(out, "## Main Prompt\nBuild it");
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete("p").await.unwrap_err();
        assert!(err.to_string().contains("500"), "got: {err}");
    }
}
