use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::PromptGenError;
use super::Provider;

const DEFAULT_URL: &str = "http://localhost:11434";

pub struct Ollama {
    pub model: String,
    pub url: String,
    client: Client,
}

impl Ollama {
    pub fn new(model: String, url: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(Self {
            model,
            url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: prompt }],
            stream: false,
        };

        debug!(provider = "ollama", %url, model = %self.model, "POST chat");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;
        debug!(provider = "ollama", status = status.as_u16(), body_bytes = text.len(), "chat returned");

        if !status.is_success() {
            return Err(PromptGenError::Provider(format!("ollama error ({status}): {text}")).into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| PromptGenError::Provider(format!("ollama response parse error: {e}")))?;

        super::non_empty(self.name(), Some(parsed.message.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_non_streaming_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "model": "llama3", "stream": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": { "role": "assistant", "content": "done" }
            })))
            .mount(&server)
            .await;

        let p = Ollama::new("llama3".into(), Some(server.uri()), 5).unwrap();
        assert_eq!(p.complete("p").await.unwrap(), "done");
    }

    #[tokio::test]
    async fn blank_message_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": { "role": "assistant", "content": "" }
            })))
            .mount(&server)
            .await;

        let p = Ollama::new("llama3".into(), Some(server.uri()), 5).unwrap();
        assert!(p.complete("p").await.is_err());
    }
}
