use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::config::SummarizerConfig;

/// Text generation backend used by the summary route.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Client for an Ollama-compatible `/api/chat` endpoint. At most
/// `max_concurrency` calls are in flight; the rest wait for a permit, but no
/// longer than the request timeout.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
    permits: Arc<Semaphore>,
    queue_timeout: Duration,
}

impl OllamaClient {
    pub fn new(cfg: &SummarizerConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            permits: Arc::new(Semaphore::new(cfg.max_concurrency.max(1))),
            queue_timeout: timeout,
        })
    }
}

#[async_trait]
impl Summarizer for OllamaClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let _permit = tokio::time::timeout(self.queue_timeout, self.permits.acquire())
            .await
            .map_err(|_| {
                anyhow::anyhow!("timed out after {:?} waiting for a free model slot", self.queue_timeout)
            })?
            .context("summarizer closed")?;

        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };
        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            bail!("model server returned {status}: {text}");
        }

        let reply: ChatReply = res.json().await.context("decode chat reply")?;
        debug!(chars = reply.message.content.len(), "summary generated");
        Ok(reply.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base_url: &str) -> SummarizerConfig {
        SummarizerConfig {
            base_url: base_url.into(),
            model: "llama3".into(),
            timeout_secs: 2,
            max_concurrency: 0,
        }
    }

    #[test]
    fn endpoint_is_normalised() {
        let client = OllamaClient::new(&cfg("http://localhost:11434/")).unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434/api/chat");
        assert_eq!(client.permits.available_permits(), 1);
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "llama3",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn reply_parsing_reads_message_content() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"model":"llama3","message":{"role":"assistant","content":"A solid student."},"done":true}"#,
        )
        .unwrap();
        assert_eq!(reply.message.content, "A solid student.");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        // Port 9 (discard) on loopback is not expected to serve HTTP.
        let client = OllamaClient::new(&cfg("http://127.0.0.1:9")).unwrap();
        assert!(client.generate("hello").await.is_err());
    }

    #[tokio::test]
    async fn queued_call_gives_up_after_timeout() {
        let mut client = OllamaClient::new(&cfg("http://127.0.0.1:9")).unwrap();
        client.queue_timeout = Duration::from_millis(50);
        let _busy = client.permits.clone().try_acquire_owned().unwrap();

        let err = client.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("waiting for a free model slot"), "{err:#}");
    }
}
