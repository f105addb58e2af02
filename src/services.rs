//! External model capabilities.
//!
//! Sentiment classification and abstractive summarization are served by a
//! local model sidecar over HTTP; report polishing goes through the
//! OpenRouter chat-completions API. Each capability is a trait so the
//! pipeline can run against mocks without the real models or network.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub score: f64,
}

#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentScore>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, min_words: usize, max_words: usize) -> Result<String>;
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Client for the local sidecar hosting the pretrained sentiment classifier
/// and abstractive summarizer.
pub struct ModelSidecar {
    client: reqwest::Client,
    base_url: String,
}

impl ModelSidecar {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url })
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary_text: String,
}

#[async_trait]
impl SentimentModel for ModelSidecar {
    async fn classify(&self, text: &str) -> Result<SentimentScore> {
        let response = self
            .client
            .post(format!("{}/ml/sentiment", self.base_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("sentiment sidecar returned {}", response.status()));
        }
        Ok(response.json::<SentimentScore>().await?)
    }
}

#[async_trait]
impl Summarizer for ModelSidecar {
    async fn summarize(&self, text: &str, min_words: usize, max_words: usize) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/ml/summarize", self.base_url))
            .json(&serde_json::json!({
                "text": text,
                "min_length": min_words,
                "max_length": max_words,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("summarizer sidecar returned {}", response.status()));
        }
        Ok(response.json::<SummaryResponse>().await?.summary_text)
    }
}

/// OpenRouter chat-completions client used to polish category reports.
///
/// This is the only remote dependency, so calls carry a request timeout and
/// a bounded retry.
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

const CHAT_MODEL: &str = "openai/gpt-3.5-turbo";
const CHAT_ATTEMPTS: u32 = 3;
const CHAT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

impl OpenRouterClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model: CHAT_MODEL.to_string(),
        })
    }

    async fn request(&self, system: &str, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "max_tokens": 200,
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenRouter error {}: {}", status, error_text));
        }

        let raw = response.json::<serde_json::Value>().await?;
        let content = raw["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("no message content in chat response"))?;
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ChatCompletion for OpenRouterClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let mut last_err = None;
        for attempt in 1..=CHAT_ATTEMPTS {
            match self.request(system, prompt).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!("chat completion attempt {}/{} failed: {}", attempt, CHAT_ATTEMPTS, e);
                    last_err = Some(e);
                    if attempt < CHAT_ATTEMPTS {
                        tokio::time::sleep(CHAT_RETRY_BACKOFF).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("chat completion failed")))
    }
}
