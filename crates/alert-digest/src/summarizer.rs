//! Natural-language summaries of alert records via an OpenAI-compatible
//! chat completions endpoint.

use alert_types::{AlertRecord, Notice, Reported};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SummarizerConfig;
use crate::error::AlertError;

pub const SYSTEM_PROMPT: &str = "You are an analyst who reads Google Alerts about mergers and \
acquisitions. Summarize the following alerts in a few concise bullet points, naming the \
companies involved and the nature of each deal.";

const SUMMARY_HEADING: &str = "## Summary";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// =============================================================================
// OpenAI client
// =============================================================================

pub struct OpenAiSummarizer {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    http: reqwest::Client,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 1024,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &SummarizerConfig) -> crate::error::Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(api_key, config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_max_tokens(config.max_tokens))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, "chat completion request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("API error ({}): {}", status, error_text));
        }

        let chat: ChatResponse = response.json().await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from model"))
    }
}

// =============================================================================
// Prompt and stage entry point
// =============================================================================

/// One line per record: `- title: link`, or `- snippet` when there is no title
pub fn build_prompt(records: &[AlertRecord]) -> String {
    records
        .iter()
        .map(|r| {
            if r.title.is_empty() {
                format!("- {}", r.summary)
            } else {
                format!("- {}: {}", r.title, r.link)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarize `records`; on failure the summary is empty and an error notice is attached
pub async fn summarize(summarizer: &dyn Summarizer, records: &[AlertRecord]) -> Reported<String> {
    if records.is_empty() {
        return Reported::new(String::new());
    }

    let prompt = build_prompt(records);
    match summarizer.complete(SYSTEM_PROMPT, &prompt).await {
        Ok(text) => {
            tracing::info!("Generated summary for {} alert(s)", records.len());
            Reported::new(format!("{}\n\n{}", SUMMARY_HEADING, text.trim()))
                .with_notice(Notice::success("Summary generated."))
        }
        Err(e) => failed(AlertError::Summarization(format!("{:#}", e))),
    }
}

/// Build the configured client; a setup failure is reported as a summarization error
pub fn client_from_config(config: &SummarizerConfig) -> Reported<Option<OpenAiSummarizer>> {
    match OpenAiSummarizer::from_config(config) {
        Ok(client) => Reported::new(Some(client)),
        Err(e) => {
            let err = match e {
                AlertError::Summarization(_) => e,
                other => AlertError::Summarization(other.to_string()),
            };
            tracing::error!("{}", err);
            Reported::new(None).with_notice(err.to_notice())
        }
    }
}

/// Empty summary carrying `err` as the notice
fn failed(err: AlertError) -> Reported<String> {
    tracing::error!("{}", err);
    Reported::new(String::new()).with_notice(err.to_notice())
}
