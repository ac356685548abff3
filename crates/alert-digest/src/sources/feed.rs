// RSS/Atom feed source.
// Each feed is fetched and parsed independently; a broken feed is reported and skipped.

use std::time::Duration;

use alert_types::{AlertRecord, Notice, Reported, NO_DATE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::AlertSource;
use crate::config::FeedsConfig;
use crate::error::AlertError;
use crate::sanitize::strip_tags;

/// Retrieves the raw bytes of a feed document
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &FeedsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build feed HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Feed request failed")?
            .error_for_status()
            .context("Feed server returned an error")?;

        let bytes = resp.bytes().await.context("Failed to read feed body")?;
        Ok(bytes.to_vec())
    }
}

/// Parse an RSS, Atom or JSON feed document into alert records
pub fn parse_feed(body: &[u8]) -> Result<Vec<AlertRecord>> {
    let feed = feed_rs::parser::parse(body).context("Failed to parse RSS/Atom feed")?;

    let records = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry
                .title
                .map(|t| strip_tags(&t.content))
                .unwrap_or_default();

            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();

            let summary = entry
                .summary
                .map(|t| t.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| strip_tags(&s))
                .unwrap_or_default();

            let published = entry
                .published
                .or(entry.updated)
                .map(format_timestamp)
                .unwrap_or_else(|| NO_DATE.to_string());

            AlertRecord {
                title,
                link,
                summary,
                published,
            }
        })
        .collect();

    Ok(records)
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub struct FeedSource<T: FeedTransport = HttpTransport> {
    urls: Vec<String>,
    transport: T,
}

impl FeedSource<HttpTransport> {
    pub fn from_config(config: &FeedsConfig) -> Result<Self> {
        Ok(Self::new(config.urls.clone(), HttpTransport::new(config)?))
    }
}

impl<T: FeedTransport> FeedSource<T> {
    pub fn new(urls: Vec<String>, transport: T) -> Self {
        Self { urls, transport }
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<AlertRecord>> {
        let body = self.transport.get(url).await?;
        parse_feed(&body)
    }
}

#[async_trait]
impl<T: FeedTransport> AlertSource for FeedSource<T> {
    fn name(&self) -> &str {
        "feeds"
    }

    async fn fetch(&self) -> Reported<Vec<AlertRecord>> {
        let mut records = Vec::new();
        let mut notices = Vec::new();

        for url in &self.urls {
            match self.fetch_one(url).await {
                Ok(entries) => {
                    info!(feed_url = %url, items = entries.len(), "feed: parsed successfully");
                    records.extend(entries);
                }
                Err(e) => {
                    warn!(feed_url = %url, "feed: skipped: {:#}", e);
                    notices.push(AlertError::fetch(url, format!("{:#}", e)).to_notice());
                }
            }
        }

        notices.push(Notice::success(format!(
            "Fetched {} alert(s) from {} feed(s).",
            records.len(),
            self.urls.len()
        )));

        Reported {
            value: records,
            notices,
        }
    }
}
