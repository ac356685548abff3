//! Gmail API client for fetching Google Alert emails.

use alert_types::{AlertRecord, Notice, Reported};
use anyhow::{Context, Result};
use async_trait::async_trait;
use google_gmail1::api::{Message, Scope};
use google_gmail1::hyper_rustls::HttpsConnector;
use google_gmail1::yup_oauth2;
use google_gmail1::Gmail;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::path::Path;

use super::AlertSource;
use crate::config::{GmailAuth, GmailConfig};
use crate::error::AlertError;

/// Client for interacting with Gmail API
pub struct GmailClient {
    hub: Gmail<HttpsConnector<HttpConnector>>,
    auth: GmailAuth,
}

impl GmailClient {
    /// Build an authenticated client using the configured credential kind
    pub async fn connect(config: &GmailConfig) -> Result<Self> {
        let auth = match config.auth {
            GmailAuth::OAuth => {
                let secret = yup_oauth2::read_application_secret(&config.credentials_path)
                    .await
                    .context("Failed to read OAuth credentials")?;

                yup_oauth2::InstalledFlowAuthenticator::builder(
                    secret,
                    yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
                )
                .persist_tokens_to_disk(Path::new(&config.token_cache_path))
                .build()
                .await
                .context("Failed to build authenticator")?
            }
            GmailAuth::ServiceAccount => {
                let key = yup_oauth2::read_service_account_key(&config.credentials_path)
                    .await
                    .context("Failed to read service account key")?;

                let mut builder = yup_oauth2::ServiceAccountAuthenticator::builder(key);
                if let Some(subject) = &config.subject {
                    builder = builder.subject(subject.clone());
                }
                builder
                    .build()
                    .await
                    .context("Failed to build service account authenticator")?
            }
        };

        let connector = google_gmail1::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .context("Failed to load native TLS roots")?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = Gmail::new(client, auth);

        Ok(Self {
            hub,
            auth: config.auth,
        })
    }

    /// Snippets of every message matching `query`, in the order Gmail lists them
    pub async fn fetch_snippets(&self, query: &str) -> Result<Vec<String>> {
        let (_, list_response) = self
            .hub
            .users()
            .messages_list("me")
            .q(query)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .context("Failed to list messages")?;

        let messages = list_response.messages.unwrap_or_default();
        let mut snippets = Vec::with_capacity(messages.len());

        for msg in messages {
            if let Some(id) = msg.id {
                let message = self.get_message(&id).await?;
                snippets.push(message.snippet.unwrap_or_default());
            }
        }

        Ok(snippets)
    }

    async fn get_message(&self, message_id: &str) -> Result<Message> {
        let (_, message) = self
            .hub
            .users()
            .messages_get("me", message_id)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .with_context(|| format!("Failed to get message {}", message_id))?;

        Ok(message)
    }

    /// Fetch alerts as records; a failure yields an error notice and no records
    pub async fn fetch_alerts(&self, query: &str) -> Reported<Vec<AlertRecord>> {
        match self.fetch_snippets(query).await {
            Ok(snippets) => {
                tracing::info!("Fetched {} Google Alert email(s)", snippets.len());
                let count = snippets.len();
                Reported::new(snippets_to_records(snippets))
                    .with_notice(Notice::success(format!("Fetched {} Google Alert(s).", count)))
            }
            Err(e) => {
                tracing::error!("Failed to fetch Google Alerts: {:#}", e);
                Reported::new(Vec::new())
                    .with_notice(AlertError::fetch("Google Alerts", format!("{:#}", e)).to_notice())
            }
        }
    }
}

/// Authenticate, turning any failure into an error notice
pub async fn authenticate(config: &GmailConfig) -> Reported<Option<GmailClient>> {
    match GmailClient::connect(config).await {
        Ok(client) => {
            let message = match client.auth {
                GmailAuth::OAuth => "Authenticated using OAuth.",
                GmailAuth::ServiceAccount => "Authenticated using service account.",
            };
            tracing::info!("{}", message);
            Reported::new(Some(client)).with_notice(Notice::success(message))
        }
        Err(e) => {
            tracing::error!("Gmail authentication failed: {:#}", e);
            Reported::new(None)
                .with_notice(AlertError::Authentication(format!("{:#}", e)).to_notice())
        }
    }
}

/// Snippet-only messages become records with just a summary
fn snippets_to_records(snippets: Vec<String>) -> Vec<AlertRecord> {
    snippets.into_iter().map(AlertRecord::from_snippet).collect()
}

/// An authenticated mailbox plus the query selecting alert emails
pub struct GmailSource {
    client: GmailClient,
    query: String,
}

impl GmailSource {
    pub fn new(client: GmailClient, query: impl Into<String>) -> Self {
        Self {
            client,
            query: query.into(),
        }
    }
}

#[async_trait]
impl AlertSource for GmailSource {
    fn name(&self) -> &str {
        "gmail"
    }

    async fn fetch(&self) -> Reported<Vec<AlertRecord>> {
        self.client.fetch_alerts(&self.query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_types::NO_DATE;

    #[test]
    fn test_snippets_become_summary_only_records() {
        let records = snippets_to_records(vec![
            "Acme acquires Beta for $2B".to_string(),
            String::new(),
        ]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary, "Acme acquires Beta for $2B");
        assert!(records[0].title.is_empty());
        assert!(records[0].link.is_empty());
        assert_eq!(records[0].published, NO_DATE);
        assert_eq!(records[1].summary, "");
    }

    #[tokio::test]
    async fn test_missing_credentials_reported_as_auth_failure() {
        let config = GmailConfig {
            auth: GmailAuth::OAuth,
            credentials_path: "/nonexistent/credentials.json".to_string(),
            token_cache_path: "/nonexistent/token.json".to_string(),
            subject: None,
            query: crate::config::default_query(),
        };

        let reported = authenticate(&config).await;
        assert!(reported.value.is_none());
        assert_eq!(reported.notices.len(), 1);
        assert!(reported.notices[0].is_error());
        assert!(reported.notices[0]
            .message
            .starts_with("Authentication failed: Failed to read OAuth credentials"));
    }
}
