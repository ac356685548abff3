use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AlertError, Result};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gmail access; absent when only feeds are used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmail: Option<GmailConfig>,

    #[serde(default)]
    pub feeds: FeedsConfig,

    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GmailAuth {
    /// Installed-application OAuth flow, token cached on disk
    #[serde(rename = "oauth")]
    OAuth,
    /// Pre-provisioned service-account key
    ServiceAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    #[serde(default = "default_auth")]
    pub auth: GmailAuth,

    /// OAuth client secret JSON or service-account key JSON
    pub credentials_path: String,

    /// Where the OAuth flow stores its tokens
    #[serde(default = "default_token_cache")]
    pub token_cache_path: String,

    /// Mailbox to impersonate with a service account (domain-wide delegation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Gmail search query selecting alert emails
    #[serde(default = "default_query")]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Feed URLs, processed in this order
    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Falls back to the OPENAI_API_KEY environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_auth() -> GmailAuth {
    GmailAuth::OAuth
}

fn default_token_cache() -> String {
    "gmail_token_cache.json".to_string()
}

pub fn default_query() -> String {
    "subject:Google Alert".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("alert-digest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl SummarizerConfig {
    /// API key from the file, else from the environment
    pub fn resolve_api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) if !key.is_empty() => Ok(key.clone()),
            _ => std::env::var(API_KEY_ENV).map_err(|_| AlertError::missing_env(API_KEY_ENV)),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!("Loading config from {}", path.display());
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn example() -> Self {
        Config {
            gmail: Some(GmailConfig {
                auth: GmailAuth::OAuth,
                credentials_path: "credentials.json".to_string(),
                token_cache_path: default_token_cache(),
                subject: None,
                query: default_query(),
            }),
            feeds: FeedsConfig {
                urls: vec![
                    "https://www.google.com/alerts/feeds/00000000000000000000/0000000000000000000"
                        .to_string(),
                ],
                ..FeedsConfig::default()
            },
            summarizer: SummarizerConfig::default(),
        }
    }

    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::example())
            .map_err(|e| AlertError::Config(format!("Failed to render example config: {}", e)))
    }
}
