//! Error taxonomy for the digest pipeline.
//!
//! Authentication, fetch and summarization failures are caught at the stage
//! that produced them and turned into user-visible notices; the typed variants
//! exist so the conversion keeps a consistent wording.

use alert_types::Notice;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    /// Mail API credentials could not be obtained
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A single source (mailbox or feed URL) could not be read
    #[error("Failed to fetch {origin}: {message}")]
    Fetch { origin: String, message: String },

    /// Summarization endpoint failed or returned nothing usable
    #[error("Error generating summary: {0}")]
    Summarization(String),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AlertError {
    pub fn fetch(origin: impl Into<String>, err: impl std::fmt::Display) -> Self {
        AlertError::Fetch {
            origin: origin.into(),
            message: err.to_string(),
        }
    }

    /// Create a config error for missing env vars
    pub fn missing_env(var_name: &str) -> Self {
        AlertError::Config(format!("{} environment variable must be set", var_name))
    }

    /// Render as the notice shown to the user
    pub fn to_notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message() {
        let err = AlertError::fetch("https://example.com/feed", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/feed: connection refused"
        );
        assert!(err.to_notice().is_error());
    }

    #[test]
    fn test_missing_env_message() {
        let err = AlertError::missing_env("OPENAI_API_KEY");
        assert_eq!(
            err.to_string(),
            "Configuration error: OPENAI_API_KEY environment variable must be set"
        );
    }
}
