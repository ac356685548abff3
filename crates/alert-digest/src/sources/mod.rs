//! Alert sources: Gmail alert emails and RSS/Atom feeds.
//!
//! Both adapt their records into the same `AlertRecord` shape so the rest of
//! the pipeline does not branch on where the data came from.

pub mod feed;
pub mod gmail_client;

use alert_types::{AlertRecord, Reported};
use async_trait::async_trait;

pub use feed::{FeedSource, FeedTransport, HttpTransport};
pub use gmail_client::{authenticate, GmailClient, GmailSource};

#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Fetch all records; failures are reported as notices, never returned
    async fn fetch(&self) -> Reported<Vec<AlertRecord>>;
}
