//! Stage functions chained by the command handlers.
//!
//! fetch -> keyword filter -> date filter -> categorize/report -> summarize.
//! Every stage takes the previous stage's output and returns its own value
//! together with the notices raised along the way.

use alert_types::{AlertRecord, CategoryBucket, Notice, Reported};
use chrono::NaiveDate;

use crate::config::SummarizerConfig;
use crate::filter::{filter_acquisitions, filter_by_date, DateRange};
use crate::report::{bucket_by_category, format_report};
use crate::sources::AlertSource;
use crate::summarizer::{self, Summarizer};

/// Filtered, categorized view of one fetch
#[derive(Debug, Clone)]
pub struct Digest {
    pub records: Vec<AlertRecord>,
    pub buckets: Vec<CategoryBucket>,
    pub report: String,
}

pub async fn fetch(source: &dyn AlertSource) -> Reported<Vec<AlertRecord>> {
    tracing::info!("Fetching alerts from {}", source.name());
    source.fetch().await
}

/// Keyword filter, date filter, then categorize and render
pub fn digest_records(records: &[AlertRecord], range: DateRange, today: NaiveDate) -> Digest {
    let matching = filter_acquisitions(records);
    let in_range = filter_by_date(&matching, range);
    tracing::info!(
        "{} of {} alert(s) match keywords, {} within {}..={}",
        matching.len(),
        records.len(),
        in_range.len(),
        range.start,
        range.end
    );

    let buckets = bucket_by_category(&in_range);
    let report = format_report(&buckets, today);

    Digest {
        records: in_range,
        buckets,
        report,
    }
}

/// Summarize with the configured endpoint; a missing key is reported, not fatal
pub async fn summarize_with_config(
    config: &SummarizerConfig,
    records: &[AlertRecord],
) -> Reported<String> {
    let setup = summarizer::client_from_config(config);
    match setup.value {
        Some(client) => summarizer::summarize(&client, records).await,
        None => Reported {
            value: String::new(),
            notices: setup.notices,
        },
    }
}

/// Full feed run: fetch, digest and optionally summarize
pub async fn run_feeds(
    source: &dyn AlertSource,
    range: DateRange,
    today: NaiveDate,
    summarizer: Option<&dyn Summarizer>,
) -> Reported<(Digest, String)> {
    let fetched = fetch(source).await;
    let mut notices: Vec<Notice> = fetched.notices;

    let digest = digest_records(&fetched.value, range, today);

    let summary = match summarizer {
        Some(client) => {
            let summarized = summarizer::summarize(client, &digest.records).await;
            notices.extend(summarized.notices);
            summarized.value
        }
        None => String::new(),
    };

    Reported {
        value: (digest, summary),
        notices,
    }
}
