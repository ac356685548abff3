//! Keyword and date-range selection over alert records.

use alert_types::AlertRecord;
use chrono::NaiveDate;

/// Keywords marking an alert as acquisition news
pub const ACQUISITION_KEYWORDS: &[&str] = &["acquisition", "acquires", "acquired", "merger", "buys"];

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DOTTED_FORMAT: &str = "%d.%m.%Y";

/// Keep records whose title or summary mentions any acquisition keyword
pub fn filter_acquisitions(records: &[AlertRecord]) -> Vec<AlertRecord> {
    filter_by_keywords(records, ACQUISITION_KEYWORDS)
}

/// Case-insensitive substring match against title and summary; order is preserved
pub fn filter_by_keywords(records: &[AlertRecord], keywords: &[&str]) -> Vec<AlertRecord> {
    records
        .iter()
        .filter(|record| {
            let title = record.title.to_lowercase();
            let summary = record.summary.to_lowercase();
            keywords.iter().any(|kw| {
                let kw = kw.to_lowercase();
                title.contains(&kw) || summary.contains(&kw)
            })
        })
        .cloned()
        .collect()
}

/// Inclusive calendar-date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parse a raw `published` value.
///
/// Anything containing a `T` is read as `YYYY-MM-DDTHH:MM:SSZ`, everything
/// else as `DD.MM.YYYY`. Returns `None` when the chosen format does not fit.
pub fn parse_published(raw: &str) -> Option<NaiveDate> {
    if raw.contains('T') {
        chrono::NaiveDateTime::parse_from_str(raw, ISO_FORMAT)
            .ok()
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(raw, DOTTED_FORMAT).ok()
    }
}

/// Keep records published inside `range`.
///
/// Records whose date cannot be parsed are dropped without raising a notice.
pub fn filter_by_date(records: &[AlertRecord], range: DateRange) -> Vec<AlertRecord> {
    records
        .iter()
        .filter(|record| match parse_published(&record.published) {
            Some(date) => range.contains(date),
            None => {
                tracing::debug!(
                    "Dropping alert with unparseable date {:?}: {}",
                    record.published,
                    record.title
                );
                false
            }
        })
        .cloned()
        .collect()
}

/// Render a raw `published` value as `DD.MM.YYYY` when it is ISO-8601, else unchanged
pub fn display_date(raw: &str) -> String {
    if raw.contains('T') {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, ISO_FORMAT) {
            return dt.format(DOTTED_FORMAT).to_string();
        }
    }
    raw.to_string()
}
