//! Categorization of filtered alerts and rendering of the text report.

use alert_types::{AlertRecord, Category, CategoryBucket};
use chrono::NaiveDate;

use crate::filter::display_date;

/// Title keywords per category, evaluated in order; first match wins
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["food", "beverage"], Category::FoodAndBeverages),
    (&["pet"], Category::PetProducts),
    (&["beauty"], Category::Beauty),
    (&["retail"], Category::Retail),
    (&["electronics"], Category::Electronics),
    (&["apparel"], Category::Apparel),
];

/// Pick the category for a single record from its lower-cased title
pub fn categorize(record: &AlertRecord) -> Category {
    let title = record.title.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| title.contains(kw)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Miscellaneous)
}

/// Group records into buckets ordered by first appearance of each category
pub fn bucket_by_category(records: &[AlertRecord]) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = Vec::new();

    for record in records {
        let category = categorize(record);
        match buckets.iter_mut().find(|b| b.category == category) {
            Some(bucket) => bucket.records.push(record.clone()),
            None => buckets.push(CategoryBucket {
                category,
                records: vec![record.clone()],
            }),
        }
    }

    buckets
}

/// Render the markdown report for `buckets`, dated `today`
pub fn format_report(buckets: &[CategoryBucket], today: NaiveDate) -> String {
    let mut out = format!("# Google Alerts Report - {}\n", today.format("%d.%m.%Y"));

    if buckets.is_empty() {
        out.push_str("\nNo matching alerts found.\n");
        return out;
    }

    for bucket in buckets {
        out.push_str(&format!("\n## {}\n", bucket.category));
        for record in &bucket.records {
            out.push_str(&format!(
                "- {} - [Read more]({}) - {}\n",
                record.title,
                record.link,
                display_date(&record.published)
            ));
        }
    }

    out
}

/// Machine-readable variant of the report; `summary` is omitted when empty
pub fn render_json(
    buckets: &[CategoryBucket],
    today: NaiveDate,
    summary: &str,
) -> serde_json::Result<String> {
    let mut report = serde_json::json!({
        "date": today.format("%d.%m.%Y").to_string(),
        "categories": buckets
            .iter()
            .map(|b| serde_json::json!({
                "category": b.category.as_str(),
                "alerts": b.records,
            }))
            .collect::<Vec<_>>(),
    });
    if !summary.is_empty() {
        report["summary"] = serde_json::Value::String(summary.to_string());
    }
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> AlertRecord {
        AlertRecord::new(title, "https://example.com/x", "", "2024-03-15T10:00:00Z")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(
            categorize(&titled("PetCo Acquires Pet Supply Co")),
            Category::PetProducts
        );
        // "food" is checked before "pet"
        assert_eq!(
            categorize(&titled("Pet Food Maker Acquired")),
            Category::FoodAndBeverages
        );
        assert_eq!(
            categorize(&titled("Beverage giant buys brewery")),
            Category::FoodAndBeverages
        );
        assert_eq!(
            categorize(&titled("BEAUTY brand merger")),
            Category::Beauty
        );
        assert_eq!(
            categorize(&titled("Acme Corp Acquires Beta Inc")),
            Category::Miscellaneous
        );
    }

    #[test]
    fn test_summary_is_not_used_for_categories() {
        let record = AlertRecord::new("Acme buys Beta", "", "retail chain", "15.03.2024");
        assert_eq!(categorize(&record), Category::Miscellaneous);
    }

    #[test]
    fn test_buckets_follow_first_seen_order() {
        let records = vec![
            titled("Retail chain buys rival"),
            titled("Electronics merger"),
            titled("Second retail acquisition"),
            titled("Acme acquires Beta"),
        ];
        let buckets = bucket_by_category(&records);

        let order: Vec<_> = buckets.iter().map(|b| b.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Retail,
                Category::Electronics,
                Category::Miscellaneous
            ]
        );
        assert_eq!(buckets[0].records[0].title, "Retail chain buys rival");
        assert_eq!(buckets[0].records[1].title, "Second retail acquisition");
    }

    #[test]
    fn test_format_report() {
        let records = vec![
            AlertRecord::new(
                "PetCo Acquires Pet Supply Co",
                "https://example.com/petco",
                "",
                "2024-03-15T10:00:00Z",
            ),
            AlertRecord::new(
                "Acme buys Beta",
                "https://example.com/acme",
                "",
                "20.03.2024",
            ),
        ];
        let report = format_report(&bucket_by_category(&records), today());

        assert_eq!(
            report,
            "# Google Alerts Report - 02.04.2024\n\
             \n## Pet Products\n\
             - PetCo Acquires Pet Supply Co - [Read more](https://example.com/petco) - 15.03.2024\n\
             \n## Miscellaneous\n\
             - Acme buys Beta - [Read more](https://example.com/acme) - 20.03.2024\n"
        );
    }

    #[test]
    fn test_format_empty_report() {
        let report = format_report(&[], today());
        assert_eq!(
            report,
            "# Google Alerts Report - 02.04.2024\n\nNo matching alerts found.\n"
        );
    }

    #[test]
    fn test_render_json() {
        let buckets = bucket_by_category(&[titled("Electronics merger")]);
        let json = render_json(&buckets, today(), "").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["date"], "02.04.2024");
        assert_eq!(value["categories"][0]["category"], "Electronics");
        assert_eq!(
            value["categories"][0]["alerts"][0]["title"],
            "Electronics merger"
        );
        assert!(value.get("summary").is_none());

        let json = render_json(&buckets, today(), "## Summary\n\nOne deal.").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"], "## Summary\n\nOne deal.");
    }
}
