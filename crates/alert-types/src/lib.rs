use serde::{Deserialize, Serialize};

/// Sentinel stored in `AlertRecord::published` when the source gave no usable date
pub const NO_DATE: &str = "No Date";

/// Normalized unit of fetched content, independent of where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Raw timestamp: `YYYY-MM-DDTHH:MM:SSZ`, `DD.MM.YYYY`, or `NO_DATE`
    pub published: String,
}

impl AlertRecord {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
            published: published.into(),
        }
    }

    /// Record built from a mail snippet; only the summary is known
    pub fn from_snippet(snippet: impl Into<String>) -> Self {
        Self::new("", "", snippet, NO_DATE)
    }

    pub fn has_date(&self) -> bool {
        self.published != NO_DATE
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Closed set of report categories plus the catch-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    FoodAndBeverages,
    PetProducts,
    Beauty,
    Retail,
    Electronics,
    Apparel,
    Miscellaneous,
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::FoodAndBeverages => "Food and Beverages",
            Category::PetProducts => "Pet Products",
            Category::Beauty => "Beauty",
            Category::Retail => "Retail",
            Category::Electronics => "Electronics",
            Category::Apparel => "Apparel",
            Category::Miscellaneous => "Miscellaneous",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Food and Beverages" => Some(Category::FoodAndBeverages),
            "Pet Products" => Some(Category::PetProducts),
            "Beauty" => Some(Category::Beauty),
            "Retail" => Some(Category::Retail),
            "Electronics" => Some(Category::Electronics),
            "Apparel" => Some(Category::Apparel),
            "Miscellaneous" => Some(Category::Miscellaneous),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records sharing a category, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: Category,
    pub records: Vec<AlertRecord>,
}

// ============================================================================
// User-facing notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Message meant for the person running the tool, not for the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Output of a pipeline stage together with the notices raised while producing it.
///
/// Stages that can fail at runtime never return an error to the caller; they
/// substitute a safe default for `value` and record an error notice instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reported<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Reported<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.is_error())
    }
}
