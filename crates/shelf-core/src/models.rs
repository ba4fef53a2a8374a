//! Domain models for Shelf

use serde::{Deserialize, Serialize};

/// Title used when the source row has no `title` column
pub const DEFAULT_TITLE: &str = "Unknown Title";

/// Stock status used when the source row has no `stock_status` column
pub const DEFAULT_STOCK_STATUS: &str = "Unknown";

/// A normalized comic book record
///
/// Built once by the importer and never mutated afterwards. `price` and `page`
/// keep the raw source strings; `page_per_cost` is the derived value score.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    /// 0-based position in the source, in source order
    pub index: usize,
    pub title: String,
    pub original_title: String,
    pub image_url: String,
    pub stock_status: String,
    /// Raw price string (may contain thousands separators or be empty)
    pub price: String,
    /// Raw page count string (may contain thousands separators or be empty)
    pub page: String,
    /// Pages per 100 currency units, 0 when either field is unusable
    pub page_per_cost: f64,
    /// Pre-computed explanation, only present when loaded from an export
    pub explanation: Option<String>,
}

impl BookRecord {
    /// Title to describe: the original title when present, else the title
    pub fn query_title(&self) -> Option<&str> {
        select_title(Some(self.title.as_str()), Some(self.original_title.as_str()))
    }
}

/// Pick the title to send to the model
///
/// Prefers a non-empty original title over the (usually translated) title.
/// Returns None when neither is usable.
pub fn select_title<'a>(title: Option<&'a str>, original_title: Option<&'a str>) -> Option<&'a str> {
    original_title
        .filter(|t| !t.is_empty())
        .or_else(|| title.filter(|t| !t.is_empty()))
}

/// A book as returned by a catalog lookup
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub original_title: String,
    pub image_url: String,
    pub stock_status: String,
    pub page_per_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl BookView {
    pub fn new(record: &BookRecord, total: usize) -> Self {
        Self {
            index: record.index,
            total,
            title: record.title.clone(),
            original_title: record.original_title.clone(),
            image_url: record.image_url.clone(),
            stock_status: record.stock_status.clone(),
            page_per_cost: record.page_per_cost,
            explanation: record.explanation.clone(),
        }
    }
}

/// A book in the persisted catalog artifact (`books.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedBook {
    pub index: usize,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_stock_status")]
    pub stock_status: String,
    #[serde(default)]
    pub page_per_cost: f64,
    /// Size of the complete catalog; only known after every row is read
    #[serde(default)]
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn default_stock_status() -> String {
    DEFAULT_STOCK_STATUS.to_string()
}

impl From<&BookRecord> for ExportedBook {
    fn from(record: &BookRecord) -> Self {
        Self {
            index: record.index,
            title: record.title.clone(),
            original_title: record.original_title.clone(),
            image_url: record.image_url.clone(),
            stock_status: record.stock_status.clone(),
            page_per_cost: record.page_per_cost,
            total: 0,
            explanation: record.explanation.clone(),
        }
    }
}

impl From<ExportedBook> for BookRecord {
    fn from(book: ExportedBook) -> Self {
        Self {
            index: book.index,
            title: book.title,
            original_title: book.original_title,
            image_url: book.image_url,
            stock_status: book.stock_status,
            price: String::new(),
            page: String::new(),
            // Artifacts may have been edited by hand
            page_per_cost: if book.page_per_cost.is_finite() {
                book.page_per_cost.max(0.0)
            } else {
                0.0
            },
            explanation: book.explanation.filter(|e| !e.trim().is_empty()),
        }
    }
}

/// Stock availability, interpreted from the free-text status column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    InStock,
    OutOfStock,
    /// Anything else ("Unknown", "preorder", ...), passed through as-is
    Other,
}

impl StockStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "in stock" | "in_stock" | "available" | "재고 있음" => Self::InStock,
            "out of stock" | "out_of_stock" | "sold out" | "품절" => Self::OutOfStock,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in stock",
            Self::OutOfStock => "out of stock",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
