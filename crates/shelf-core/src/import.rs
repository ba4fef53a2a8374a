//! CSV import for the comic catalog export
//!
//! Expected columns: `title, original_title, image_url, stock_status, price, page`.
//! Extra columns are ignored and short rows are allowed; a missing column takes
//! its documented default. Numeric columns are never fatal: anything that does
//! not parse counts as 0, which drives the value score to 0.

use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::Result;
use crate::models::{BookRecord, DEFAULT_STOCK_STATUS, DEFAULT_TITLE};

/// Convert a CSV record to a field map using headers as keys
///
/// Columns missing from a short row are left out of the map entirely, so they
/// fall back to defaults instead of becoming empty strings.
fn record_to_row(headers: &StringRecord, record: &StringRecord) -> HashMap<String, String> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(i, header)| {
            record
                .get(i)
                .map(|value| (header.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse the catalog CSV into normalized records, in source order
pub fn parse_catalog_csv<R: Read>(reader: R) -> Result<Vec<BookRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut books = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let row = record_to_row(&headers, &record);
        books.push(normalize_row(&row, index));
    }

    debug!("Parsed {} catalog rows", books.len());
    Ok(books)
}

/// Build a record from one raw row
pub fn normalize_row(row: &HashMap<String, String>, index: usize) -> BookRecord {
    let field = |name: &str, default: &str| {
        row.get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };

    let price = field("price", "");
    let page = field("page", "");
    let page_per_cost = page_per_cost(&price, &page);

    BookRecord {
        index,
        title: field("title", DEFAULT_TITLE),
        original_title: field("original_title", ""),
        image_url: field("image_url", ""),
        stock_status: field("stock_status", DEFAULT_STOCK_STATUS),
        price,
        page,
        page_per_cost,
        explanation: None,
    }
}

/// Parse a numeric-like string, dropping thousands separators
///
/// Returns None for empty, malformed or non-finite input.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned = s.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Pages per 100 units of price
///
/// `(page / price) * 100` when price is positive, otherwise 0. Never negative
/// and never fails.
pub fn page_per_cost(price: &str, page: &str) -> f64 {
    let price = parse_number(price).unwrap_or(0.0);
    let page = parse_number(page).unwrap_or(0.0);

    if price <= 0.0 {
        return 0.0;
    }

    let score = (page / price) * 100.0;
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}
