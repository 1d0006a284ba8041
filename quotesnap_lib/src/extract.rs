//! Extraction of the most recent session's prices from a history page.

use scraper::{Html, Selector};

use crate::record::{parse_session_date, validate_price, PriceRecord};

/// Marker attribute value carried by the genuine historical-prices table.
/// Unrecognized symbols redirect to a lookup page that lacks it.
pub const HISTORICAL_PRICES_MARKER: &str = "historical-prices";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Parses one history page into a populated [`PriceRecord`].
///
/// The record stays invalid when the page's first table is missing the
/// `data-test` marker or carries the wrong value. A marked table with a
/// short first row leaves every field at its sentinel; rows are only
/// trusted whole. Field validation failures stay local to each field.
pub fn extract_prices(symbol: &str, html: &str) -> PriceRecord {
    let mut record = PriceRecord::new(symbol);
    let document = Html::parse_document(html);

    let table = match document.select(&selector("table")).next() {
        Some(table) => table,
        None => {
            tracing::debug!("no table in response for {}", record.symbol);
            return record;
        }
    };
    match table.value().attr("data-test") {
        Some(HISTORICAL_PRICES_MARKER) => {}
        Some(other) => {
            tracing::debug!("table marker mismatch for {}: {}", record.symbol, other);
            return record;
        }
        None => {
            tracing::debug!("table missing data-test attribute for {}", record.symbol);
            return record;
        }
    }

    record.valid = true;

    let spans: Vec<String> = match table.select(&selector("tbody tr")).next() {
        Some(first_row) => first_row
            .select(&selector("span"))
            .take(5)
            .map(|span| span.text().collect::<String>())
            .collect(),
        None => Vec::new(),
    };

    // all or nothing: a partial row is never parsed
    if spans.len() == 5 {
        record.date = parse_session_date(&spans[0]);
        record.open = validate_price(&spans[1]);
        record.high = validate_price(&spans[2]);
        record.low = validate_price(&spans[3]);
        record.close = validate_price(&spans[4]);
    }

    record
}
