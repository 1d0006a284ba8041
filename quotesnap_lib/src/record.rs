//! Per-symbol price record and field validators.

use chrono::NaiveDate;
use serde::Serialize;

/// Sentinel stored in place of a price field that failed numeric validation.
pub const NOT_AVAILABLE: &str = "n/a";

/// Date format used by the historical-prices table (e.g. "Jun 5, 2024").
pub const SESSION_DATE_FORMAT: &str = "%b %d, %Y";

/// One ticker's most recent session prices, as extracted from its history
/// page.
///
/// Price fields keep the source's original string (thousands separators
/// included) when it parses as a number after separator stripping, and fall
/// back to `"n/a"` otherwise. Each field validates independently; a bad open
/// never blocks a good close.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRecord {
    /// Normalized (trimmed, uppercased) ticker symbol.
    pub symbol: String,
    /// Session date, or `None` when the source string did not match
    /// [`SESSION_DATE_FORMAT`].
    pub date: Option<NaiveDate>,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    /// True only when the fetched page carried the historical-prices table
    /// marker. Invalid records are reported as invalid symbols, never as
    /// zero-filled rows.
    pub valid: bool,
}

impl PriceRecord {
    /// Creates a record shell for a raw symbol: trimmed, uppercased, every
    /// field at its sentinel, not yet valid.
    pub fn new(raw_symbol: &str) -> Self {
        Self {
            symbol: raw_symbol.trim().to_uppercase(),
            date: None,
            open: NOT_AVAILABLE.to_string(),
            high: NOT_AVAILABLE.to_string(),
            low: NOT_AVAILABLE.to_string(),
            close: NOT_AVAILABLE.to_string(),
            valid: false,
        }
    }
}

/// Validates a price string scraped from the table.
///
/// The source formats prices with thousands separators ("1,234.56"). The
/// string is tested comma-stripped but kept verbatim on success, so display
/// formatting survives; anything non-numeric becomes `"n/a"`.
pub fn validate_price(raw: &str) -> String {
    if raw.trim().replace(',', "").parse::<f64>().is_ok() {
        raw.to_string()
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Strictly parses a session date such as "Jun 5, 2024".
///
/// Anything that does not match the table's date format yields the unset
/// sentinel, never a best-effort guess.
pub fn parse_session_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), SESSION_DATE_FORMAT).ok()
}
