//! Library layer for quotesnap: concurrent Yahoo Finance history fetching
//! and price extraction.
//!
//! One fetch cycle takes a comma-separated symbol string, fans out one HTTP
//! request per unique symbol against a shared client, extracts the most
//! recent session's open/high/low/close from each returned history page,
//! and partitions the results into priced rows and invalid symbols.

pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod record;
mod user_agent;

pub use extract::{extract_prices, HISTORICAL_PRICES_MARKER};
pub use fetch::{history_url, FetchError, FetchWindow, HistoryClient, LOOKBACK_DAYS};
pub use pipeline::{fetch_quotes, parse_symbols, QuoteBatch};
pub use record::{parse_session_date, validate_price, PriceRecord, NOT_AVAILABLE};
