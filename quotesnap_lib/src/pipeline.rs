//! Batch orchestration: a raw symbol string in, a partitioned quote set out.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::extract::extract_prices;
use crate::fetch::{FetchWindow, HistoryClient};
use crate::record::PriceRecord;

/// The consolidated result of one fetch cycle, partitioned for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuoteBatch {
    /// Records whose symbol resolved to a historical-prices table.
    pub rows: Vec<PriceRecord>,
    /// Symbols the upstream source did not recognize or failed to serve.
    pub invalid: Vec<String>,
    /// Session date reported by the first valid record carrying one.
    /// Symbols disagreeing on their last session are not reconciled.
    pub session_date: Option<NaiveDate>,
}

/// Splits a comma-separated symbol string into normalized, de-duplicated
/// symbols.
///
/// Entries are trimmed and uppercased, empties dropped, and duplicates
/// collapsed through a set, so output comes back symbol-sorted rather than
/// in input order.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_uppercase())
        .filter(|entry| !entry.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Runs one full fetch cycle for a raw comma-separated symbol list.
///
/// Builds one record shell and URL per unique symbol, fetches them all as
/// one concurrent batch, extracts each returned page, and partitions the
/// outcome. Zero usable symbols short-circuits to an empty batch without
/// touching the network; a per-symbol fetch failure marks only that symbol
/// invalid.
pub async fn fetch_quotes(
    client: &HistoryClient,
    raw_symbols: &str,
    window: &FetchWindow,
) -> QuoteBatch {
    let symbols = parse_symbols(raw_symbols);
    if symbols.is_empty() {
        return QuoteBatch::default();
    }

    let requests: Vec<(String, String)> = symbols
        .iter()
        .map(|symbol| (symbol.clone(), client.url_for(symbol, window)))
        .collect();

    let mut records: HashMap<String, PriceRecord> = symbols
        .iter()
        .map(|symbol| (symbol.clone(), PriceRecord::new(symbol)))
        .collect();

    for (symbol, outcome) in client.fetch_batch(requests).await {
        match outcome {
            Ok(body) => {
                records.insert(symbol.clone(), extract_prices(&symbol, &body));
            }
            Err(err) => {
                // the shell stays invalid and lands in the invalid partition
                tracing::warn!("fetch failed for {}: {}", symbol, err);
            }
        }
    }

    let mut batch = QuoteBatch::default();
    for symbol in &symbols {
        let Some(record) = records.remove(symbol) else {
            continue;
        };
        if record.valid {
            if batch.session_date.is_none() {
                batch.session_date = record.date;
            }
            batch.rows.push(record);
        } else {
            batch.invalid.push(record.symbol);
        }
    }

    tracing::info!(
        "fetch cycle complete: {} priced, {} invalid",
        batch.rows.len(),
        batch.invalid.len()
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn history_page(date: &str, prices: [&str; 4]) -> String {
        format!(
            r#"<html><body><table data-test="historical-prices"><tbody><tr>
            <td><span>{}</span></td>
            <td><span>{}</span></td>
            <td><span>{}</span></td>
            <td><span>{}</span></td>
            <td><span>{}</span></td>
            </tr></tbody></table></body></html>"#,
            date, prices[0], prices[1], prices[2], prices[3]
        )
    }

    fn lookup_page() -> &'static str {
        r#"<html><body><table data-test="lookup-results"><tbody><tr><td><span>no match</span></td></tr></tbody></table></body></html>"#
    }

    fn test_window() -> FetchWindow {
        FetchWindow::ending_at(chrono::DateTime::from_timestamp(1_718_000_000, 0).unwrap())
    }

    // -- Symbol parsing --

    #[test]
    fn symbols_are_normalized_and_deduplicated() {
        assert_eq!(parse_symbols("aapl, AAPL , aapl"), vec!["AAPL"]);
    }

    #[test]
    fn empty_entries_are_dropped() {
        assert_eq!(parse_symbols("aapl,, ,msft"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn blank_input_yields_no_symbols() {
        assert!(parse_symbols("").is_empty());
        assert!(parse_symbols(" , , ").is_empty());
    }

    // -- Fetch cycle --

    #[tokio::test]
    async fn duplicate_symbols_fetch_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quote/AAPL/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(history_page(
                    "Jun 14, 2024",
                    ["182.50", "184.12", "181.90", "183.25"],
                )),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HistoryClient::with_base_url(&server.uri()).unwrap();
        let batch = fetch_quotes(&client, "aapl, AAPL , aapl", &test_window()).await;

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].symbol, "AAPL");
        assert!(batch.invalid.is_empty());
    }

    #[tokio::test]
    async fn empty_input_makes_no_network_calls() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = HistoryClient::with_base_url(&server.uri()).unwrap();
        let batch = fetch_quotes(&client, " , ,", &test_window()).await;

        assert!(batch.rows.is_empty());
        assert!(batch.invalid.is_empty());
        assert_eq!(batch.session_date, None);
    }

    #[tokio::test]
    async fn batch_partitions_valid_and_invalid_symbols() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quote/AAPL/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(history_page(
                    "Jun 14, 2024",
                    ["182.50", "184.12", "181.90", "183.25"],
                )),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote/MSFT/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(history_page(
                    "Jun 14, 2024",
                    ["424.01", "427.90", "423.00", "426.73"],
                )),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote/NOTREAL/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string(lookup_page()))
            .mount(&server)
            .await;

        let client = HistoryClient::with_base_url(&server.uri()).unwrap();
        let batch = fetch_quotes(&client, "aapl,msft,notreal", &test_window()).await;

        let symbols: Vec<&str> = batch.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(batch.invalid, vec!["NOTREAL"]);
        assert_eq!(
            batch.session_date,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 14)
        );
    }

    #[tokio::test]
    async fn transport_failure_is_isolated_to_its_symbol() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quote/AAPL/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(history_page(
                    "Jun 14, 2024",
                    ["182.50", "184.12", "181.90", "183.25"],
                )),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote/MSFT/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(history_page(
                    "Jun 14, 2024",
                    ["424.01", "427.90", "423.00", "426.73"],
                )),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote/FLAKY/history"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HistoryClient::with_base_url(&server.uri()).unwrap();
        let batch = fetch_quotes(&client, "aapl,flaky,msft", &test_window()).await;

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.invalid, vec!["FLAKY"]);
    }

    #[tokio::test]
    async fn all_invalid_symbols_leave_rows_empty() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string(lookup_page()))
            .mount(&server)
            .await;

        let client = HistoryClient::with_base_url(&server.uri()).unwrap();
        let batch = fetch_quotes(&client, "zzzz,yyyy", &test_window()).await;

        assert!(batch.rows.is_empty());
        assert_eq!(batch.invalid, vec!["YYYY", "ZZZZ"]);
        assert_eq!(batch.session_date, None);
    }

    #[tokio::test]
    async fn session_date_skips_valid_rows_without_one() {
        let server = MockServer::start().await;

        // AAPL sorts first but returns a short row, so no date
        Mock::given(method("GET"))
            .and(path("/quote/AAPL/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><table data-test="historical-prices"><tbody><tr><td><span>Jun 14, 2024</span></td></tr></tbody></table></body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote/MSFT/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(history_page(
                    "Jun 14, 2024",
                    ["424.01", "427.90", "423.00", "426.73"],
                )),
            )
            .mount(&server)
            .await;

        let client = HistoryClient::with_base_url(&server.uri()).unwrap();
        let batch = fetch_quotes(&client, "aapl,msft", &test_window()).await;

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(
            batch.session_date,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 14)
        );
    }
}
