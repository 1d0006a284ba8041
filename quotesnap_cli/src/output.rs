use anyhow::Result;
use quotesnap_lib::QuoteBatch;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Serialize)]
struct QuoteRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    open: String,
    #[tabled(rename = "High")]
    #[serde(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    #[serde(rename = "Low")]
    low: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    close: String,
}

#[derive(Serialize)]
struct JsonBatch {
    session_date: Option<String>,
    quotes: Vec<QuoteRow>,
    invalid_symbols: Vec<String>,
}

// -- Row builders --

fn build_quote_rows(batch: &QuoteBatch) -> Vec<QuoteRow> {
    batch
        .rows
        .iter()
        .map(|r| QuoteRow {
            symbol: r.symbol.clone(),
            open: r.open.clone(),
            high: r.high.clone(),
            low: r.low.clone(),
            close: r.close.clone(),
        })
        .collect()
}

fn session_date_line(batch: &QuoteBatch) -> Option<String> {
    batch
        .session_date
        .map(|date| format!("Prices as of {}", date.format("%b %-d, %Y")))
}

// -- Table output --

pub fn print_batch_table(batch: &QuoteBatch) {
    if let Some(line) = session_date_line(batch) {
        println!("{}", line);
    }
    if !batch.invalid.is_empty() {
        println!("INVALID SYMBOLS: {}", batch.invalid.join(", "));
    }
    if batch.rows.is_empty() {
        println!("No priced symbols.");
    } else {
        println!("{}", Table::new(build_quote_rows(batch)));
    }
}

// -- JSON output --

pub fn print_batch_json(batch: &QuoteBatch) -> Result<()> {
    let json = JsonBatch {
        session_date: batch.session_date.map(|d| d.to_string()),
        quotes: build_quote_rows(batch),
        invalid_symbols: batch.invalid.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
