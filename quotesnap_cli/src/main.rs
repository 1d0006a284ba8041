mod output;
mod session;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::ProgressBar;
use quotesnap_lib::{fetch_quotes, FetchWindow, HistoryClient};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "quotesnap")]
#[command(about = "Fetch the latest daily open/high/low/close for stock symbols")]
struct Cli {
    /// Comma-separated ticker symbols (e.g. "aapl,MSFT, isrg")
    symbols: String,

    /// Output format: table or json
    #[arg(long, default_value = "table")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quotesnap_lib=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let now = Utc::now();
    if let Some(notice) = session::market_notice(now) {
        eprintln!("{}", notice);
    }

    let client = HistoryClient::new().context("failed to build HTTP client")?;
    let window = FetchWindow::ending_at(now);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("fetching quotes...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let batch = fetch_quotes(&client, &cli.symbols, &window).await;
    spinner.finish_and_clear();

    match format {
        OutputFormat::Table => output::print_batch_table(&batch),
        OutputFormat::Json => output::print_batch_json(&batch)?,
    }

    Ok(())
}
