use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use minutes_dl::config::{Config, DEFAULT_FEED_URL};
use minutes_dl::download;
use minutes_dl::feed;

#[derive(Parser, Debug)]
#[command(
    name = "minutes-dl",
    about = "Downloads meeting-minutes PDFs from a WordPress category feed"
)]
struct Args {
    /// URL of the category feed to read
    #[arg(short = 'f', long = "feed-url", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Directory to save attachments into
    #[arg(short = 'o', long = "output", default_value = ".")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for progress and error reporting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::new(&args.feed_url, args.output).context("Invalid configuration")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("minutes-dl/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    // Feed-level failures are fatal: without a decoded document there are no
    // entries to process, and main returning Err exits non-zero.
    tracing::info!(url = %config.feed_url, "Requesting feed");
    let body = feed::fetch_feed(&client, config.feed_url.as_str())
        .await
        .context("Failed to fetch feed")?;

    tracing::info!(bytes = body.len(), "Decoding feed document");
    let decoded = feed::parse_feed(&body).context("Failed to decode feed")?;

    tracing::info!(entries = decoded.entries.len(), "Processing entries");
    let summary = download::run(&client, &decoded, &config).await;

    tracing::info!(
        downloaded = summary.downloaded,
        already_present = summary.already_present,
        skipped = summary.skipped,
        failed = summary.failed,
        "Run complete"
    );

    Ok(())
}
