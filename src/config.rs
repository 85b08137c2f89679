//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or as an environment variable; a
//! `.env` file in the working directory is loaded before parsing (see
//! `main`).  Paths default to the current directory so that a bare
//! `sitemap-indexer --sitemap-url …` behaves like a cron job dropped next
//! to its `key.json` and `urls.json`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_BATCH_ENDPOINT: &str = "https://indexing.googleapis.com/batch";

/// Desktop Chrome identifier.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Parser)]
#[command(name = "sitemap-indexer")]
#[command(about = "Submit new sitemap URLs to the Google Indexing API", long_about = None)]
pub struct Config {
    /// Plain-text sitemap: one URL per line.
    #[arg(long, env = "SITEMAP_URL", value_parser = validate_url)]
    pub sitemap_url: String,

    /// JSON file recording URLs that were already submitted successfully.
    #[arg(long = "ledger", env = "LEDGER_PATH", default_value = "urls.json")]
    pub ledger_path: PathBuf,

    /// Service-account key with access to the Indexing API.
    #[arg(long, env = "GOOGLE_KEY_FILE", default_value = "key.json")]
    pub key_file: PathBuf,

    /// Batch endpoint of the indexing service.
    #[arg(long, env = "INDEXING_ENDPOINT", default_value = DEFAULT_BATCH_ENDPOINT, value_parser = validate_url)]
    pub endpoint: String,

    /// Timeout for the sitemap request, in seconds.
    #[arg(
        long,
        env = "FETCH_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// User-Agent sent with the sitemap request.
    #[arg(long, env = "FETCH_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn validate_url(s: &str) -> Result<String, String> {
    reqwest::Url::parse(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("Invalid URL: {}", e))
}
