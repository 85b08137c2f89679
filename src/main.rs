//! sitemap-indexer: tell the Google Indexing API about new sitemap URLs.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐  Vec<url>  ┌───────────┐  pending  ┌─────────────┐
//! │  source/  │ ─────────► │  submit   │ ────────► │  indexing/  │
//! │ (sitemap) │            │ (batcher) │ ◄──────── │  (Google)   │
//! └───────────┘            └───────────┘ outcomes  └─────────────┘
//!                            │      ▲
//!                     save() │      │ load()
//!                            ▼      │
//!                          ┌───────────┐
//!                          │  ledger   │
//!                          │ urls.json │
//!                          └───────────┘
//! ```
//!
//! * **`source/`**: the `UrlSource` trait and the plain-text sitemap fetcher.
//! * **`ledger`**: the JSON file of URLs already accepted by the service.
//! * **`submit`**: diffs fetched URLs against the ledger, publishes the
//!   new ones, and records the successes.
//! * **`indexing/`**: the `IndexingService` trait and the Google client
//!   (service-account token exchange, multipart batch codec).
//! * **`sync`**: one pass over the above, folded into a `RunOutcome`.
//! * **`main`**: wires everything together: load config, set up logging,
//!   run once, and exit with a status describing the outcome.

mod config;
mod error;
mod indexing;
mod ledger;
mod logging;
mod source;
mod submit;
mod sync;
#[cfg(test)]
mod test_support;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use config::Config;
use indexing::GoogleIndexing;
use ledger::Ledger;
use source::SitemapSource;
use submit::Batcher;

fn main() -> Result<ExitCode> {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();
    logging::setup_logging(logging::DEFAULT_LOG_SETTINGS);

    let config = Config::parse();
    tracing::debug!("Configuration: {config:?}");

    // -- wire components ------------------------------------------------------
    let source = SitemapSource::new(&config.sitemap_url, &config.user_agent, config.fetch_timeout())
        .context("Failed to build sitemap HTTP client")?;
    let ledger = Ledger::new(&config.ledger_path);
    tracing::debug!("Using ledger {}", ledger.path().display());
    let service = GoogleIndexing::new(&config.key_file, &config.endpoint)
        .context("Failed to build indexing HTTP client")?;
    let batcher = Batcher::new(&ledger, &service);

    // -- single pass -----------------------------------------------------------
    let outcome = sync::run(&source, &batcher);
    sync::print_summary(&outcome);

    Ok(ExitCode::from(outcome.exit_status()))
}
