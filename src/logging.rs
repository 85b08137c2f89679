use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_SETTINGS: &str = "sitemap_indexer=info";

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, falling back to `default_log_settings`.  Logs go to
/// stderr so that the run summary on stdout stays clean for redirection.
pub fn setup_logging(default_log_settings: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_settings.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init()
}
