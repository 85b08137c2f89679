//! Error types, one enum per I/O boundary.
//!
//! None of these ever escape [`crate::sync::run`]: each component logs its
//! failure and degrades to an empty result.  The types exist so that the
//! degraded result can still say *what* went wrong (for the exit code and
//! for tests) instead of only leaving a log line behind.

use std::path::PathBuf;

use thiserror::Error;

/// Fetching the sitemap failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or non-2xx status.
    #[error("sitemap request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reading or writing the ledger file failed.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("cannot read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but is not a JSON array of strings.
    #[error("ledger {path} is not a JSON array of strings: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot encode ledger: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot write ledger {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Loading the service-account key or obtaining an access token failed.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot read key file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("key file {path} is not a service-account key: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange failed: {0}")]
    Token(#[from] reqwest::Error),
}

/// The batch submission failed as a whole.
///
/// Per-URL failures are not represented here; they are carried inside
/// [`crate::indexing::SubmissionOutcome`].
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("batch request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("batch endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed batch response: {0}")]
    MalformedBatch(String),
}
