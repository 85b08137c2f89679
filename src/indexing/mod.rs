//! Indexing service abstraction.
//!
//! [`IndexingService`] is the seam between the submission step and the
//! remote API.  [`GoogleIndexing`] is the real implementation; tests drive
//! the batcher with in-memory fakes instead.
//!
//! * **`credentials`**: service-account key loading and the OAuth2
//!   JWT-bearer token exchange.
//! * **`batch`**: `multipart/mixed` encoding of publish calls and decoding
//!   of the per-item responses.
//! * **`google`**: ties the two together over a blocking HTTP client.

mod batch;
mod credentials;
mod google;

pub use google::GoogleIndexing;

use crate::error::SubmitError;

/// OAuth2 scope granting access to URL notifications.
pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";

/// Notification type sent for every URL; deletions are never reported.
pub const NOTIFICATION_TYPE: &str = "URL_UPDATED";

/// What happened to one URL inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// The URL as it was submitted.
    pub url: String,
    /// The URL echoed back by the service, or why the service refused it.
    pub result: Result<String, String>,
}

impl SubmissionOutcome {
    pub fn accepted(url: impl Into<String>, confirmed: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Ok(confirmed.into()),
        }
    }

    pub fn rejected(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Err(reason.into()),
        }
    }
}

/// A service that accepts URL-update notifications.
pub trait IndexingService {
    /// Notify the service about every URL in `urls`.
    ///
    /// Returns one outcome per URL, in the same order.  An `Err` means the
    /// call failed as a whole and no outcome is known for any URL.  A
    /// failure after some URLs were confirmed is reported per URL instead.
    fn publish(&self, urls: &[String]) -> Result<Vec<SubmissionOutcome>, SubmitError>;
}
