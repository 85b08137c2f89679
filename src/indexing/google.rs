//! Google Indexing API client.

use std::path::PathBuf;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::batch::{self, BatchRequest, MAX_BATCH_REQUESTS};
use super::credentials::ServiceAccountKey;
use super::{IndexingService, SubmissionOutcome, INDEXING_SCOPE};
use crate::error::SubmitError;

/// Publishes URL notifications through the batch endpoint.
///
/// Credentials are read from `key_file` on every [`publish`] call, so a run
/// with nothing to submit never touches the key.
///
/// [`publish`]: IndexingService::publish
pub struct GoogleIndexing {
    key_file: PathBuf,
    endpoint: String,
    client: Client,
}

impl GoogleIndexing {
    pub fn new(key_file: impl Into<PathBuf>, endpoint: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(key_file, endpoint, client))
    }

    pub fn with_client(key_file: impl Into<PathBuf>, endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            key_file: key_file.into(),
            endpoint: endpoint.into(),
            client,
        }
    }

    fn send_batch(&self, token: &str, urls: &[String]) -> Result<Vec<SubmissionOutcome>, SubmitError> {
        let request = BatchRequest::new(urls);
        tracing::info!("Submitting batch of {} URLs to {}", urls.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(CONTENT_TYPE, request.content_type())
            .body(request.body)
            .send()?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text()?;

        if !status.is_success() {
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parts = batch::decode_response(&content_type, &body)?;
        Ok(batch::outcomes(urls, parts))
    }
}

impl IndexingService for GoogleIndexing {
    fn publish(&self, urls: &[String]) -> Result<Vec<SubmissionOutcome>, SubmitError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let key = ServiceAccountKey::from_file(&self.key_file)?;
        let token = key.fetch_token(&self.client, INDEXING_SCOPE)?;

        let mut outcomes = Vec::with_capacity(urls.len());
        for chunk in urls.chunks(MAX_BATCH_REQUESTS) {
            match self.send_batch(&token.access_token, chunk) {
                Ok(batch) => outcomes.extend(batch),
                // Nothing confirmed yet: the call failed as a whole.
                Err(e) if outcomes.is_empty() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "Batch failed after {} URLs were answered, skipping the rest: {e}",
                        outcomes.len()
                    );
                    let reason = e.to_string();
                    let answered = outcomes.len();
                    outcomes.extend(
                        urls[answered..]
                            .iter()
                            .map(|url| SubmissionOutcome::rejected(url, reason.as_str())),
                    );
                    break;
                }
            }
        }
        Ok(outcomes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
