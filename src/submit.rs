//! Submission step: diff against the ledger, publish, record successes.

use std::collections::HashSet;

use crate::error::{LedgerError, SubmitError};
use crate::indexing::IndexingService;
use crate::ledger::Ledger;

/// URLs in `fetched` that are not in `known`.
///
/// Keeps the order of first appearance and drops repeats, so each URL is
/// submitted at most once per run.
pub fn pending_urls(fetched: &[String], known: &HashSet<String>) -> Vec<String> {
    let mut queued = HashSet::new();
    let mut pending = Vec::new();
    for url in fetched {
        if !known.contains(url) && queued.insert(url.as_str()) {
            pending.push(url.clone());
        }
    }
    pending
}

/// Result of a submission that reached the indexing service.
#[derive(Debug)]
pub struct SubmitReport {
    /// Number of URLs sent.
    pub attempted: usize,
    /// Confirmed URLs, as echoed back by the service.
    pub succeeded: Vec<String>,
    /// Submitted URL and the reason it was refused.
    pub failed: Vec<(String, String)>,
    /// Outcome of writing the successes to the ledger; `None` when there was
    /// nothing to write.
    pub saved: Option<Result<usize, LedgerError>>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Every fetched URL is already in the ledger.
    NothingNew { known: usize },
    /// The call to the indexing service failed as a whole.
    Failed(SubmitError),
    Completed(SubmitReport),
}

pub struct Batcher<'a> {
    ledger: &'a Ledger,
    service: &'a dyn IndexingService,
}

impl<'a> Batcher<'a> {
    pub fn new(ledger: &'a Ledger, service: &'a dyn IndexingService) -> Self {
        Self { ledger, service }
    }

    pub fn submit(&self, fetched: &[String]) -> SubmitOutcome {
        let known = self.ledger.load();
        let pending = pending_urls(fetched, &known);

        if pending.is_empty() {
            tracing::info!("All {} fetched URLs were already submitted", fetched.len());
            return SubmitOutcome::NothingNew { known: known.len() };
        }
        tracing::info!(
            "{} new URLs to submit ({} already in ledger)",
            pending.len(),
            known.len()
        );

        let outcomes = match self.service.publish(&pending) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::error!("Submission failed: {e}");
                return SubmitOutcome::Failed(e);
            }
        };

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(confirmed) => {
                    tracing::info!("Submitted {confirmed}");
                    succeeded.push(confirmed);
                }
                Err(reason) => {
                    tracing::warn!("Submission of {} failed: {reason}", outcome.url);
                    failed.push((outcome.url, reason));
                }
            }
        }

        let saved = if succeeded.is_empty() {
            tracing::warn!("No URL was submitted successfully");
            None
        } else {
            let result = self.ledger.save(&succeeded);
            if let Err(e) = &result {
                tracing::error!("Failed to save ledger: {e}");
            }
            Some(result)
        };

        SubmitOutcome::Completed(SubmitReport {
            attempted: pending.len(),
            succeeded,
            failed,
            saved,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
