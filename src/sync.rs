//! One synchronization pass.
//!
//! ```text
//! FETCHED ──► DIFFED ──┬──► SKIPPED ───┬──► REPORTED
//!                      └──► SUBMITTED ─┘
//! ```
//!
//! [`run`] never fails: every error is logged where it happens and folded
//! into the returned [`RunOutcome`], which `main` turns into a summary and
//! an exit code.

use crate::source::UrlSource;
use crate::submit::{Batcher, SubmitOutcome, SubmitReport};

/// Exit statuses for a run that completed setup.  Kept clear of 1 (setup
/// errors returned from `main`) and 2 (clap usage errors).
pub const EXIT_FETCH_FAILED: u8 = 10;
pub const EXIT_SUBMISSION_FAILED: u8 = 11;
pub const EXIT_LEDGER_SAVE_FAILED: u8 = 12;

#[derive(Debug)]
pub enum RunOutcome {
    /// The sitemap could not be fetched.
    FetchFailed(String),
    /// The sitemap was fetched but listed no URLs.
    NothingFetched,
    /// Every fetched URL is already in the ledger.
    NothingNew { fetched: usize, known: usize },
    /// The indexing service could not be reached or refused the batch.
    SubmissionFailed(String),
    Submitted { fetched: usize, report: SubmitReport },
}

impl RunOutcome {
    /// URLs confirmed by the indexing service during this run.
    pub fn succeeded(&self) -> &[String] {
        match self {
            RunOutcome::Submitted { report, .. } => &report.succeeded,
            _ => &[],
        }
    }

    /// One-line description of how the run ended.
    pub fn describe(&self) -> String {
        match self {
            RunOutcome::FetchFailed(e) => format!("Sitemap fetch failed: {e}"),
            RunOutcome::NothingFetched => "Sitemap listed no URLs".to_string(),
            RunOutcome::NothingNew { fetched, known } => {
                format!("All {fetched} fetched URLs are already among the {known} submitted")
            }
            RunOutcome::SubmissionFailed(e) => format!("Submission failed: {e}"),
            RunOutcome::Submitted { fetched, report } => format!(
                "{fetched} URLs fetched, {} new, {} accepted, {} rejected",
                report.attempted,
                report.succeeded.len(),
                report.failed.len()
            ),
        }
    }

    /// Process exit status: 0 unless something failed.
    pub fn exit_status(&self) -> u8 {
        match self {
            RunOutcome::FetchFailed(_) => EXIT_FETCH_FAILED,
            RunOutcome::SubmissionFailed(_) => EXIT_SUBMISSION_FAILED,
            RunOutcome::Submitted { report, .. } if matches!(report.saved, Some(Err(_))) => {
                EXIT_LEDGER_SAVE_FAILED
            }
            _ => 0,
        }
    }
}

pub fn run(source: &dyn UrlSource, batcher: &Batcher<'_>) -> RunOutcome {
    let fetched = match source.fetch() {
        Ok(urls) => urls,
        Err(e) => {
            tracing::error!("Failed to fetch {}: {e}", source.name());
            return RunOutcome::FetchFailed(e.to_string());
        }
    };
    if fetched.is_empty() {
        tracing::warn!("No URLs fetched from {}, nothing to submit", source.name());
        return RunOutcome::NothingFetched;
    }

    match batcher.submit(&fetched) {
        SubmitOutcome::NothingNew { known } => RunOutcome::NothingNew {
            fetched: fetched.len(),
            known,
        },
        SubmitOutcome::Failed(e) => RunOutcome::SubmissionFailed(e.to_string()),
        SubmitOutcome::Completed(report) => RunOutcome::Submitted {
            fetched: fetched.len(),
            report,
        },
    }
}

/// Render the end-of-run tally printed to stdout.
pub fn summary(outcome: &RunOutcome) -> String {
    let succeeded = outcome.succeeded();
    let mut out = format!("Successfully submitted URLs: {}\n", succeeded.len());
    if !succeeded.is_empty() {
        out.push_str("Submitted:\n");
        for url in succeeded {
            out.push_str(&format!("- {url}\n"));
        }
    }
    out
}

pub fn print_summary(outcome: &RunOutcome) {
    println!("\n{}", outcome.describe());
    print!("{}", summary(outcome));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
