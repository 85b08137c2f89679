//! The ledger: URLs already accepted by the indexing service.
//!
//! Stored as a pretty-printed JSON array of strings.  Reads are fail-open:
//! a missing, unreadable or malformed file counts as an empty ledger.  Use
//! [`Ledger::try_load`] when the difference matters.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::error::LedgerError;

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger, reporting why it could not be read.
    ///
    /// A file that does not exist yet is not an error: it is an empty ledger.
    pub fn try_load(&self) -> Result<HashSet<String>, LedgerError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let urls: Vec<String> =
            serde_json::from_str(&data).map_err(|source| LedgerError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(urls.into_iter().collect())
    }

    /// Read the ledger, treating every failure as an empty ledger.
    pub fn load(&self) -> HashSet<String> {
        if !self.path.exists() {
            tracing::debug!("No ledger at {}, starting empty", self.path.display());
        }
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!("{e}; treating ledger as empty");
            HashSet::new()
        })
    }

    /// Merge `new_urls` into what is on disk and rewrite the file.
    ///
    /// Returns the number of URLs in the ledger afterwards.  The file is
    /// replaced through a sibling temporary file, so a crash mid-write leaves
    /// the previous contents in place.
    pub fn save(&self, new_urls: &[String]) -> Result<usize, LedgerError> {
        let mut all: BTreeSet<String> = self.load().into_iter().collect();
        all.extend(new_urls.iter().cloned());

        let json = serde_json::to_string_pretty(&all)?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            "Saved {} new URLs to {} ({} total)",
            new_urls.len(),
            self.path.display(),
            all.len()
        );
        Ok(all.len())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
