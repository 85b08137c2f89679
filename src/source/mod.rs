//! URL source abstraction.
//!
//! This module defines the [`UrlSource`] trait, the seam between the
//! pipeline and wherever the candidate URLs come from.  The only concrete
//! implementation is [`SitemapSource`], which reads a plain-text sitemap
//! over HTTP.
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `xml_sitemap.rs`).
//! 2. Define a struct and implement [`UrlSource`] for it.
//! 3. Add `mod xml_sitemap;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of (or next to) `SitemapSource`.
//!
//! Diffing against the ledger and submission are source-agnostic.

mod sitemap;

pub use sitemap::SitemapSource;

use crate::error::FetchError;

/// Anything that can produce the list of URLs a site wants indexed.
pub trait UrlSource {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch the current URL list.
    ///
    /// Order is preserved and duplicates are kept; deduplication happens
    /// when the submission batch is built.
    fn fetch(&self) -> Result<Vec<String>, FetchError>;
}
