//! DOI resolution.
//!
//! Entries carrying a `doi` field can be enriched with the URL the DOI
//! redirects to. The lookup itself sits behind the [DoiResolver] trait so it
//! can be swapped for a stub; [HttpDoiResolver] does the real network round
//! trip through `dx.doi.org`.
//!
//! ## Usage
//!
//! ```rust
//! use bibdoi::{BibtexParser, DoiEnricher, EnrichConfig, ResolveError};
//!
//! let mut entries = BibtexParser::new().parse(
//!     "@misc{a, doi = {10.1/a}} @misc{b, title = {No DOI}} @misc{c, doi = {10.1/c}}",
//! );
//!
//! let resolver = |doi: &str| -> Result<String, ResolveError> {
//!     Ok(format!("https://example.org/{doi}"))
//! };
//! let config = EnrichConfig {
//!     run_in_parallel: true,
//!     max_workers: 2,
//! };
//! let report = DoiEnricher::new(resolver).with_config(config).enrich(&mut entries);
//!
//! assert_eq!(report.resolved, 2);
//! assert_eq!(report.without_doi, 1);
//! // Order is preserved regardless of how the lookups were scheduled
//! assert_eq!(entries[2].get("doi_url"), Some("https://example.org/10.1/c"));
//! ```
//!
//! ## Failure isolation
//!
//! A failed lookup is logged and leaves that entry without `doi_url`/`url`;
//! it never affects other entries and is never returned as an error.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{DEFAULT_DOI_BASE_URL, HttpDoiResolver, ResolverConfig};

use crate::BibEntry;
use crate::utils::normalize_doi;
use thiserror::Error;
use tracing::{debug, error, info};

/// Error types for DOI lookups
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid DOI: {0:?}")]
    InvalidDoi(String),

    #[cfg(feature = "http")]
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("DOI {doi} resolved to {url} with status {status}")]
    Status {
        doi: String,
        url: String,
        status: u16,
    },

    #[error("{0}")]
    Other(String),
}

/// Turns a bare DOI (e.g. `10.1000/xyz123`) into the URL it ultimately points to.
///
/// Implemented for [HttpDoiResolver] and for any
/// `Fn(&str) -> Result<String, ResolveError>`, which makes deterministic
/// stubs trivial to write.
pub trait DoiResolver: Send + Sync {
    fn resolve(&self, doi: &str) -> Result<String, ResolveError>;
}

impl<F> DoiResolver for F
where
    F: Fn(&str) -> Result<String, ResolveError> + Send + Sync,
{
    fn resolve(&self, doi: &str) -> Result<String, ResolveError> {
        self(doi)
    }
}

/// Configuration options for [DoiEnricher].
///
/// # Notes
///
/// - `run_in_parallel` only has an effect when the `parallel` feature is enabled.
/// - With `max_workers` of 0 or 1 lookups run sequentially.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Resolve DOIs on a bounded worker pool instead of one after another.
    pub run_in_parallel: bool,
    /// Upper bound on concurrent lookups when running in parallel.
    pub max_workers: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            run_in_parallel: false,
            max_workers: 4,
        }
    }
}

/// Counts of what happened to each entry during [DoiEnricher::enrich].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichReport {
    /// Entries that gained `doi_url` and `url`.
    pub resolved: usize,
    /// Entries whose DOI could not be resolved.
    pub failed: usize,
    /// Entries without a `doi` field.
    pub without_doi: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Resolved,
    Failed,
    NoDoi,
}

/// Adds resolved DOI URLs to parsed entries in place.
#[derive(Debug, Clone)]
pub struct DoiEnricher<R> {
    resolver: R,
    config: EnrichConfig,
}

impl<R: DoiResolver> DoiEnricher<R> {
    /// Creates an enricher that resolves sequentially.
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            config: EnrichConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EnrichConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolves the DOI of every entry that has one, adding `doi_url` and
    /// `url` on success.
    ///
    /// Entries are updated in place, so their order never changes even when
    /// lookups run on several workers.
    pub fn enrich(&self, entries: &mut [BibEntry]) -> EnrichReport {
        info!("Adding redirected URLs from DOI");

        let outcomes = match self.enrich_parallel(entries) {
            Some(outcomes) => outcomes,
            None => entries
                .iter_mut()
                .enumerate()
                .map(|(idx, entry)| self.enrich_entry(idx, entry))
                .collect(),
        };

        let report = outcomes
            .into_iter()
            .fold(EnrichReport::default(), |mut report, outcome| {
                match outcome {
                    Outcome::Resolved => report.resolved += 1,
                    Outcome::Failed => report.failed += 1,
                    Outcome::NoDoi => report.without_doi += 1,
                }
                report
            });

        info!(
            "Adding redirected URLs completed: {} resolved, {} failed, {} without DOI",
            report.resolved, report.failed, report.without_doi
        );
        report
    }

    /// Runs the lookups on a dedicated pool, or returns `None` when the
    /// configuration asks for sequential processing.
    #[cfg(feature = "parallel")]
    fn enrich_parallel(&self, entries: &mut [BibEntry]) -> Option<Vec<Outcome>> {
        use rayon::prelude::*;

        if !self.config.run_in_parallel || self.config.max_workers <= 1 {
            return None;
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!("Failed to start DOI worker pool, resolving sequentially: {e}");
                return None;
            }
        };

        Some(pool.install(|| {
            entries
                .par_iter_mut()
                .enumerate()
                .map(|(idx, entry)| self.enrich_entry(idx, entry))
                .collect()
        }))
    }

    #[cfg(not(feature = "parallel"))]
    fn enrich_parallel(&self, _entries: &mut [BibEntry]) -> Option<Vec<Outcome>> {
        None
    }

    fn enrich_entry(&self, idx: usize, entry: &mut BibEntry) -> Outcome {
        let Some(raw) = entry.doi().map(str::to_owned) else {
            debug!("No DOI found in entry {idx}");
            return Outcome::NoDoi;
        };

        let resolved = normalize_doi(&raw)
            .ok_or_else(|| ResolveError::InvalidDoi(raw.clone()))
            .and_then(|doi| self.resolver.resolve(&doi));

        match resolved {
            Ok(url) => {
                debug!("Entry {idx}: DOI {raw} resolved to {url}");
                entry.set_resolved_url(&url);
                Outcome::Resolved
            }
            Err(e) => {
                error!("An error occurred while getting URL for entry {idx}, DOI {raw}: {e}");
                Outcome::Failed
            }
        }
    }
}
