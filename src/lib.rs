//! A small library for turning BibTeX bibliographies into structured records.
//!
//! `bibdoi` splits a `.bib` file into entries, extracts each entry's
//! `key = value` fields into a [`BibEntry`], and can optionally look up each
//! entry's DOI to attach the canonical, redirect-resolved URL.
//!
//! # Key Features
//!
//! - **Entry chunking**: split raw text on `@type{` delimiters ([`chunk`])
//! - **Field extraction**: quoted, braced and bare values with a validated,
//!   configurable pattern ([`field`])
//! - **DOI resolution**: pluggable resolvers, an HTTP implementation that
//!   follows `dx.doi.org` redirects, optional bounded parallelism ([`doi`])
//! - **JSON output**: pretty-printed arrays of field maps ([`output`])
//!
//! # Basic Usage
//!
//! ```rust
//! use bibdoi::BibtexParser;
//!
//! let input = r#"@article{k1, author = "A. Smith", title = {A Study}, year = 2020}"#;
//!
//! let entries = BibtexParser::new().parse(input);
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].get("author"), Some("A. Smith"));
//! assert_eq!(entries[0].get("year"), Some("2020"));
//! ```
//!
//! # Resolving DOIs
//!
//! Any [`DoiResolver`] can be plugged in. Closures work too, which keeps tests
//! away from the network:
//!
//! ```rust
//! use bibdoi::{BibtexParser, DoiEnricher, ResolveError};
//!
//! let mut entries = BibtexParser::new().parse("@misc{m, doi = {10.1/test}}");
//!
//! let resolver = |doi: &str| -> Result<String, ResolveError> {
//!     Ok(format!("https://example.org/{doi}"))
//! };
//! let report = DoiEnricher::new(resolver).enrich(&mut entries);
//!
//! assert_eq!(report.resolved, 1);
//! assert_eq!(entries[0].get("url"), Some("https://example.org/10.1/test"));
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`], wrapping [`BibError`], so callers can
//! tell an unreadable file apart from an empty one:
//!
//! ```rust
//! use bibdoi::{BibError, BibtexParser};
//!
//! match BibtexParser::new().parse_file("references.txt") {
//!     Ok(entries) => println!("Parsed {} entries", entries.len()),
//!     Err(BibError::WrongExtension { path }) => eprintln!("not a .bib file: {}", path.display()),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

pub mod chunk;
pub mod doi;
pub mod field;
pub mod output;
pub mod parser;
mod regex;
pub mod source;
mod utils;

// Reexports
pub use doi::{DoiEnricher, DoiResolver, EnrichConfig, EnrichReport, ResolveError};
#[cfg(feature = "http")]
pub use doi::{HttpDoiResolver, ResolverConfig};
pub use field::{FieldPattern, ValueForm};
pub use parser::BibtexParser;

/// A specialized Result type for bibliography operations.
pub type Result<T> = std::result::Result<T, BibError>;

/// Represents errors that can occur while reading, parsing or writing bibliographies.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file type: {}, must be a .bib file", path.display())]
    WrongExtension { path: PathBuf },

    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid regular expression pattern: {0}")]
    InvalidPattern(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::regex::Error> for BibError {
    fn from(err: crate::regex::Error) -> Self {
        BibError::InvalidPattern(err.to_string())
    }
}

/// Field name of the DOI within an entry.
pub const DOI_FIELD: &str = "doi";
/// Field added with the resolved URL of an entry's DOI.
pub const DOI_URL_FIELD: &str = "doi_url";
/// Field overwritten with the resolved URL of an entry's DOI.
pub const URL_FIELD: &str = "url";

/// A single parsed bibliography entry: lowercase field names mapped to values.
///
/// Serializes as a plain JSON object. Keys are kept sorted so that repeated
/// runs over the same input produce byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BibEntry {
    fields: BTreeMap<String, String>,
}

impl BibEntry {
    /// Creates an entry with no fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a field. Lookups are case-insensitive.
    pub fn get(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(value) => Some(value.as_str()),
            None => self
                .fields
                .get(&field.to_lowercase())
                .map(String::as_str),
        }
    }

    /// Sets a field, lowercasing the name. A repeated field overwrites the earlier value.
    pub fn insert(&mut self, field: &str, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field.to_lowercase(), value.into())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// The raw `doi` field, if present.
    pub fn doi(&self) -> Option<&str> {
        self.get(DOI_FIELD)
    }

    /// Records a resolved DOI URL under both `doi_url` and `url`.
    pub fn set_resolved_url(&mut self, url: &str) {
        self.fields.insert(DOI_URL_FIELD.to_string(), url.to_string());
        self.fields.insert(URL_FIELD.to_string(), url.to_string());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for BibEntry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entry = BibEntry::new();
        for (k, v) in iter {
            entry.insert(k.as_ref(), v);
        }
        entry
    }
}
