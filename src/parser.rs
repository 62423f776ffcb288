//! BibTeX parser: raw text to field maps.
//!
//! # Example
//!
//! ```
//! use bibdoi::{BibtexParser, FieldPattern, ValueForm};
//!
//! let input = r#"
//! @article{smith2020,
//!   author = "A. Smith",
//!   title = {A Study},
//!   year = 2020
//! }
//! "#;
//!
//! let parser = BibtexParser::new();
//! let entries = parser.parse(input);
//! assert_eq!(entries[0].get("title"), Some("A Study"));
//!
//! // Restrict the accepted value forms
//! let strict = BibtexParser::new()
//!     .with_pattern(FieldPattern::with_forms(&[ValueForm::Braced]).unwrap());
//! assert_eq!(strict.parse(input)[0].get("author"), None);
//! ```

use crate::chunk::extract_metadata;
use crate::field::FieldPattern;
use crate::source::read_bib_file;
use crate::utils::preview;
use crate::{BibEntry, Result};
use std::path::Path;
use tracing::{debug, info};

/// Parser for BibTeX bibliographies.
///
/// Splits the text into entries on `@type{` delimiters and extracts each
/// entry's fields with a [FieldPattern]. Parsing text never fails; entries
/// without recognizable fields come back as empty [BibEntry] values so that
/// output positions line up with the entries in the source.
#[derive(Debug, Clone, Default)]
pub struct BibtexParser {
    pattern: FieldPattern,
}

impl BibtexParser {
    /// Creates a parser accepting quoted, braced and bare values.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibdoi::BibtexParser;
    /// let parser = BibtexParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: FieldPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn pattern(&self) -> &FieldPattern {
        &self.pattern
    }

    /// Parses BibTeX text into one [BibEntry] per entry, in source order.
    ///
    /// Empty input yields an empty vector.
    pub fn parse(&self, input: &str) -> Vec<BibEntry> {
        let metadata = extract_metadata(input);

        info!("Parsing the bibtex entries");
        let entries: Vec<BibEntry> = metadata
            .into_iter()
            .map(|chunk| {
                let entry = self.pattern.parse_fields(chunk);
                if entry.is_empty() {
                    debug!("Failed to parse: {}", preview(chunk));
                }
                entry
            })
            .collect();

        let valid = entries.iter().filter(|e| !e.is_empty()).count();
        info!("{} entries parsed, {} with fields", entries.len(), valid);
        entries
    }

    /// Reads a `.bib` file and parses it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`read_bib_file`]: wrong extension, missing file
    /// or an I/O failure. An empty file parses to an empty vector.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<BibEntry>> {
        let text = read_bib_file(path)?;
        Ok(self.parse(&text))
    }
}
