//! Splitting raw BibTeX text into per-entry metadata chunks.
//!
//! Entries start at a delimiter of the form `@<letters>{`, e.g. `@article{`.
//! The text is cut at every delimiter, keeping the delimiters as separate
//! segments, and only the segments between delimiters are kept as entry
//! metadata.
//!
//! # Example
//!
//! ```
//! use bibdoi::chunk::extract_metadata;
//!
//! let chunks = extract_metadata("@book{b1, title={X}}@book{b2, title={Y}}");
//! assert_eq!(chunks, vec!["b1, title={X}}", "b2, title={Y}}"]);
//! ```
//!
//! This is not a BibTeX grammar: a malformed delimiter (say `@article(`)
//! is not recognized and its text is absorbed into the neighbouring chunk.

use crate::regex::{Match, Matches, Regex};
use crate::utils::preview;
use either::{Either, Left, Right};
use itertools::Itertools;
use std::sync::LazyLock;
use tracing::{debug, info};

static ENTRY_DELIMITER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z]+\{").unwrap());

/// An [Iterator] which splits text on entry delimiters, yielding the
/// delimiters themselves as well as the text between them.
///
/// Segments alternate between text and delimiter, starting and ending with a
/// (possibly empty) text segment, so `"a@book{b"` yields `"a"`, `"@book{"`,
/// `"b"`.
pub struct EntrySegments<'r, 't> {
    text: &'t str,
    position: usize,
    delimiters: Matches<'r, 't>,
    pending: Option<Match<'t>>,
    finished: bool,
}

impl<'t> EntrySegments<'static, 't> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            position: 0,
            delimiters: ENTRY_DELIMITER_REGEX.find_iter(text),
            pending: None,
            finished: false,
        }
    }
}

impl<'r, 't> Iterator for EntrySegments<'r, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(delimiter) = self.pending.take() {
            self.position = delimiter.end();
            return Some(delimiter.as_str());
        }
        if self.finished {
            return None;
        }
        match self.delimiters.next() {
            Some(delimiter) => {
                let segment = &self.text[self.position..delimiter.start()];
                self.pending = Some(delimiter);
                Some(segment)
            }
            None => {
                self.finished = true;
                Some(&self.text[self.position..])
            }
        }
    }
}

/// Split `text` on entry delimiters, keeping the delimiters. See [EntrySegments].
pub fn entry_segments(text: &str) -> EntrySegments<'static, '_> {
    EntrySegments::new(text)
}

/// Split BibTeX text into the metadata of each entry, in source order.
///
/// A segment is kept when, after trimming, it is non-empty and does not start
/// with `@`. Delimiters and blank gaps are dropped (logged at debug level).
/// Text with no entries yields an empty vector.
pub fn extract_metadata(text: &str) -> Vec<&str> {
    let (skipped, metadata): (Vec<_>, Vec<_>) =
        entry_segments(text.trim()).partition_map(classify_segment);

    for segment in skipped {
        debug!("Skipping invalid metadata: {}", preview(segment));
    }
    info!("{} entry metadata extracted", metadata.len());

    metadata
}

/// Accept the trimmed segment as entry metadata (Right) or reject it (Left).
fn classify_segment(segment: &str) -> Either<&str, &str> {
    let trimmed = segment.trim();
    if trimmed.is_empty() || trimmed.starts_with('@') {
        Left(segment)
    } else {
        Right(trimmed)
    }
}
