//! Field extraction from entry metadata.
//!
//! Each entry chunk is scanned for `key = value` pairs. The value may be
//! written in three forms, see [ValueForm]:
//!
//! ```plain
//! title = "quoted value"
//! title = {braced value}
//! year  = 2020
//! ```
//!
//! This is a best-effort tokenizer rather than a BibTeX grammar. Nested
//! braces, escaped quotes and LaTeX commands are not understood: a braced
//! value ends at the first `}`, a quoted value at the next `"`.
//!
//! # Example
//!
//! ```
//! use bibdoi::field::{FieldPattern, ValueForm};
//!
//! let pattern = FieldPattern::default();
//! let entry = pattern.parse_fields(r#"k1, AUTHOR = "A. Smith", year = 2020}"#);
//! assert_eq!(entry.get("author"), Some("A. Smith"));
//!
//! // Only accept braced values
//! let braced = FieldPattern::with_forms(&[ValueForm::Braced]).unwrap();
//! assert!(braced.parse_fields("year = 2020").is_empty());
//! ```

use crate::regex::{Captures, Regex};
use crate::{BibEntry, BibError, Result};
use std::sync::LazyLock;

/// Key part of every generated pattern: a word followed by `=`.
const KEY_FRAGMENT: &str = r"(\w+)\s*=\s*";

static DEFAULT_PATTERN: LazyLock<FieldPattern> = LazyLock::new(|| {
    FieldPattern::with_forms(ValueForm::ALL).expect("built-in field pattern is valid")
});

/// A way of writing a field value.
///
/// Field names and bare values are runs of word characters (`\w`). With the
/// default `regex` backend these are Unicode word characters; with the `lite`
/// feature `regex-lite` only matches ASCII, so a name such as `título` is not
/// recognized as a field there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueForm {
    /// `key = "value"`; the value may not contain `"`.
    Quoted,
    /// `key = {value}`; the value may not contain `}`.
    Braced,
    /// `key = value`; the value is a single run of word characters.
    Bare,
}

impl ValueForm {
    /// All forms, in the order they are tried.
    pub const ALL: &'static [ValueForm] = &[ValueForm::Quoted, ValueForm::Braced, ValueForm::Bare];

    /// The alternative matching this form, with the value in one capture group.
    fn fragment(self) -> &'static str {
        match self {
            ValueForm::Quoted => r#""([^"]*)""#,
            ValueForm::Braced => r"\{([^\}]*)\}",
            ValueForm::Bare => r"(\w+)",
        }
    }
}

/// A validated pattern for recognizing `key = value` fields.
///
/// The pattern is checked once when it is built, so parsing an entry can
/// never fail: entries the pattern does not understand simply yield fewer
/// fields.
///
/// Matching uses the capture groups positionally: the first non-empty group
/// of a match is the field name and the next non-empty group is its value.
/// When no value group captured anything (e.g. `note = {}`), the value is
/// the empty string.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    regex: Regex,
}

impl Default for FieldPattern {
    /// Recognizes quoted, braced and bare values, equivalent to
    /// `(\w+)\s*=\s*(?:"([^"]*)"|\{([^\}]*)\}|(\w+))`.
    fn default() -> Self {
        DEFAULT_PATTERN.clone()
    }
}

impl FieldPattern {
    /// Builds a pattern accepting only the given value forms.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::InvalidPattern`] if `forms` is empty.
    pub fn with_forms(forms: &[ValueForm]) -> Result<Self> {
        if forms.is_empty() {
            return Err(BibError::InvalidPattern(
                "at least one value form is required".into(),
            ));
        }
        let alternatives = forms
            .iter()
            .map(|form| form.fragment())
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("{KEY_FRAGMENT}(?:{alternatives})"))?;
        Ok(Self { regex })
    }

    /// Uses a caller-supplied regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::InvalidPattern`] if the expression does not compile
    /// or has fewer than two capture groups (one for the key, at least one for
    /// the value).
    pub fn custom(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups < 2 {
            return Err(BibError::InvalidPattern(format!(
                "expected a key group and at least one value group, found {groups} group(s) in {pattern:?}"
            )));
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Parse one entry's metadata into a [BibEntry].
    ///
    /// Field names are lowercased and a repeated field keeps its last value.
    /// Metadata without any recognizable field yields an empty entry.
    pub fn parse_fields(&self, metadata: &str) -> BibEntry {
        self.regex
            .captures_iter(metadata)
            .filter_map(|captures| key_value(&captures))
            .collect()
    }
}

/// Pick the key and value out of one match.
fn key_value<'h>(captures: &Captures<'h>) -> Option<(&'h str, &'h str)> {
    let mut groups = captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty());
    let key = groups.next()?;
    Some((key, groups.next().unwrap_or("")))
}
