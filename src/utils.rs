use crate::regex::Regex;
use std::sync::LazyLock;

static DOI_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://(?:dx\.)?doi\.org/(.+)$").unwrap());

/// Number of characters of a chunk shown in log lines.
const PREVIEW_CHARS: usize = 30;

/// Normalizes a DOI field value to the bare identifier used for lookups.
///
/// Strips surrounding whitespace, a leading `doi:` label and a `doi.org`
/// URL prefix. The identifier's case is kept as written since it ends up in
/// the request URL.
///
/// # Arguments
///
/// * `doi_str` - The raw DOI field value
///
/// Returns `None` when nothing usable remains or the value contains whitespace.
pub(crate) fn normalize_doi(doi_str: &str) -> Option<String> {
    let mut doi = doi_str.trim();

    if doi.get(..4).is_some_and(|label| label.eq_ignore_ascii_case("doi:")) {
        doi = doi[4..].trim_start();
    }

    if let Some(captures) = DOI_URL_REGEX.captures(doi) {
        doi = captures.get(1).map_or("", |m| m.as_str());
    }

    if doi.is_empty() || doi.contains(char::is_whitespace) {
        None
    } else {
        Some(doi.to_string())
    }
}

/// The first few characters of `text`, for logging skipped or unparsable chunks.
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
