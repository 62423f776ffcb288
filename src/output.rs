//! JSON output of parsed entries.
//!
//! Entries are written as a JSON array of objects, pretty-printed with
//! four-space indentation:
//!
//! ```
//! use bibdoi::{BibtexParser, output};
//!
//! let entries = BibtexParser::new().parse("@misc{m, title = {T}}");
//! let json = output::to_json_string(&entries).unwrap();
//! assert_eq!(json, "[\n    {\n        \"title\": \"T\"\n    }\n]");
//! ```

use crate::{BibEntry, Result};
use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::Path;
use tracing::info;

/// File name used when saving without an explicit output path.
pub const DEFAULT_OUTPUT_FILE: &str = "parsed_bibtex.json";

const INDENT: &[u8] = b"    ";

/// Render entries as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`crate::BibError::Json`] if serialization fails.
pub fn to_json_string(entries: &[BibEntry]) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    entries.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write entries as pretty-printed JSON to `path`, replacing any existing file.
///
/// The document is rendered completely before the file is touched, so a
/// serialization failure leaves an earlier output intact.
///
/// # Errors
///
/// Returns [`crate::BibError::Json`] or [`crate::BibError::Io`].
pub fn write_json(entries: &[BibEntry], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = to_json_string(entries)?;
    fs::write(path, json)?;
    info!("Saved parsed entries to {}", path.display());
    Ok(())
}
