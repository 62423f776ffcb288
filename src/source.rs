//! Reading `.bib` files from disk.

use crate::{BibError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Extension a bibliography file must carry.
pub const BIB_EXTENSION: &str = "bib";

/// Read the contents of a `.bib` file.
///
/// # Errors
///
/// - [`BibError::WrongExtension`] if the path does not end in `.bib`
/// - [`BibError::NotFound`] if nothing exists at the path
/// - [`BibError::Io`] for any other read or decoding failure
///
/// An empty file is not an error: it yields an empty string and a warning.
pub fn read_bib_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    info!("Reading {}", path.display());

    if path.extension().and_then(|ext| ext.to_str()) != Some(BIB_EXTENSION) {
        return Err(BibError::WrongExtension {
            path: path.to_path_buf(),
        });
    }

    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => BibError::NotFound {
            path: path.to_path_buf(),
        },
        _ => BibError::Io(err),
    })?;

    if text.is_empty() {
        warn!("The file {} is empty", path.display());
    } else {
        info!("Successfully read {}", path.display());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::{Builder, tempdir};

    #[test]
    fn test_read_bib_file() {
        let mut file = Builder::new().suffix(".bib").tempfile().unwrap();
        write!(file, "@misc{{m, title = {{T}}}}").unwrap();

        let text = read_bib_file(file.path()).unwrap();
        assert_eq!(text, "@misc{m, title = {T}}");
    }

    #[test]
    fn test_empty_file_is_ok() {
        let file = Builder::new().suffix(".bib").tempfile().unwrap();
        assert_eq!(read_bib_file(file.path()).unwrap(), "");
    }

    #[test]
    fn test_wrong_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = read_bib_file(file.path());
        assert!(matches!(result, Err(BibError::WrongExtension { .. })));
    }

    #[test]
    fn test_extension_is_checked_before_existence() {
        let result = read_bib_file("does/not/exist.json");
        assert!(matches!(result, Err(BibError::WrongExtension { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bib");
        match read_bib_file(&path) {
            Err(BibError::NotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_is_io_error() {
        let dir = Builder::new().suffix(".bib").tempdir().unwrap();
        let result = read_bib_file(dir.path());
        assert!(matches!(result, Err(BibError::Io(_))));
    }
}
