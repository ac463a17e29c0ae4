//! ---
//! cetk_section: "07-document-intake"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Document field extraction rules and text loading."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::{fs, path::Path};

use tracing::info;

use crate::errors::{ExtractError, Result};

/// Reads a document as plain text. `.pdf` files need the `pdf` feature.
pub fn load_document_text(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        read_pdf(path)?
    } else {
        fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?
    };

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument(path.to_path_buf()));
    }
    info!(path = %path.display(), chars = text.chars().count(), "Document loaded");
    Ok(text)
}

#[cfg(feature = "pdf")]
fn read_pdf(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path).map_err(|err| ExtractError::Pdf {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(not(feature = "pdf"))]
fn read_pdf(path: &Path) -> Result<String> {
    Err(ExtractError::PdfUnsupported(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_text_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("survey.txt");
        fs::write(&path, "Flow rate: 3 m3/s").unwrap();
        assert_eq!(load_document_text(&path).unwrap(), "Flow rate: 3 m3/s");
    }

    #[test]
    fn blank_and_missing_documents_are_errors() {
        let dir = tempdir().unwrap();
        let blank = dir.path().join("blank.txt");
        fs::write(&blank, "  \n").unwrap();
        assert!(matches!(
            load_document_text(&blank),
            Err(ExtractError::EmptyDocument(_))
        ));
        assert!(matches!(
            load_document_text(&dir.path().join("absent.txt")),
            Err(ExtractError::Io { .. })
        ));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn pdf_needs_the_feature() {
        assert!(matches!(
            load_document_text(Path::new("report.PDF")),
            Err(ExtractError::PdfUnsupported(_))
        ));
    }
}
