//! ---
//! cetk_section: "07-document-intake"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Document field extraction rules and text loading."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is a PDF; rebuild with the `pdf` feature to read it")]
    PdfUnsupported(PathBuf),
    #[error("failed to extract text from {path}: {reason}")]
    Pdf { path: PathBuf, reason: String },
    #[error("{0} contains no text")]
    EmptyDocument(PathBuf),
}
