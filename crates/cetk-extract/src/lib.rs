//! ---
//! cetk_section: "07-document-intake"
//! cetk_subsection: "bootstrap"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Document extraction crate exports."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Pulls site parameters out of free-text technical documents.

pub mod document;
pub mod errors;
pub mod extractor;
pub mod rules;

pub use document::load_document_text;
pub use errors::{ExtractError, Result};
pub use extractor::{
    extract_fields, DocumentExtraction, ExtractedFields, FieldExtractor, DEFAULT_LATITUDE,
    DEFAULT_LONGITUDE,
};
pub use rules::{ExtractionRule, FirstNumber, RangeMidpoint, RuleChain, RuleMatch};
