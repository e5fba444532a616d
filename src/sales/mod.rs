use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub mod catalog;
pub mod identify;
pub mod ledger;
pub mod parser;
pub mod report;


pub const UNKNOWN_DOC_TYPE: &str = "UNK";
pub const UNKNOWN_DOC_NUMBER: &str = "UNKNOWN";

/// Errors that stop the whole run before any report is written.
#[derive(Debug, Error)]
pub enum FatalLoadError {
    #[error("catalog file not found: {}", path.display())]
    CatalogNotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid vendor file pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A recoverable anomaly in a sales file. The display form is the line
/// written to the error log.
#[derive(Debug, PartialEq, Error)]
pub enum RecordError {
    #[error("empty file: {file}")]
    EmptyFile { file: String },
    #[error("vendor not identified for file {file}")]
    VendorNotIdentified { file: String },
    #[error("invalid format in file {file} line: {line}")]
    InvalidFormat { file: String, line: String },
    #[error("empty field in file {file} line: {line}")]
    EmptyField { file: String, line: String },
    #[error("invalid quantity in {file} line: {line}")]
    InvalidQuantity { file: String, line: String },
    #[error("negative quantity in {file} line: {line}")]
    NegativeQuantity { file: String, line: String },
    #[error("product not found (id={product_id}) in file {file} line: {line}")]
    ProductNotFound {
        product_id: String,
        file: String,
        line: String,
    },
    #[error("amount overflow in file {file} line: {line}")]
    AmountOverflow { file: String, line: String },
    #[error("failed reading file {file} -> {message}")]
    ReadFailure { file: String, message: String },
}

/// Join key between sales totals and the vendor catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VendorKey {
    pub doc_type: String,
    pub doc_number: String,
}

impl VendorKey {
    pub fn new(doc_type: impl Into<String>, doc_number: impl Into<String>) -> VendorKey {
        VendorKey {
            doc_type: doc_type.into(),
            doc_number: doc_number.into(),
        }
    }

    pub fn unknown() -> VendorKey {
        VendorKey::new(UNKNOWN_DOC_TYPE, UNKNOWN_DOC_NUMBER)
    }

    pub fn is_unknown(&self) -> bool {
        self.doc_type == UNKNOWN_DOC_TYPE && self.doc_number == UNKNOWN_DOC_NUMBER
    }
}

impl fmt::Display for VendorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.doc_type, self.doc_number)
    }
}

/// Splits a line on `;` and trims every field. Trailing empty fields are
/// dropped before trimming, so `"P1;"` yields one field and `"P1; ;"` two.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(';').collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields.into_iter().map(str::trim).collect()
}

/// Non-empty lines of `content`, trimmed.
pub fn content_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
