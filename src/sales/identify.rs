use enum_dispatch::enum_dispatch;
use regex::Regex;

use super::catalog::Catalog;
use super::{split_fields, FatalLoadError, RecordError, VendorKey, UNKNOWN_DOC_TYPE};

/// A sales file as seen by the identification rules: its name and its
/// non-empty trimmed lines.
pub struct SalesFile<'a> {
    pub name: &'a str,
    pub lines: Vec<&'a str>,
}

#[derive(Debug, PartialEq)]
pub struct Identification {
    pub key: VendorKey,
    /// Whether the first line was consumed as the vendor header.
    pub header: bool,
}

#[enum_dispatch]
pub trait IdentificationRule {
    fn identify(&self, file: &SalesFile, catalog: &Catalog) -> Option<Identification>;
}

#[enum_dispatch(IdentificationRule)]
pub enum Rule {
    HeaderLine,
    FilenamePattern,
    BareDigits,
}

/// `docType;docNumber` on the first line. A first line whose first field is
/// a known product is a sales record and never a header.
pub struct HeaderLine;

impl IdentificationRule for HeaderLine {
    fn identify(&self, file: &SalesFile, catalog: &Catalog) -> Option<Identification> {
        let first = file.lines.first()?;
        let fields = split_fields(first);
        if fields.len() < 2 || fields[0].is_empty() || fields[1].is_empty() {
            return None;
        }

        if catalog.product(fields[0]).is_some() {
            return None;
        }

        Some(Identification {
            key: VendorKey::new(fields[0], fields[1]),
            header: true,
        })
    }
}

/// Document number captured from a `vendedor_<digits>` style file name.
pub struct FilenamePattern {
    pattern: Regex,
}

impl FilenamePattern {
    pub fn new(pattern: &str) -> Result<FilenamePattern, regex::Error> {
        Ok(FilenamePattern {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl IdentificationRule for FilenamePattern {
    fn identify(&self, file: &SalesFile, catalog: &Catalog) -> Option<Identification> {
        let captures = self.pattern.captures(file.name)?;
        let doc_number = captures.get(1)?.as_str();
        Some(by_number(doc_number, catalog))
    }
}

/// First run of digits anywhere in the file name.
pub struct BareDigits {
    digits: Regex,
}

impl BareDigits {
    pub fn new() -> Result<BareDigits, regex::Error> {
        Ok(BareDigits {
            digits: Regex::new(r"\d+")?,
        })
    }
}

impl IdentificationRule for BareDigits {
    fn identify(&self, file: &SalesFile, catalog: &Catalog) -> Option<Identification> {
        let found = self.digits.find(file.name)?;
        Some(by_number(found.as_str(), catalog))
    }
}

/// Reuses the document type of a known vendor with this number, else `UNK`.
fn by_number(doc_number: &str, catalog: &Catalog) -> Identification {
    let doc_type = catalog
        .find_vendor_by_number(doc_number)
        .map(|vendor| vendor.doc_type().as_str())
        .unwrap_or(UNKNOWN_DOC_TYPE);

    Identification {
        key: VendorKey::new(doc_type, doc_number),
        header: false,
    }
}

/// Applies the rules in order; the first one that fires wins.
pub struct VendorIdentifier {
    rules: Vec<Rule>,
}

impl VendorIdentifier {
    pub fn new(vendor_file_pattern: &str) -> Result<VendorIdentifier, FatalLoadError> {
        Ok(VendorIdentifier {
            rules: vec![
                Rule::HeaderLine(HeaderLine),
                Rule::FilenamePattern(FilenamePattern::new(vendor_file_pattern)?),
                Rule::BareDigits(BareDigits::new()?),
            ],
        })
    }

    /// Never fails: a file no rule can place gets the unknown sentinel and a
    /// diagnostic.
    pub fn identify(&self, file: &SalesFile, catalog: &Catalog) -> (Identification, Option<RecordError>) {
        if let Some(identification) = self.rules.iter().find_map(|rule| rule.identify(file, catalog)) {
            return (identification, None);
        }

        (
            Identification {
                key: VendorKey::unknown(),
                header: false,
            },
            Some(RecordError::VendorNotIdentified {
                file: file.name.to_string(),
            }),
        )
    }
}
