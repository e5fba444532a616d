use std::io::BufRead;
use std::str::FromStr;

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use log::warn;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{split_fields, VendorKey};

#[derive(Debug, PartialEq, Error)]
pub enum CatalogWarning {
    #[error("{source_name}: line {line_no} has an invalid format, ignored")]
    InvalidFormat { source_name: String, line_no: usize },
    #[error("{source_name}: invalid price on line {line_no} -> {price}")]
    InvalidPrice {
        source_name: String,
        line_no: usize,
        price: String,
    },
    #[error("{source_name}: negative price on line {line_no} (product {product_id}), ignored")]
    NegativePrice {
        source_name: String,
        line_no: usize,
        product_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Product {
    #[getset(get = "pub")]
    id: String,
    #[getset(get = "pub")]
    name: String,
    #[getset(get_copy = "pub")]
    price: Decimal,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Vendor {
    doc_type: String,
    doc_number: String,
    first_names: String,
    last_names: String,
}

impl Vendor {
    pub fn new(
        doc_type: impl Into<String>,
        doc_number: impl Into<String>,
        first_names: impl Into<String>,
        last_names: impl Into<String>,
    ) -> Vendor {
        Vendor {
            doc_type: doc_type.into(),
            doc_number: doc_number.into(),
            first_names: first_names.into(),
            last_names: last_names.into(),
        }
    }

    pub fn key(&self) -> VendorKey {
        VendorKey::new(self.doc_type.clone(), self.doc_number.clone())
    }
}

/// Master data for a run. Both maps keep first-insertion order; a duplicate
/// key replaces the value in place.
#[derive(Debug, Default)]
pub struct Catalog {
    pub products: IndexMap<String, Product>,
    pub vendors: IndexMap<VendorKey, Vendor>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog {
            products: IndexMap::new(),
            vendors: IndexMap::new(),
        }
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn add_vendor(&mut self, vendor: Vendor) {
        self.vendors.insert(vendor.key(), vendor);
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn vendor(&self, key: &VendorKey) -> Option<&Vendor> {
        self.vendors.get(key)
    }

    /// First vendor, in catalog order, whose document number matches,
    /// whatever its document type.
    pub fn find_vendor_by_number(&self, doc_number: &str) -> Option<&Vendor> {
        self.vendors
            .values()
            .find(|vendor| vendor.doc_number == doc_number)
    }

    /// Reads `id;name;price` lines. Malformed lines are logged and skipped.
    pub fn load_products<R: BufRead>(&mut self, source_name: &str, reader: R) -> std::io::Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_product(source_name, idx + 1, &line) {
                Ok(Some(product)) => self.add_product(product),
                Ok(None) => {},
                Err(warning) => warn!("{}", warning),
            }
        }

        Ok(())
    }

    /// Reads `docType;docNumber;firstNames;lastNames` lines. Malformed lines
    /// are logged and skipped.
    pub fn load_vendors<R: BufRead>(&mut self, source_name: &str, reader: R) -> std::io::Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_vendor(source_name, idx + 1, &line) {
                Ok(Some(vendor)) => self.add_vendor(vendor),
                Ok(None) => {},
                Err(warning) => warn!("{}", warning),
            }
        }

        Ok(())
    }
}

/// `Ok(None)` for blank lines.
pub fn parse_product(source_name: &str, line_no: usize, line: &str) -> Result<Option<Product>, CatalogWarning> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fields = split_fields(line);
    if fields.len() < 3 {
        return Err(CatalogWarning::InvalidFormat {
            source_name: source_name.to_string(),
            line_no,
        });
    }

    let price = parse_price(fields[2]).ok_or_else(|| CatalogWarning::InvalidPrice {
        source_name: source_name.to_string(),
        line_no,
        price: fields[2].to_string(),
    })?;

    if price < Decimal::ZERO {
        return Err(CatalogWarning::NegativePrice {
            source_name: source_name.to_string(),
            line_no,
            product_id: fields[0].to_string(),
        });
    }

    Ok(Some(Product::new(fields[0], fields[1], price)))
}

/// `Ok(None)` for blank lines.
pub fn parse_vendor(source_name: &str, line_no: usize, line: &str) -> Result<Option<Vendor>, CatalogWarning> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fields = split_fields(line);
    if fields.len() < 4 {
        return Err(CatalogWarning::InvalidFormat {
            source_name: source_name.to_string(),
            line_no,
        });
    }

    Ok(Some(Vendor::new(fields[0], fields[1], fields[2], fields[3])))
}

fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
