use indexmap::IndexMap;
use log::debug;
use rust_decimal::Decimal;

use super::catalog::Catalog;
use super::identify::{SalesFile, VendorIdentifier};
use super::parser::{parse_sale, SaleLine};
use super::{content_lines, RecordError, VendorKey};

/// Running totals for a run, plus every diagnostic recorded on the way.
#[derive(Debug, Default)]
pub struct SalesLedger {
    pub vendor_totals: IndexMap<VendorKey, Decimal>,
    pub product_quantities: IndexMap<String, u64>,
    pub errors: Vec<RecordError>,
}

impl SalesLedger {
    /// Every catalog product starts at zero units so unsold products still
    /// show up in the report.
    pub fn new(catalog: &Catalog) -> SalesLedger {
        SalesLedger {
            vendor_totals: IndexMap::new(),
            product_quantities: catalog.products.keys().map(|id| (id.clone(), 0)).collect(),
            errors: Vec::new(),
        }
    }

    /// Adds `price * quantity` to the vendor and `quantity` to the product.
    /// The product must be in the catalog; the parser guarantees it. A sale
    /// whose amount does not fit leaves both totals untouched.
    pub fn record_sale(
        &mut self,
        catalog: &Catalog,
        key: &VendorKey,
        file_name: &str,
        line: &str,
        sale: &SaleLine,
    ) -> Result<(), RecordError> {
        let price = catalog
            .product(sale.product_id)
            .map(|product| product.price())
            .unwrap_or(Decimal::ZERO);

        let current_total = self.vendor_totals.get(key).copied().unwrap_or(Decimal::ZERO);
        let current_units = self.product_quantities.get(sale.product_id).copied().unwrap_or(0);

        let overflow = || RecordError::AmountOverflow {
            file: file_name.to_string(),
            line: line.to_string(),
        };
        let total = price
            .checked_mul(Decimal::from(sale.quantity))
            .and_then(|amount| current_total.checked_add(amount))
            .ok_or_else(overflow)?;
        let units = current_units.checked_add(u64::from(sale.quantity)).ok_or_else(overflow)?;

        self.vendor_totals.insert(key.clone(), total);
        self.product_quantities.insert(sale.product_id.to_string(), units);

        Ok(())
    }

    pub fn record_error(&mut self, err: RecordError) {
        debug!("sales diagnostic, err={}", err);
        self.errors.push(err);
    }

    /// Identifies the vendor of one sales file and folds its valid lines into
    /// the totals. Nothing here aborts the run.
    pub fn ingest_file(&mut self, catalog: &Catalog, identifier: &VendorIdentifier, file_name: &str, content: &str) {
        let file = SalesFile {
            name: file_name,
            lines: content_lines(content),
        };

        if file.lines.is_empty() {
            self.record_error(RecordError::EmptyFile {
                file: file_name.to_string(),
            });
            return;
        }

        let (identification, diagnostic) = identifier.identify(&file, catalog);
        if let Some(err) = diagnostic {
            self.record_error(err);
        }
        debug!("processing sales file, file={}, vendor={}", file_name, identification.key);

        let skip = usize::from(identification.header);
        for line in file.lines.iter().skip(skip) {
            let recorded = parse_sale(file_name, line, catalog)
                .and_then(|sale| self.record_sale(catalog, &identification.key, file_name, line, &sale));
            if let Err(err) = recorded {
                self.record_error(err);
            }
        }
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.errors.iter().map(|err| err.to_string()).collect()
    }
}
