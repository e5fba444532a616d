use rust_decimal::Decimal;
use serde::Serialize;

use super::catalog::Catalog;
use super::ledger::SalesLedger;

pub const VENDOR_REPORT_HEADER: [&str; 5] = ["Monto", "TipoDocumento", "NumeroDocumento", "Nombres", "Apellidos"];
pub const PRODUCT_REPORT_HEADER: [&str; 3] = ["Nombre", "Precio", "CantidadVendida"];

#[derive(Debug, PartialEq, Serialize)]
pub struct VendorRow {
    #[serde(rename = "Monto")]
    pub amount: String,
    #[serde(rename = "TipoDocumento")]
    pub doc_type: String,
    #[serde(rename = "NumeroDocumento")]
    pub doc_number: String,
    #[serde(rename = "Nombres")]
    pub first_names: String,
    #[serde(rename = "Apellidos")]
    pub last_names: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ProductRow {
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Precio")]
    pub price: String,
    #[serde(rename = "CantidadVendida")]
    pub quantity: u64,
}

/// Two decimals, half-even.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Vendors by total, highest first. Ties keep first-contribution order.
pub fn vendor_rows(ledger: &SalesLedger, catalog: &Catalog) -> Vec<VendorRow> {
    let mut totals: Vec<_> = ledger.vendor_totals.iter().collect();
    totals.sort_by(|(_, a), (_, b)| b.cmp(a));

    totals
        .into_iter()
        .map(|(key, total)| match catalog.vendor(key) {
            Some(vendor) => VendorRow {
                amount: format_amount(*total),
                doc_type: vendor.doc_type().clone(),
                doc_number: vendor.doc_number().clone(),
                first_names: vendor.first_names().clone(),
                last_names: vendor.last_names().clone(),
            },
            None => VendorRow {
                amount: format_amount(*total),
                doc_type: key.doc_type.clone(),
                doc_number: key.doc_number.clone(),
                first_names: String::new(),
                last_names: String::new(),
            },
        })
        .collect()
}

/// Products by units sold, highest first. Ties keep catalog order.
pub fn product_rows(ledger: &SalesLedger, catalog: &Catalog) -> Vec<ProductRow> {
    let mut quantities: Vec<_> = ledger.product_quantities.iter().collect();
    quantities.sort_by(|(_, a), (_, b)| b.cmp(a));

    quantities
        .into_iter()
        .map(|(id, quantity)| match catalog.product(id) {
            Some(product) => ProductRow {
                name: product.name().clone(),
                price: format_amount(product.price()),
                quantity: *quantity,
            },
            None => ProductRow {
                name: "UNKNOWN".to_string(),
                price: "0.00".to_string(),
                quantity: *quantity,
            },
        })
        .collect()
}
