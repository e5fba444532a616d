use super::catalog::Catalog;
use super::{split_fields, RecordError};

#[derive(Debug, PartialEq)]
pub struct SaleLine<'a> {
    pub product_id: &'a str,
    pub quantity: u32,
}

/// Validates one `productId;quantity` line of `file_name`.
pub fn parse_sale<'a>(file_name: &str, line: &'a str, catalog: &Catalog) -> Result<SaleLine<'a>, RecordError> {
    let fields = split_fields(line);
    if fields.len() < 2 {
        return Err(RecordError::InvalidFormat {
            file: file_name.to_string(),
            line: line.to_string(),
        });
    }

    let (product_id, raw_quantity) = (fields[0], fields[1]);
    if product_id.is_empty() || raw_quantity.is_empty() {
        return Err(RecordError::EmptyField {
            file: file_name.to_string(),
            line: line.to_string(),
        });
    }

    let quantity: i32 = raw_quantity.parse().map_err(|_| RecordError::InvalidQuantity {
        file: file_name.to_string(),
        line: line.to_string(),
    })?;

    let quantity = u32::try_from(quantity).map_err(|_| RecordError::NegativeQuantity {
        file: file_name.to_string(),
        line: line.to_string(),
    })?;

    if catalog.product(product_id).is_none() {
        return Err(RecordError::ProductNotFound {
            product_id: product_id.to_string(),
            file: file_name.to_string(),
            line: line.to_string(),
        });
    }

    Ok(SaleLine { product_id, quantity })
}
