use std::path::{Path, PathBuf};

pub const PRODUCTS_FILE: &str = "productos.csv";
pub const VENDORS_FILE: &str = "vendedores.csv";
pub const VENDOR_REPORT_FILE: &str = "reporte_vendedores.csv";
pub const PRODUCT_REPORT_FILE: &str = "reporte_productos.csv";
pub const ERROR_LOG_FILE: &str = "errores_log.txt";
pub const SALES_EXTENSION: &str = "csv";
pub const VENDOR_FILE_PATTERN: &str = r"(?i)vendedor[_-]?(\d+)";

/// Locations and naming rules for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub products_file: String,
    pub vendors_file: String,
    pub vendor_report_file: String,
    pub product_report_file: String,
    pub error_log_file: String,
    pub sales_extension: String,
    /// Must capture the vendor document number in group 1.
    pub vendor_file_pattern: String,
}

impl Config {
    pub fn new(work_dir: impl Into<PathBuf>) -> Config {
        Config {
            work_dir: work_dir.into(),
            products_file: PRODUCTS_FILE.to_string(),
            vendors_file: VENDORS_FILE.to_string(),
            vendor_report_file: VENDOR_REPORT_FILE.to_string(),
            product_report_file: PRODUCT_REPORT_FILE.to_string(),
            error_log_file: ERROR_LOG_FILE.to_string(),
            sales_extension: SALES_EXTENSION.to_string(),
            vendor_file_pattern: VENDOR_FILE_PATTERN.to_string(),
        }
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.work_dir.join(file_name)
    }

    /// Catalogs and outputs never count as sales files, whatever their case.
    pub fn is_reserved(&self, file_name: &str) -> bool {
        [
            &self.products_file,
            &self.vendors_file,
            &self.vendor_report_file,
            &self.product_report_file,
            &self.error_log_file,
        ]
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(file_name))
    }

    pub fn is_sales_file(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.sales_extension);

        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => has_extension && !self.is_reserved(name),
            None => false,
        }
    }
}
