use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;

use crate::config::Config;
use crate::sales::catalog::Catalog;
use crate::sales::identify::VendorIdentifier;
use crate::sales::ledger::SalesLedger;
use crate::sales::report::{product_rows, vendor_rows, PRODUCT_REPORT_HEADER, VENDOR_REPORT_HEADER};
use crate::sales::{FatalLoadError, RecordError};

#[derive(Debug, PartialEq)]
pub struct RunSummary {
    pub sales_files: usize,
    pub errors: usize,
    pub error_log: Option<PathBuf>,
    pub vendor_report: PathBuf,
    pub product_report: PathBuf,
}

fn open_catalog(path: &Path) -> Result<BufReader<File>, FatalLoadError> {
    if !path.exists() {
        return Err(FatalLoadError::CatalogNotFound { path: path.to_path_buf() });
    }

    let file = File::open(path).map_err(|source| FatalLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(BufReader::new(file))
}

pub fn load_catalog(config: &Config) -> Result<Catalog, FatalLoadError> {
    let mut catalog = Catalog::new();

    let products_path = config.path(&config.products_file);
    catalog
        .load_products(&config.products_file, open_catalog(&products_path)?)
        .map_err(|source| FatalLoadError::Io {
            path: products_path.clone(),
            source,
        })?;

    let vendors_path = config.path(&config.vendors_file);
    catalog
        .load_vendors(&config.vendors_file, open_catalog(&vendors_path)?)
        .map_err(|source| FatalLoadError::Io {
            path: vendors_path.clone(),
            source,
        })?;

    debug!(
        "catalog loaded, products={}, vendors={}",
        catalog.products.len(),
        catalog.vendors.len()
    );

    Ok(catalog)
}

/// Sales files in the work directory, sorted by file name.
pub fn discover_sales_files(config: &Config) -> Result<Vec<PathBuf>, FatalLoadError> {
    let io_err = |source| FatalLoadError::Io {
        path: config.work_dir.clone(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(&config.work_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && config.is_sales_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// A file that cannot be read is recorded against the ledger and skipped.
pub fn process_sales_file(path: &Path, catalog: &Catalog, identifier: &VendorIdentifier, ledger: &mut SalesLedger) {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match fs::read_to_string(path) {
        Ok(content) => ledger.ingest_file(catalog, identifier, &file_name, &content),
        Err(err) => ledger.record_error(RecordError::ReadFailure {
            file: file_name,
            message: err.to_string(),
        }),
    }
}

/// Writes `header` then one `;`-separated row per record, unquoted.
pub fn export_csv<W: Write, R: Serialize>(writer: W, header: &[&str], rows: &[R]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;

    Ok(())
}

pub fn export_lines<W: Write>(mut writer: W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }

    writer.flush()?;

    Ok(())
}

pub fn export_reports(
    config: &Config,
    catalog: &Catalog,
    ledger: &SalesLedger,
    sales_files: usize,
) -> Result<RunSummary> {
    let vendor_report = config.path(&config.vendor_report_file);
    export_csv(File::create(&vendor_report)?, &VENDOR_REPORT_HEADER, &vendor_rows(ledger, catalog))?;

    let product_report = config.path(&config.product_report_file);
    export_csv(File::create(&product_report)?, &PRODUCT_REPORT_HEADER, &product_rows(ledger, catalog))?;

    let error_log = if ledger.errors.is_empty() {
        None
    } else {
        let path = config.path(&config.error_log_file);
        export_lines(File::create(&path)?, &ledger.error_lines())?;
        Some(path)
    };

    Ok(RunSummary {
        sales_files,
        errors: ledger.errors.len(),
        error_log,
        vendor_report,
        product_report,
    })
}

/// Loads the catalogs, folds every sales file into a ledger and writes the
/// reports. Only catalog or directory failures abort before writing.
pub fn run(config: &Config) -> Result<RunSummary> {
    let catalog = load_catalog(config)?;
    let identifier = VendorIdentifier::new(&config.vendor_file_pattern)?;
    let mut ledger = SalesLedger::new(&catalog);

    let files = discover_sales_files(config)?;
    for path in &files {
        process_sales_file(path, &catalog, &identifier, &mut ledger);
    }

    let summary = export_reports(config, &catalog, &ledger, files.len())?;
    if let Some(path) = &summary.error_log {
        info!("wrote {} with {} entries", path.display(), summary.errors);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn workspace(files: &[(&str, &str)]) -> Result<TempDir> {
        let dir = tempfile::tempdir()?;
        for (name, content) in files {
            fs::write(dir.path().join(name), content)?;
        }
        Ok(dir)
    }

    fn read(dir: &TempDir, name: &str) -> Result<String> {
        Ok(fs::read_to_string(dir.path().join(name))?)
    }

    #[test]
    fn test_run_scenario_a() -> Result<()> {
        let dir = workspace(&[
            ("productos.csv", "P1;Widget;10.00\n"),
            ("vendedores.csv", "CC;1;Ana;Lopez\n"),
            ("ventas_ana.csv", "CC;1\nP1;3\n"),
        ])?;

        let summary = run(&Config::new(dir.path()))?;

        assert_eq!(summary.sales_files, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.error_log, None);
        assert_eq!(
            read(&dir, "reporte_vendedores.csv")?,
            "Monto;TipoDocumento;NumeroDocumento;Nombres;Apellidos\n30.00;CC;1;Ana;Lopez\n"
        );
        assert_eq!(read(&dir, "reporte_productos.csv")?, "Nombre;Precio;CantidadVendida\nWidget;10.00;3\n");
        assert_eq!(dir.path().join("errores_log.txt").exists(), false);

        Ok(())
    }

    #[test]
    fn test_run_writes_error_log() -> Result<()> {
        let dir = workspace(&[
            ("productos.csv", "P1;Widget;10.00\n"),
            ("vendedores.csv", "CC;1;Ana;Lopez\n"),
            ("a.csv", "P1;-2\n"),
            ("b.csv", "\n   \n"),
        ])?;

        let summary = run(&Config::new(dir.path()))?;

        assert_eq!(summary.errors, 3);
        assert_eq!(
            read(&dir, "errores_log.txt")?,
            "vendor not identified for file a.csv\n\
             negative quantity in a.csv line: P1;-2\n\
             empty file: b.csv\n"
        );
        assert_eq!(read(&dir, "reporte_productos.csv")?, "Nombre;Precio;CantidadVendida\nWidget;10.00;0\n");
        assert_eq!(
            read(&dir, "reporte_vendedores.csv")?,
            "Monto;TipoDocumento;NumeroDocumento;Nombres;Apellidos\n"
        );

        Ok(())
    }

    #[test]
    fn test_run_is_idempotent() -> Result<()> {
        let dir = workspace(&[
            ("productos.csv", "P1;Widget;1500.5\nP2;Gadget;2\n"),
            ("vendedores.csv", "CC;1;Ana;Lopez\nCE;22;Luis;Diaz\n"),
            ("vendedor_1.csv", "P1;1\nP2;4\n"),
            ("ventas22.csv", "P2;10\nPX;1\n"),
        ])?;
        let config = Config::new(dir.path());

        run(&config)?;
        let first = (
            read(&dir, "reporte_vendedores.csv")?,
            read(&dir, "reporte_productos.csv")?,
            read(&dir, "errores_log.txt")?,
        );
        let summary = run(&config)?;
        let second = (
            read(&dir, "reporte_vendedores.csv")?,
            read(&dir, "reporte_productos.csv")?,
            read(&dir, "errores_log.txt")?,
        );

        assert_eq!(summary.sales_files, 2);
        assert_eq!(first, second);
        assert_eq!(
            first.0,
            "Monto;TipoDocumento;NumeroDocumento;Nombres;Apellidos\n\
             1508.50;CC;1;Ana;Lopez\n\
             20.00;CE;22;Luis;Diaz\n"
        );
        assert_eq!(
            first.1,
            "Nombre;Precio;CantidadVendida\nGadget;2.00;14\nWidget;1500.50;1\n"
        );

        Ok(())
    }

    #[test]
    fn test_run_fails_without_catalog() -> Result<()> {
        let dir = workspace(&[("productos.csv", "P1;Widget;10\n"), ("ventas.csv", "P1;1\n")])?;

        let err = run(&Config::new(dir.path())).unwrap_err();
        match err.downcast_ref::<FatalLoadError>() {
            Some(FatalLoadError::CatalogNotFound { path }) => assert_eq!(path, &dir.path().join("vendedores.csv")),
            other => anyhow::bail!("expected missing catalog, got {:?}", other),
        }
        assert_eq!(dir.path().join("reporte_vendedores.csv").exists(), false);

        Ok(())
    }

    #[test]
    fn test_run_fails_without_products_catalog() -> Result<()> {
        let dir = workspace(&[("vendedores.csv", "CC;1;Ana;Lopez\n"), ("ventas.csv", "CC;1\nP1;1\n")])?;

        let err = run(&Config::new(dir.path())).unwrap_err();
        match err.downcast_ref::<FatalLoadError>() {
            Some(FatalLoadError::CatalogNotFound { path }) => assert_eq!(path, &dir.path().join("productos.csv")),
            other => anyhow::bail!("expected missing catalog, got {:?}", other),
        }
        assert_eq!(dir.path().join("reporte_productos.csv").exists(), false);
        assert_eq!(dir.path().join("errores_log.txt").exists(), false);

        Ok(())
    }

    #[test]
    fn test_export_reports_counts_sales_files() -> Result<()> {
        let dir = workspace(&[])?;
        let catalog = Catalog::new();
        let ledger = SalesLedger::new(&catalog);

        let summary = export_reports(&Config::new(dir.path()), &catalog, &ledger, 3)?;

        assert_eq!(
            summary,
            RunSummary {
                sales_files: 3,
                errors: 0,
                error_log: None,
                vendor_report: dir.path().join("reporte_vendedores.csv"),
                product_report: dir.path().join("reporte_productos.csv"),
            }
        );

        Ok(())
    }

    #[test]
    fn test_discover_sales_files_sorted_and_filtered() -> Result<()> {
        let dir = workspace(&[
            ("productos.csv", ""),
            ("Vendedores.CSV", ""),
            ("reporte_productos.csv", ""),
            ("zeta.csv", ""),
            ("alpha.csv", ""),
            ("notes.txt", ""),
        ])?;
        fs::create_dir(dir.path().join("folder.csv"))?;

        let files = discover_sales_files(&Config::new(dir.path()))?;
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();

        assert_eq!(names, vec!["alpha.csv", "zeta.csv"]);

        Ok(())
    }

    #[test]
    fn test_unreadable_file_is_recorded() -> Result<()> {
        let dir = workspace(&[])?;
        let path = dir.path().join("binary.csv");
        fs::write(&path, [0xff, 0xfe, 0x00])?;

        let catalog = Catalog::new();
        let identifier = VendorIdentifier::new(crate::config::VENDOR_FILE_PATTERN)?;
        let mut ledger = SalesLedger::new(&catalog);
        process_sales_file(&path, &catalog, &identifier, &mut ledger);

        assert_eq!(ledger.errors.len(), 1);
        assert!(matches!(&ledger.errors[0], RecordError::ReadFailure { file, .. } if file == "binary.csv"));

        Ok(())
    }

    #[test]
    fn test_export_csv_writes_header_without_rows() -> Result<()> {
        let mut out = Vec::new();
        let rows: Vec<crate::sales::report::ProductRow> = Vec::new();
        export_csv(&mut out, &PRODUCT_REPORT_HEADER, &rows)?;

        assert_eq!(String::from_utf8(out)?, "Nombre;Precio;CantidadVendida\n");

        Ok(())
    }
}
