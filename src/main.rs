use anyhow::Result;
use std::env;

use log::{error, info};
use sales_recon::config::Config;
use sales_recon::data;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let work_dir = match args.len() {
        1 => env::current_dir()?,
        2 => args[1].clone().into(),
        _ => {
            eprintln!("Usage: cargo run -- [work_dir]");
            std::process::exit(1);
        },
    };

    info!("=== sales processing started ===");

    let config = Config::new(work_dir);
    let summary = match data::run(&config) {
        Ok(summary) => summary,
        Err(err) => {
            error!("critical error during processing: {:#}", err);
            std::process::exit(1);
        },
    };

    info!("processed {} sales file(s), generated:", summary.sales_files);
    info!(" - {}", config.vendor_report_file);
    info!(" - {}", config.product_report_file);
    info!("=== done ===");

    Ok(())
}
