// src/main.rs
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pharmacy_report_extractor::extractors::StockReportExtractor;
use pharmacy_report_extractor::pipeline;
use pharmacy_report_extractor::report::source::page_lines;
use pharmacy_report_extractor::storage::StorageManager;
use pharmacy_report_extractor::utils::{self, html_debug, AppError};
use pharmacy_report_extractor::{DailyReportExtractor, ExtractorConfig, ReportKey};
use std::path::PathBuf;
use std::sync::Arc;

/// Command Line Interface for the pharmacy report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: String,

    /// Debug-level logging for this crate (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse daily HTML reports into canonical JSON records
    Daily {
        /// HTML report files (named <pharmacy>_<YYYYMMDD>_<name> unless --pharmacy/--date are given)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Pharmacy code for every file (requires --date)
        #[arg(long, requires = "date")]
        pharmacy: Option<String>,

        /// Report date for every file, YYYY-MM-DD (requires --pharmacy)
        #[arg(long, requires = "pharmacy")]
        date: Option<NaiveDate>,

        /// Encoding for reports that declare none (default: windows-1252)
        #[arg(long)]
        encoding: Option<String>,

        /// Debug mode - save annotated HTML files for debugging
        #[arg(short, long)]
        debug: bool,
    },

    /// Parse stock-movement page text (pdftotext output) into CSV rows
    Stock {
        /// Text file with form-feed separated pages
        file: PathBuf,

        /// Store name printed in the page header (default: REITZ APTEEK)
        #[arg(long)]
        store_name: Option<String>,

        /// Only keep lines with sales movement
        #[arg(long)]
        moving_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (RUST_LOG overrides --verbose)
    utils::logging::setup_logging(args.verbose);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    match args.command {
        Command::Daily {
            files,
            pharmacy,
            date,
            encoding,
            debug,
        } => {
            let config = ExtractorConfig::resolve(encoding, None);
            if encoding_rs::Encoding::for_label(config.default_encoding.as_bytes()).is_none() {
                return Err(AppError::Config(format!(
                    "Unknown default encoding '{}'",
                    config.default_encoding
                )));
            }
            let key = match (pharmacy, date) {
                (Some(pharmacy), Some(date)) => Some(ReportKey::new(pharmacy, date)),
                _ => None,
            };
            run_daily(&storage, config, files, key, debug).await
        }
        Command::Stock {
            file,
            store_name,
            moving_only,
        } => {
            let config = ExtractorConfig::resolve(None, store_name);
            run_stock(&storage, config, file, moving_only)
        }
    }
}

async fn run_daily(
    storage: &StorageManager,
    config: ExtractorConfig,
    files: Vec<PathBuf>,
    key: Option<ReportKey>,
    debug: bool,
) -> Result<(), AppError> {
    let extractor = Arc::new(DailyReportExtractor::new(config.default_encoding));
    tracing::info!("Parsing {} daily report(s)", files.len());

    let outcomes = pipeline::parse_daily_files(extractor, files, key).await;

    let mut success_count = 0;
    let mut failure_count = 0;

    for outcome in outcomes {
        let document = match outcome.result {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Failed to parse {}: {}", outcome.path.display(), e);
                failure_count += 1;
                continue;
            }
        };

        for diagnostic in &document.parsed.diagnostics {
            tracing::warn!("{}: {}", outcome.path.display(), diagnostic);
        }

        if debug {
            let debug_dir = storage.base_dir().join("debug");
            std::fs::create_dir_all(&debug_dir)?;
            let file_name = outcome
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "report.htm".to_string());
            let debug_path = debug_dir.join(format!("{}.annotated.html", file_name));
            if let Err(e) =
                html_debug::create_debug_html(&document.html, &document.parsed.diagnostics, &debug_path)
            {
                tracing::warn!("Failed to create debug HTML: {}", e);
            }
        }

        match storage.save_report(&document.keyed) {
            Ok(path) => tracing::info!("Saved record to: {}", path.display()),
            Err(e) => {
                tracing::error!("Failed to save record for {}: {}", outcome.path.display(), e);
                failure_count += 1;
                continue;
            }
        }
        match storage.save_report_metadata(&document.keyed, &outcome.path, &document.parsed.diagnostics) {
            Ok(path) => tracing::info!("Saved metadata to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save metadata: {}", e),
        }
        success_count += 1;
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to extract any daily reports from {} files",
            failure_count
        )));
    }

    Ok(())
}

fn run_stock(
    storage: &StorageManager,
    config: ExtractorConfig,
    file: PathBuf,
    moving_only: bool,
) -> Result<(), AppError> {
    let bytes = std::fs::read(&file)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines = page_lines(&text);

    let extractor = StockReportExtractor::new(config.stock_filter());
    let mut records = extractor.extract(&lines).records;
    if moving_only {
        records.retain(|r| r.has_movement());
        tracing::info!("Kept {} stock lines with sales movement", records.len());
    }

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stock".to_string());
    let path = storage.save_stock_lines(&records, &format!("{}_stock_lines.csv", stem))?;
    tracing::info!("Wrote {} stock lines to {}", records.len(), path.display());

    Ok(())
}
