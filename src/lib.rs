// src/lib.rs
//! Extraction core for daily pharmacy point-of-sale reports.
//!
//! Two input shapes are supported:
//! - HTML daily reports, turned into a [`CanonicalDailyReport`] that always carries every field.
//! - Page text of a PDF stock-movement export, turned into [`StockLineRecord`]s.
//!
//! Both entry points are synchronous and hold no shared state, so documents can be parsed
//! in parallel freely.

pub mod extractors;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod utils;

pub use extractors::{DailyReportExtractor, StockLineFilter, StockReportExtractor};
pub use report::models::{
    CanonicalDailyReport, Diagnostic, KeyedReport, ParsedReport, ReportKey, Section,
    StockExtraction, StockLineRecord,
};
pub use utils::config::ExtractorConfig;
pub use utils::error::ExtractError;

/// Parses one HTML daily report using the default `windows-1252` fallback encoding.
///
/// Missing sections keep their zero defaults and are listed in the returned diagnostics;
/// only undecodable input is an error.
pub fn parse_daily_report(bytes: &[u8]) -> Result<ParsedReport, ExtractError> {
    DailyReportExtractor::default().parse_bytes(bytes)
}

/// Extracts stock line records from page-ordered text lines using the default filter.
pub fn parse_stock_lines<S: AsRef<str>>(lines: &[S]) -> Vec<StockLineRecord> {
    StockReportExtractor::default().extract(lines).records
}
