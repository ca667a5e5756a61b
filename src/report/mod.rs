// src/report/mod.rs
pub mod models;
pub mod source;

pub use models::{
    CanonicalDailyReport, Diagnostic, KeyedReport, ParsedReport, ReportKey, Section,
    StockExtraction, StockLineRecord,
};
