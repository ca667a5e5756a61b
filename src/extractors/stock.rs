// src/extractors/stock.rs

// --- Imports ---
use crate::report::models::{StockExtraction, StockLineRecord};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Constants ---
/// Store name printed in the page header of the stock export.
pub const DEFAULT_STORE_NAME: &str = "REITZ APTEEK";

/// Page header and column-caption fragments.
const HEADER_KEYWORDS: &[&str] = &[
    "PAGE:",
    "CODE",
    "DESCRIPTION",
    "ON HAND",
    "SALES",
    "COST",
    "GROSS",
    "TURNOVER",
    "GP%",
    "QTY",
    "VALUE",
];

/// Department subtotal and divider markers.
const EXCLUSION_KEYWORDS: &[&str] = &["MAIN-DEPT", "SUB-DEPT", "TOTAL", "-------"];

// --- Regex Patterns (Lazy Static) ---
// Dept | stock code | description | on hand | sales qty | value | cost | GP | turnover % | GP %
static STOCK_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^([A-Z0-9]{6})\s+([A-Z0-9\-]{4,})\s+(.*?)\s+",
        r"(-?\d+\.\d{3})\s+(-?\d+\.\d{3})\s+(-?\d+\.\d{2})\s+",
        r"(-?\d+\.\d{2})\s+(-?\d+\.\d{2})\s+(-?\d+\.\d{3})\s+(-?\d+\.\d{3})$",
    ))
    .expect("Failed to compile STOCK_LINE_RE")
});

/// Decides which page-text lines are report furniture rather than product lines.
#[derive(Debug, Clone)]
pub struct StockLineFilter {
    header_keywords: Vec<String>,
    exclusion_keywords: Vec<String>,
}

impl StockLineFilter {
    /// Builds the filter for an export whose page header carries `store_name`.
    pub fn new(store_name: &str) -> Self {
        let mut header_keywords = Vec::with_capacity(HEADER_KEYWORDS.len() + 1);
        if !store_name.trim().is_empty() {
            header_keywords.push(store_name.trim().to_string());
        }
        header_keywords.extend(HEADER_KEYWORDS.iter().map(|k| k.to_string()));

        Self {
            header_keywords,
            exclusion_keywords: EXCLUSION_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// True for header/footer lines, subtotal lines and dash-only dividers.
    pub fn is_excluded(&self, line: &str) -> bool {
        if self.header_keywords.iter().any(|k| line.contains(k.as_str())) {
            return true;
        }
        if self.exclusion_keywords.iter().any(|k| line.contains(k.as_str())) {
            return true;
        }
        line.trim().chars().all(|c| c == '-' || c == ' ')
    }
}

impl Default for StockLineFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_NAME)
    }
}

/// Matches one cleaned line against the fixed column layout.
///
/// Returns `None` unless every column is present with its exact decimal precision.
pub fn parse_stock_line(line: &str) -> Option<StockLineRecord> {
    let caps = STOCK_LINE_RE.captures(line)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());

    Some(StockLineRecord {
        department_code: caps.get(1)?.as_str().trim().to_string(),
        stock_code: caps.get(2)?.as_str().trim().to_string(),
        description: caps.get(3)?.as_str().trim().to_string(),
        on_hand: number(4)?,
        sales_qty: number(5)?,
        sales_value: number(6)?,
        sales_cost: number(7)?,
        gross_profit: number(8)?,
        turnover_percent: number(9)?,
        gross_profit_percent: number(10)?,
    })
}

/// Turns the page-ordered lines of a stock export into line records.
pub struct StockReportExtractor {
    filter: StockLineFilter,
}

impl StockReportExtractor {
    pub fn new(filter: StockLineFilter) -> Self {
        Self { filter }
    }

    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> StockExtraction {
        let mut extraction = StockExtraction {
            lines_seen: lines.len(),
            ..Default::default()
        };

        for raw in lines {
            let raw = raw.as_ref();
            if self.filter.is_excluded(raw) {
                extraction.lines_filtered += 1;
                continue;
            }

            let line = raw.trim();
            match parse_stock_line(line) {
                Some(record) => extraction.records.push(record),
                None => {
                    tracing::trace!("Dropping unmatched stock line: '{}'", line);
                    extraction.lines_unmatched += 1;
                }
            }
        }

        tracing::info!(
            "Extracted {} stock lines ({} lines read, {} filtered, {} unmatched)",
            extraction.records.len(),
            extraction.lines_seen,
            extraction.lines_filtered,
            extraction.lines_unmatched
        );
        extraction
    }
}

impl Default for StockReportExtractor {
    fn default() -> Self {
        Self::new(StockLineFilter::default())
    }
}
