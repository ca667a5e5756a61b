// src/storage/mod.rs
use crate::report::models::{Diagnostic, KeyedReport, StockLineRecord};
use crate::utils::error::StorageError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory for one pharmacy's reports in one year: /base_dir/PHARMACY/YYYY/
    fn report_dir(&self, report: &KeyedReport) -> Result<PathBuf, StorageError> {
        let target_dir = self
            .base_dir
            .join(report.key.pharmacy_code.to_uppercase())
            .join(report.key.report_date.format("%Y").to_string());

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    fn report_stem(report: &KeyedReport) -> String {
        format!(
            "{}_{}_daily",
            report.key.pharmacy_code.to_uppercase(),
            report.key.report_date.format("%Y%m%d")
        )
    }

    /// Saves the keyed canonical record as pretty JSON, one flat object
    pub fn save_report(&self, report: &KeyedReport) -> Result<PathBuf, StorageError> {
        let file_path = self
            .report_dir(report)?
            .join(format!("{}.json", Self::report_stem(report)));

        let json = serde_json::to_string_pretty(report)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved report to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves metadata about the parse (source, diagnostics, timestamp) next to the record
    pub fn save_report_metadata(
        &self,
        report: &KeyedReport,
        source: &Path,
        diagnostics: &[Diagnostic],
    ) -> Result<PathBuf, StorageError> {
        let file_path = self
            .report_dir(report)?
            .join(format!("{}_meta.json", Self::report_stem(report)));

        let metadata = serde_json::json!({
            "pharmacy_code": report.key.pharmacy_code,
            "report_date": report.key.report_date,
            "source_file": source.display().to_string(),
            "diagnostics": diagnostics,
            "diagnostic_messages": diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves stock line records as CSV for bulk import
    pub fn save_stock_lines(
        &self,
        records: &[StockLineRecord],
        file_name: &str,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);
        let file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        write_stock_csv(records, file)?;

        tracing::info!("Saved {} stock lines to {}", records.len(), file_path.display());
        Ok(file_path)
    }
}

/// Column names of the bulk-import file; must match the serde names of `StockLineRecord`.
const STOCK_CSV_HEADER: [&str; 10] = [
    "DepartmentCode",
    "StockCode",
    "Description",
    "OnHand",
    "SalesQty",
    "SalesValue",
    "SalesCost",
    "GrossProfit",
    "TurnoverPercent",
    "GrossProfitPercent",
];

/// Writes stock line records with the bulk-import header row, which is present even
/// when there are no records.
pub fn write_stock_csv<W: Write>(records: &[StockLineRecord], writer: W) -> Result<(), StorageError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    // serialize() only emits the header alongside the first record
    if records.is_empty() {
        csv.write_record(STOCK_CSV_HEADER)?;
    }

    for record in records {
        csv.serialize(record)?;
    }

    csv.flush().map_err(StorageError::IoError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::models::{CanonicalDailyReport, ReportKey, Section};
    use chrono::NaiveDate;

    fn keyed() -> KeyedReport {
        let mut record = CanonicalDailyReport::default();
        record.sales.cash_sales_trans_today = 42;
        record.sales.cash_sales_today = 1050.0;
        KeyedReport {
            key: ReportKey::new("reitz", NaiveDate::from_ymd_opt(2025, 7, 16).unwrap()),
            record,
        }
    }

    fn stock_line() -> StockLineRecord {
        StockLineRecord {
            department_code: "123456".into(),
            stock_code: "ABC-001".into(),
            description: "Paracetamol, 500mg".into(),
            on_hand: 10.0,
            sales_qty: 5.0,
            sales_value: 45.0,
            sales_cost: 30.0,
            gross_profit: 15.0,
            turnover_percent: 0.25,
            gross_profit_percent: 33.3,
        }
    }

    #[test]
    fn test_save_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let report = keyed();

        let path = storage.save_report(&report).unwrap();
        assert!(path.ends_with("REITZ/2025/REITZ_20250716_daily.json"));

        let loaded: KeyedReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_save_metadata_lists_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let diagnostics = vec![Diagnostic::SectionNotFound {
            section: Section::DispensarySummary,
        }];

        let path = storage
            .save_report_metadata(&keyed(), Path::new("reitz_20250716_body.htm"), &diagnostics)
            .unwrap();
        let meta: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(meta["report_date"], "2025-07-16");
        assert_eq!(meta["diagnostics"][0]["kind"], "section_not_found");
        assert_eq!(meta["diagnostics"][0]["section"], "DispensarySummary");
        assert_eq!(
            meta["diagnostic_messages"][0],
            "DISPENSARY SUMMARY table not found"
        );
    }

    #[test]
    fn test_stock_csv_has_import_header() {
        let mut buffer = Vec::new();
        write_stock_csv(&[stock_line()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("DepartmentCode,StockCode,Description,OnHand,SalesQty,SalesValue,SalesCost,GrossProfit,TurnoverPercent,GrossProfitPercent")
        );
        assert_eq!(
            lines.next(),
            Some("123456,ABC-001,\"Paracetamol, 500mg\",10.0,5.0,45.0,30.0,15.0,0.25,33.3")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_stock_csv_still_has_header() {
        let mut buffer = Vec::new();
        write_stock_csv(&[], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "DepartmentCode,StockCode,Description,OnHand,SalesQty,SalesValue,SalesCost,GrossProfit,TurnoverPercent,GrossProfitPercent\n"
        );
    }

    #[test]
    fn test_header_matches_record_serialization() {
        let mut buffer = Vec::new();
        write_stock_csv(&[stock_line()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().next(), Some(STOCK_CSV_HEADER.join(",").as_str()));
    }

    #[test]
    fn test_save_stock_lines() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let path = storage.save_stock_lines(&[stock_line()], "stock.csv").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 2);
    }
}
