// src/report/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counts and values from the SALES SUMMARY table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub cash_sales_today: f64,
    pub cash_sales_trans_today: i64,
    pub cod_payments_today: f64,
    pub cod_payments_trans_today: i64,
    pub receipt_on_account_today: f64,
    pub receipt_on_account_trans_today: i64,
    pub subtotal_today: f64,
    pub subtotal_trans_today: i64,
    pub paid_outs_today: f64,
    pub paid_outs_trans_today: i64,
    pub cash_refunds_today: f64,
    pub cash_refunds_trans_today: i64,
    pub sales_total_today: f64,
    pub sales_total_trans_today: i64,
    pub account_sales_today: f64,
    pub account_sales_trans_today: i64,
    pub cod_sales_today: f64,
    pub cod_sales_trans_today: i64,
    pub account_refunds_today: f64,
    pub account_refunds_trans_today: i64,
    pub pos_turnover_today: f64,
    pub pos_turnover_trans_today: i64,
}

/// Basket averages, printed at the bottom of the SALES SUMMARY table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketMetrics {
    pub avg_items_per_basket: f64,
    pub avg_value_per_basket: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashUpReconciliation {
    pub cash_tenders_today: f64,
    pub credit_card_tenders_today: f64,
    pub total_banked_today: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockTradingAccount {
    pub stock_sales_today: f64,
    pub stock_purchases_today: f64,
    pub stock_adjustments_today: f64,
    pub cost_of_sales_today: f64,
    pub stock_gross_profit_today: f64,
    pub stock_gross_profit_percent_today: f64,
    pub opening_stock_today: f64,
    pub closing_stock_today: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispensarySummary {
    pub dispensary_turnover_today: f64,
    /// A count, kept as a float to match the persisted column.
    pub scripts_dispensed_today: f64,
    pub avg_script_value_today: f64,
    pub avg_items_per_script_today: f64,
    pub avg_item_gross_value_today: f64,
    pub outstanding_levies_today: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnoverSummary {
    pub retail_sales_today: f64,
    pub type_r_sales_today: f64,
    pub capitation_sales_today: f64,
    pub total_turnover_today: f64,
}

/// The fully shaped record produced from one daily HTML report.
///
/// Every field always exists; sections missing from the source keep their zero defaults.
/// Serializes flat, one key per persisted column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDailyReport {
    #[serde(flatten)]
    pub sales: SalesSummary,
    #[serde(flatten)]
    pub basket: BasketMetrics,
    #[serde(flatten)]
    pub cash_up: CashUpReconciliation,
    #[serde(flatten)]
    pub stock_trading: StockTradingAccount,
    #[serde(flatten)]
    pub dispensary: DispensarySummary,
    #[serde(flatten)]
    pub turnover: TurnoverSummary,
}

/// One product line of a stock-movement PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StockLineRecord {
    pub department_code: String,
    pub stock_code: String,
    pub description: String,
    pub on_hand: f64,
    pub sales_qty: f64,
    pub sales_value: f64,
    pub sales_cost: f64,
    pub gross_profit: f64,
    pub turnover_percent: f64,
    pub gross_profit_percent: f64,
}

impl StockLineRecord {
    /// True when the line recorded any sales in the period.
    pub fn has_movement(&self) -> bool {
        self.sales_qty > 0.0
    }
}

/// The named sections of a daily report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    SalesSummary,
    CashUpReconciliation,
    StockTradingAccount,
    DispensarySummary,
    TurnoverSummary,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::SalesSummary,
        Section::CashUpReconciliation,
        Section::StockTradingAccount,
        Section::DispensarySummary,
        Section::TurnoverSummary,
    ];

    /// The heading text that anchors the section in the HTML report.
    pub fn heading(&self) -> &'static str {
        match self {
            Section::SalesSummary => "SALES SUMMARY",
            Section::CashUpReconciliation => "CASH-UP RECONCILIATION",
            Section::StockTradingAccount => "STOCK TRADING ACCOUNT",
            Section::DispensarySummary => "DISPENSARY SUMMARY",
            Section::TurnoverSummary => "TURNOVER SUMMARY",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Non-fatal findings from a daily report parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The section heading was not found; its fields kept their defaults.
    SectionNotFound { section: Section },
    /// The section was found but its column-header row never appeared.
    HeaderNotFound { section: Section },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SectionNotFound { section } => write!(f, "{} table not found", section),
            Diagnostic::HeaderNotFound { section } => {
                write!(f, "{} table has no column-header row", section)
            }
        }
    }
}

/// Result of parsing one daily HTML report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub record: CanonicalDailyReport,
    pub diagnostics: Vec<Diagnostic>,
}

/// Identifies which pharmacy and day a report belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub pharmacy_code: String,
    pub report_date: NaiveDate,
}

/// A canonical record paired with its key, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedReport {
    #[serde(flatten)]
    pub key: ReportKey,
    #[serde(flatten)]
    pub record: CanonicalDailyReport,
}

/// Stock line records plus what happened to every input line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockExtraction {
    pub records: Vec<StockLineRecord>,
    pub lines_seen: usize,
    /// Header, footer, subtotal and divider lines.
    pub lines_filtered: usize,
    /// Candidate lines that did not fit the fixed column pattern.
    pub lines_unmatched: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_serializes_every_column() {
        let value = serde_json::to_value(CanonicalDailyReport::default()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 22 + 2 + 3 + 8 + 6 + 4);
        assert_eq!(object["cash_sales_trans_today"], serde_json::json!(0));
        assert_eq!(object["scripts_dispensed_today"], serde_json::json!(0.0));
        assert_eq!(object["total_turnover_today"], serde_json::json!(0.0));
    }

    #[test]
    fn test_keyed_report_is_flat() {
        let keyed = KeyedReport {
            key: ReportKey {
                pharmacy_code: "reitz".into(),
                report_date: NaiveDate::from_ymd_opt(2025, 7, 16).unwrap(),
            },
            record: CanonicalDailyReport::default(),
        };
        let value = serde_json::to_value(&keyed).unwrap();
        assert_eq!(value["pharmacy_code"], "reitz");
        assert_eq!(value["report_date"], "2025-07-16");
        assert_eq!(value["cash_tenders_today"], serde_json::json!(0.0));
    }

    #[test]
    fn test_stock_line_uses_import_column_names() {
        let record = StockLineRecord {
            department_code: "123456".into(),
            stock_code: "ABC-001".into(),
            description: "Paracetamol".into(),
            on_hand: 1.0,
            sales_qty: 0.0,
            sales_value: 0.0,
            sales_cost: 0.0,
            gross_profit: 0.0,
            turnover_percent: 0.0,
            gross_profit_percent: 0.0,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["DepartmentCode"], "123456");
        assert_eq!(value["GrossProfitPercent"], serde_json::json!(0.0));
        assert!(!record.has_movement());
    }
}
