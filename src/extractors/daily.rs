// src/extractors/daily.rs

// --- Imports ---
use crate::extractors::assembler::{assemble, SectionResults};
use crate::extractors::dom::{locate_section, DocumentTree, HtmlDocument, TreeNode};
use crate::extractors::normalize::{normalize_amount, normalize_int};
use crate::extractors::rows::{RowClassifier, RowKind, RowLayout, DESCRIPTION_TODAY_MONTH};
use crate::report::models::{
    BasketMetrics, CashUpReconciliation, Diagnostic, DispensarySummary, ParsedReport, SalesSummary,
    Section, StockTradingAccount, TurnoverSummary,
};
use crate::report::source::decode_html;
use crate::utils::error::ExtractError;

// --- Label Rules ---

/// How a row label is compared with a rule's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    /// The rule label appears somewhere in the row label.
    Contains,
}

/// Maps one row label to the fields it fills.
pub struct LabelRule<F> {
    pub label: &'static str,
    pub mode: MatchMode,
    pub apply: F,
}

impl<F> LabelRule<F> {
    pub fn matches(&self, label: &str) -> bool {
        match self.mode {
            MatchMode::Exact => label == self.label,
            MatchMode::Contains => label.contains(self.label),
        }
    }
}

/// Rule that reads from the row's cell texts.
pub type RowRule<T> = LabelRule<fn(&mut T, &[String])>;

/// Rule for a basket row; receives the already-normalized value.
pub type BasketRule = LabelRule<fn(&mut BasketMetrics, f64)>;

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

// Sales rows are Label | Trans | Value | Trans (month) | Value (month)
macro_rules! sales_rule {
    ($label:literal, $mode:ident, $trans:ident, $value:ident) => {
        RowRule::<SalesSummary> {
            label: $label,
            mode: MatchMode::$mode,
            apply: |s, cells| {
                s.$trans = normalize_int(cell(cells, 1));
                s.$value = normalize_amount(cell(cells, 2));
            },
        }
    };
}

// Order matters: the first matching rule wins.
static SALES_RULES: [RowRule<SalesSummary>; 11] = [
    sales_rule!("cash sales", Exact, cash_sales_trans_today, cash_sales_today),
    sales_rule!("c.o.d payments", Exact, cod_payments_trans_today, cod_payments_today),
    sales_rule!("receipt on account", Exact, receipt_on_account_trans_today, receipt_on_account_today),
    sales_rule!("sub-total:", Contains, subtotal_trans_today, subtotal_today),
    sales_rule!("less: paid-outs", Exact, paid_outs_trans_today, paid_outs_today),
    sales_rule!("less: cash refunds", Exact, cash_refunds_trans_today, cash_refunds_today),
    sales_rule!("total:", Exact, sales_total_trans_today, sales_total_today),
    sales_rule!("account sales", Exact, account_sales_trans_today, account_sales_today),
    sales_rule!("c.o.d sales", Exact, cod_sales_trans_today, cod_sales_today),
    sales_rule!("less: account refunds", Exact, account_refunds_trans_today, account_refunds_today),
    sales_rule!("total pos turnover:", Contains, pos_turnover_trans_today, pos_turnover_today),
];

static BASKET_RULES: [BasketRule; 2] = [
    BasketRule {
        label: "average number of items per basket",
        mode: MatchMode::Contains,
        apply: |b, v| b.avg_items_per_basket = v,
    },
    BasketRule {
        label: "average value per docket/basket",
        mode: MatchMode::Contains,
        apply: |b, v| b.avg_value_per_basket = v,
    },
];

// Cash-up rows carry today's value in the third cell
static CASH_UP_RULES: [RowRule<CashUpReconciliation>; 3] = [
    RowRule::<CashUpReconciliation> {
        label: "cash tenders",
        mode: MatchMode::Exact,
        apply: |c, cells| c.cash_tenders_today = normalize_amount(cell(cells, 2)),
    },
    RowRule::<CashUpReconciliation> {
        label: "credit card tenders",
        mode: MatchMode::Exact,
        apply: |c, cells| c.credit_card_tenders_today = normalize_amount(cell(cells, 2)),
    },
    RowRule::<CashUpReconciliation> {
        label: "total banked",
        mode: MatchMode::Contains,
        apply: |c, cells| c.total_banked_today = normalize_amount(cell(cells, 2)),
    },
];

// Description | Today | This Month sections: today's value is the second cell
macro_rules! today_rule {
    ($section:ty, $label:literal, $field:ident) => {
        RowRule::<$section> {
            label: $label,
            mode: MatchMode::Exact,
            apply: |s, cells| s.$field = normalize_amount(cell(cells, 1)),
        }
    };
}

static STOCK_TRADING_RULES: [RowRule<StockTradingAccount>; 8] = [
    today_rule!(StockTradingAccount, "total sales of stock", stock_sales_today),
    today_rule!(StockTradingAccount, "purchases", stock_purchases_today),
    today_rule!(StockTradingAccount, "adjustments", stock_adjustments_today),
    today_rule!(StockTradingAccount, "cost of sales", cost_of_sales_today),
    today_rule!(
        StockTradingAccount,
        "gross profit (r) from trading of stock items",
        stock_gross_profit_today
    ),
    today_rule!(
        StockTradingAccount,
        "gross profit (%) from trading of stock items",
        stock_gross_profit_percent_today
    ),
    today_rule!(
        StockTradingAccount,
        "opening stock (@ cost at the beginning of the month)",
        opening_stock_today
    ),
    today_rule!(StockTradingAccount, "closing stock valued at cost now", closing_stock_today),
];

static DISPENSARY_RULES: [RowRule<DispensarySummary>; 6] = [
    today_rule!(DispensarySummary, "dispensary turnover/revenue", dispensary_turnover_today),
    RowRule::<DispensarySummary> {
        label: "number of scripts dispensed",
        mode: MatchMode::Exact,
        apply: |d, cells| d.scripts_dispensed_today = normalize_int(cell(cells, 1)) as f64,
    },
    today_rule!(DispensarySummary, "average value of a script", avg_script_value_today),
    today_rule!(DispensarySummary, "average number of items per script", avg_items_per_script_today),
    today_rule!(DispensarySummary, "average gross value of an item", avg_item_gross_value_today),
    // The vendor splits this label over a line break, so the stripped text has no space
    today_rule!(DispensarySummary, "outstandinglevies", outstanding_levies_today),
];

static TURNOVER_RULES: [RowRule<TurnoverSummary>; 4] = [
    today_rule!(TurnoverSummary, "retail sales (excl.)", retail_sales_today),
    today_rule!(TurnoverSummary, "type r sales (sales @ cost - excl.)", type_r_sales_today),
    today_rule!(TurnoverSummary, "capitation sales (excl.)", capitation_sales_today),
    today_rule!(TurnoverSummary, "total turnover (excl.)", total_turnover_today),
];

/// Applies the first rule matching `label`. Returns false when no rule matches.
fn apply_rules<T>(rules: &[RowRule<T>], target: &mut T, label: &str, cells: &[String]) -> bool {
    match rules.iter().find(|rule| rule.matches(label)) {
        Some(rule) => {
            (rule.apply)(target, cells);
            true
        }
        None => false,
    }
}

// --- Row Layouts ---

const SALES_LAYOUT: RowLayout = RowLayout {
    header: None,
    min_cells: 2,
};
const SALES_MIN_CELLS: usize = 3;

const CASH_UP_LAYOUT: RowLayout = RowLayout {
    header: None,
    min_cells: 3,
};

const SUMMARY_LAYOUT: RowLayout = RowLayout {
    header: Some(DESCRIPTION_TODAY_MONTH),
    min_cells: 2,
};

// --- Main Extractor Structure ---

/// Extracts the canonical daily record from a point-of-sale HTML report.
pub struct DailyReportExtractor {
    default_encoding: String,
}

impl DailyReportExtractor {
    /// `default_encoding` is used for documents that do not declare a charset.
    pub fn new(default_encoding: impl Into<String>) -> Self {
        Self {
            default_encoding: default_encoding.into(),
        }
    }

    /// Decodes and parses raw report bytes. Decoding is the only step that can fail.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedReport, ExtractError> {
        let html = self.decode(bytes)?;
        Ok(self.parse_html(&html))
    }

    /// Decodes report bytes with their declared charset, falling back to the configured default.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        decode_html(bytes, &self.default_encoding)
    }

    pub fn parse_html(&self, html_content: &str) -> ParsedReport {
        let document = HtmlDocument::parse(html_content);
        self.extract(&document)
    }

    /// Runs every section extraction independently and assembles the record.
    pub fn extract<D: DocumentTree>(&self, document: &D) -> ParsedReport {
        let mut diagnostics = Vec::new();

        let results = SectionResults {
            sales: extract_sales(document, &mut diagnostics),
            cash_up: walk_section(
                document,
                Section::CashUpReconciliation,
                CASH_UP_LAYOUT,
                &mut diagnostics,
                |cash_up, _, texts| {
                    apply_rules(&CASH_UP_RULES, cash_up, &row_label(texts), texts);
                },
            ),
            stock_trading: walk_section(
                document,
                Section::StockTradingAccount,
                SUMMARY_LAYOUT,
                &mut diagnostics,
                |stock, _, texts| {
                    apply_rules(&STOCK_TRADING_RULES, stock, &row_label(texts), texts);
                },
            ),
            dispensary: walk_section(
                document,
                Section::DispensarySummary,
                SUMMARY_LAYOUT,
                &mut diagnostics,
                |dispensary, _, texts| {
                    let label = row_label(texts);
                    if !apply_rules(&DISPENSARY_RULES, dispensary, &label, texts) {
                        tracing::trace!("DISPENSARY SUMMARY - ignoring row '{}'", label);
                    }
                },
            ),
            turnover: walk_section(
                document,
                Section::TurnoverSummary,
                SUMMARY_LAYOUT,
                &mut diagnostics,
                |turnover, _, texts| {
                    let label = row_label(texts);
                    if !apply_rules(&TURNOVER_RULES, turnover, &label, texts) {
                        tracing::trace!("TURNOVER SUMMARY - ignoring row '{}'", label);
                    }
                },
            ),
        };

        tracing::info!(
            "HTML parsing complete: {} of {} sections found",
            Section::ALL.len() - missing_sections(&diagnostics),
            Section::ALL.len()
        );
        assemble(results, diagnostics)
    }
}

impl Default for DailyReportExtractor {
    fn default() -> Self {
        Self::new(crate::utils::config::DEFAULT_HTML_ENCODING)
    }
}

fn missing_sections(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::SectionNotFound { .. }))
        .count()
}

fn row_label(texts: &[String]) -> String {
    cell(texts, 0).trim().to_lowercase()
}

/// Locates `section`, classifies its rows and hands every data row to `on_data_row`.
///
/// Returns `None` (and records a diagnostic) when the section is absent.
fn walk_section<'d, D, T, F>(
    document: &'d D,
    section: Section,
    layout: RowLayout,
    diagnostics: &mut Vec<Diagnostic>,
    mut on_data_row: F,
) -> Option<T>
where
    D: DocumentTree,
    T: Default,
    F: FnMut(&mut T, &[D::Node<'d>], &[String]),
{
    let Some(table) = locate_section(document, section.heading()) else {
        tracing::warn!("{} table not found.", section);
        diagnostics.push(Diagnostic::SectionNotFound { section });
        return None;
    };

    let rows = table.descendants_by_tag("tr");
    tracing::debug!("{} - found table, {} rows.", section, rows.len());

    let mut classifier = RowClassifier::new(layout);
    let mut values = T::default();

    for (row_index, row) in rows.iter().enumerate() {
        let cells = row.descendants_by_tag("td");
        match classifier.classify(row_index, &cells) {
            RowKind::Data => {
                let texts: Vec<String> = cells.iter().map(|c| c.stripped_text()).collect();
                tracing::trace!("{} - row {} | {:?}", section, row_index, texts);
                on_data_row(&mut values, &cells, &texts);
            }
            kind => tracing::trace!("{} - skipping row {} ({:?})", section, row_index, kind),
        }
    }

    if classifier.header_missing() {
        tracing::warn!("{} table found but its column-header row never appeared.", section);
        diagnostics.push(Diagnostic::HeaderNotFound { section });
    }

    Some(values)
}

/// SALES SUMMARY carries the basket rows, whose value sits in the next cell when the
/// label is merged over two columns and in the second-following cell otherwise.
fn extract_sales<D: DocumentTree>(
    document: &D,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<(SalesSummary, BasketMetrics)> {
    walk_section(
        document,
        Section::SalesSummary,
        SALES_LAYOUT,
        diagnostics,
        |(sales, basket): &mut (SalesSummary, BasketMetrics), cells, texts| {
            let label = row_label(texts);

            if let Some(rule) = BASKET_RULES.iter().find(|rule| rule.matches(&label)) {
                let value_index = match cells.first() {
                    Some(lead) if lead.column_span() > 1 => 1,
                    _ => 2,
                };
                match texts.get(value_index) {
                    Some(value) => (rule.apply)(basket, normalize_amount(value)),
                    None => tracing::debug!("SALES SUMMARY - basket row '{}' has no value cell", label),
                }
                return;
            }

            if texts.len() >= SALES_MIN_CELLS {
                apply_rules(&SALES_RULES, sales, &label, texts);
            }
        },
    )
}
