// tests/extraction.rs
use pharmacy_report_extractor::report::source::page_lines;
use pharmacy_report_extractor::{
    parse_daily_report, parse_stock_lines, CanonicalDailyReport, DailyReportExtractor, Diagnostic,
    ExtractError, Section, StockLineFilter, StockReportExtractor,
};

const DISPENSARY_TABLE: &str = r#"<table>
  <tr><td colspan="3"><b>DISPENSARY SUMMARY</b></td></tr>
  <tr><td>Description</td><td>Today</td><td>This Month</td></tr>
  <tr><td>Number of scripts dispensed</td><td>61</td><td>1,204</td></tr>
  <tr><td>Outstanding<br>Levies</td><td>R15.00</td><td></td></tr>
</table>"#;

/// A daily report as the vendor writes it: windows-1252, with non-breaking spaces
/// (0xA0) as thousand separators in some cells.
fn report(with_dispensary: bool) -> Vec<u8> {
    let html = r#"<html><head>
<meta http-equiv="Content-Type" content="text/html; charset=windows-1252">
<title>Daily Report</title></head><body>
<table>
  <tr><td colspan="5"><b>SALES SUMMARY</b></td></tr>
  <tr><td>Description</td><td>Trans</td><td>Today</td><td>Trans</td><td>This Month</td></tr>
  <tr><td>Cash Sales</td><td>42</td><td>R1,050.00</td><td>900</td><td>R20,000.00</td></tr>
  <tr><td>Less: Paid-Outs</td><td>1</td><td>R50.00-</td><td>1</td><td>R50.00-</td></tr>
  <tr><td>TOTAL:</td><td>43</td><td>R1,000.00</td><td>901</td><td>R19,950.00</td></tr>
  <tr><td>TOTAL POS TURNOVER:</td><td>48</td><td>R1{NBSP}800.00</td><td>970</td><td>R28,950.00</td></tr>
  <tr><td colspan="2">Average number of items per basket</td><td>2.40</td><td colspan="2">2.10</td></tr>
</table>
<table>
  <tr><td colspan="3"><strong>CASH-UP RECONCILIATION</strong></td></tr>
  <tr><td>Cash Tenders</td><td>30</td><td>R900.00</td></tr>
  <tr><td>TOTAL BANKED</td><td></td><td>R1,800.00</td></tr>
</table>
<table>
  <tr><td colspan="3"><b>STOCK TRADING ACCOUNT</b></td></tr>
  <tr><td>Description</td><td>Today</td><td>This Month</td></tr>
  <tr><td>Total sales of stock</td><td>R1{NBSP}800.00</td><td></td></tr>
  <tr><td>Gross profit (%) from trading of stock items</td><td>31.50 %</td><td></td></tr>
</table>
{DISPENSARY}
<table>
  <tr><td colspan="3"><b>TURNOVER SUMMARY</b></td></tr>
  <tr><td>Description</td><td>Today</td><td>This Month</td></tr>
  <tr><td>Total Turnover (Excl.)</td><td>R13,300.00</td><td></td></tr>
</table>
</body></html>"#;

    let html = html.replace(
        "{DISPENSARY}",
        if with_dispensary { DISPENSARY_TABLE } else { "" },
    );
    html.split("{NBSP}")
        .map(|part| part.as_bytes().to_vec())
        .collect::<Vec<_>>()
        .join(&0xA0u8)
}

fn full_report() -> Vec<u8> {
    report(true)
}

#[test]
fn test_full_report_fills_every_section() {
    let parsed = parse_daily_report(&full_report()).unwrap();
    let record = &parsed.record;

    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(record.sales.cash_sales_trans_today, 42);
    assert_eq!(record.sales.cash_sales_today, 1050.0);
    assert_eq!(record.sales.paid_outs_today, -50.0);
    assert_eq!(record.sales.sales_total_today, 1000.0);
    assert_eq!(record.sales.pos_turnover_today, 1800.0);
    assert_eq!(record.basket.avg_items_per_basket, 2.4);
    assert_eq!(record.cash_up.cash_tenders_today, 900.0);
    assert_eq!(record.cash_up.total_banked_today, 1800.0);
    assert_eq!(record.stock_trading.stock_sales_today, 1800.0);
    assert_eq!(record.stock_trading.stock_gross_profit_percent_today, 31.5);
    assert_eq!(record.dispensary.scripts_dispensed_today, 61.0);
    assert_eq!(record.dispensary.outstanding_levies_today, 15.0);
    assert_eq!(record.turnover.total_turnover_today, 13300.0);
}

#[test]
fn test_missing_dispensary_only_defaults_that_section() {
    let full = parse_daily_report(&full_report()).unwrap();
    let partial = parse_daily_report(&report(false)).unwrap();

    assert_eq!(
        partial.record.dispensary,
        CanonicalDailyReport::default().dispensary
    );
    assert_eq!(partial.record.sales, full.record.sales);
    assert_eq!(partial.record.basket, full.record.basket);
    assert_eq!(partial.record.cash_up, full.record.cash_up);
    assert_eq!(partial.record.stock_trading, full.record.stock_trading);
    assert_eq!(partial.record.turnover, full.record.turnover);
    assert_eq!(
        partial.diagnostics,
        vec![Diagnostic::SectionNotFound {
            section: Section::DispensarySummary
        }]
    );
}

#[test]
fn test_single_cash_sales_row() {
    let html = b"<table><tr><td><b>SALES SUMMARY</b></td></tr>\
        <tr><td>Cash Sales</td><td>42</td><td>R1,050.00</td></tr></table>";
    let record = parse_daily_report(html).unwrap().record;

    assert_eq!(record.sales.cash_sales_trans_today, 42);
    assert_eq!(record.sales.cash_sales_today, 1050.0);
}

#[test]
fn test_document_without_sections_is_all_defaults() {
    let parsed = parse_daily_report(b"<html><body><p>No data today</p></body></html>").unwrap();

    assert_eq!(parsed.record, CanonicalDailyReport::default());
    assert_eq!(parsed.diagnostics.len(), Section::ALL.len());
}

#[test]
fn test_undecodable_document_is_an_error() {
    let err = parse_daily_report(b"<meta charset=\"utf-8\"><b>SALES SUMMARY</b>\xff\xfe").unwrap_err();
    assert_eq!(
        err,
        ExtractError::Decode {
            encoding: "UTF-8".to_string()
        }
    );

    let err = DailyReportExtractor::new("no-such-charset")
        .parse_bytes(b"<b>SALES SUMMARY</b>")
        .unwrap_err();
    assert!(matches!(err, ExtractError::UnknownEncoding(_)));
}

#[test]
fn test_parsing_is_idempotent() {
    let bytes = full_report();
    let first = parse_daily_report(&bytes).unwrap();
    let second = parse_daily_report(&bytes).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.record).unwrap(),
        serde_json::to_string(&second.record).unwrap()
    );
}

// --- Stock export ---

const STOCK_PAGES: &str = "REITZ APTEEK                       PAGE: 1\n\
DEPT   CODE     DESCRIPTION         ON HAND  SALES QTY\n\
123456 ABC-001  Paracetamol 500mg  10.000  5.000  45.00  30.00  15.00  0.250  33.300\n\
-------------------------------------------------------\n\
\x0cREITZ APTEEK                       PAGE: 2\n\
654321 XYZ-9    Ibuprofen 200mg  4.000  0.000  0.00  0.00  0.00  0.000  0.000\n\
123456 SUB-DEPT TOTAL  14.000  5.000  45.00  30.00  15.00  0.250  33.300\n\
999999 BAD-1    Short line  1.00  2.00\n";

#[test]
fn test_stock_example_line() {
    let records = parse_stock_lines(&[
        "123456 ABC-001  Paracetamol 500mg  10.000  5.000  45.00  30.00  15.00  0.250  33.300",
    ]);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.department_code, "123456");
    assert_eq!(record.stock_code, "ABC-001");
    assert_eq!(record.description, "Paracetamol 500mg");
    assert_eq!(record.on_hand, 10.0);
    assert_eq!(record.sales_qty, 5.0);
    assert_eq!(record.sales_value, 45.0);
    assert_eq!(record.sales_cost, 30.0);
    assert_eq!(record.gross_profit, 15.0);
    assert_eq!(record.turnover_percent, 0.25);
    assert_eq!(record.gross_profit_percent, 33.3);
}

#[test]
fn test_total_lines_never_emit_records() {
    let records = parse_stock_lines(&[
        "123456 ABC-001  TOTAL  10.000  5.000  45.00  30.00  15.00  0.250  33.300",
        "TOTAL 1.000",
    ]);
    assert!(records.is_empty());
}

#[test]
fn test_stock_pages_end_to_end() {
    let lines = page_lines(STOCK_PAGES);
    let extraction = StockReportExtractor::new(StockLineFilter::default()).extract(&lines);

    let codes: Vec<&str> = extraction
        .records
        .iter()
        .map(|r| r.stock_code.as_str())
        .collect();
    assert_eq!(codes, vec!["ABC-001", "XYZ-9"]);
    assert_eq!(extraction.lines_seen, lines.len());
    assert_eq!(extraction.lines_unmatched, 1);
    assert_eq!(
        extraction.records.iter().filter(|r| r.has_movement()).count(),
        1
    );
}
