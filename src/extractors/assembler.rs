// src/extractors/assembler.rs
use crate::report::models::{
    BasketMetrics, CanonicalDailyReport, CashUpReconciliation, Diagnostic, DispensarySummary,
    ParsedReport, SalesSummary, StockTradingAccount, TurnoverSummary,
};

/// What each section extraction produced; `None` for sections that were not found.
#[derive(Debug, Clone, Default)]
pub struct SectionResults {
    pub sales: Option<(SalesSummary, BasketMetrics)>,
    pub cash_up: Option<CashUpReconciliation>,
    pub stock_trading: Option<StockTradingAccount>,
    pub dispensary: Option<DispensarySummary>,
    pub turnover: Option<TurnoverSummary>,
}

/// Builds the canonical record from the all-default shape, overwriting only the
/// domains whose section was extracted.
pub fn assemble(results: SectionResults, diagnostics: Vec<Diagnostic>) -> ParsedReport {
    let mut record = CanonicalDailyReport::default();

    if let Some((sales, basket)) = results.sales {
        record.sales = sales;
        record.basket = basket;
    }
    if let Some(cash_up) = results.cash_up {
        record.cash_up = cash_up;
    }
    if let Some(stock_trading) = results.stock_trading {
        record.stock_trading = stock_trading;
    }
    if let Some(dispensary) = results.dispensary {
        record.dispensary = dispensary;
    }
    if let Some(turnover) = results.turnover {
        record.turnover = turnover;
    }

    ParsedReport {
        record,
        diagnostics,
    }
}
