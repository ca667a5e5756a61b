// src/extractors/mod.rs
pub mod assembler;
pub mod daily;
pub mod dom;
pub mod normalize;
pub mod rows;
pub mod stock;

// Re-export key extraction types for convenience
pub use daily::DailyReportExtractor;
pub use dom::{locate_section, DocumentTree, HtmlDocument, TreeNode};
pub use normalize::{normalize_amount, normalize_int};
pub use stock::{parse_stock_line, StockLineFilter, StockReportExtractor};
