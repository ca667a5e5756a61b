// src/utils/config.rs
use crate::extractors::stock::{StockLineFilter, DEFAULT_STORE_NAME};

/// Encoding the vendors declare for their HTML reports; used when a document declares none.
pub const DEFAULT_HTML_ENCODING: &str = "windows-1252";

/// Environment variable overriding [`DEFAULT_HTML_ENCODING`].
pub const ENCODING_ENV_VAR: &str = "REPORT_DEFAULT_ENCODING";

/// Environment variable naming the store printed in stock export page headers.
pub const STORE_NAME_ENV_VAR: &str = "STOCK_REPORT_STORE_NAME";

/// Settings shared by both extraction paths.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub default_encoding: String,
    pub store_name: String,
}

impl ExtractorConfig {
    /// Resolves settings: explicit values first, then environment variables, then defaults.
    pub fn resolve(encoding: Option<String>, store_name: Option<String>) -> Self {
        let default_encoding = encoding
            .or_else(|| std::env::var(ENCODING_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_HTML_ENCODING.to_string());
        let store_name = store_name
            .or_else(|| std::env::var(STORE_NAME_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string());

        tracing::debug!(
            "Using default encoding '{}' and store name '{}'",
            default_encoding,
            store_name
        );
        Self {
            default_encoding,
            store_name,
        }
    }

    pub fn stock_filter(&self) -> StockLineFilter {
        StockLineFilter::new(&self.store_name)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            default_encoding: DEFAULT_HTML_ENCODING.to_string(),
            store_name: DEFAULT_STORE_NAME.to_string(),
        }
    }
}
