// src/report/source.rs
use crate::report::models::ReportKey;
use crate::utils::error::{ExtractError, SourceError};
use chrono::NaiveDate;
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::path::Path;

/// How far into the document to look for a charset declaration.
const CHARSET_SNIFF_LIMIT: usize = 4096;

// Matches both <meta charset=...> and <meta http-equiv=Content-Type content="text/html; charset=...">
static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?\s*([A-Za-z0-9_\-:.]+)"#)
        .expect("Failed to compile META_CHARSET_RE")
});

/// Returns the charset label declared in the document head, if any.
pub fn declared_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)];
    META_CHARSET_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}

/// Decodes an HTML report with the encoding it declares, or `default_label` when it declares none.
///
/// Malformed byte sequences are an error rather than being replaced, so label text never
/// silently stops matching.
pub fn decode_html(bytes: &[u8], default_label: &str) -> Result<String, ExtractError> {
    let label = declared_charset(bytes).unwrap_or_else(|| default_label.to_string());
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ExtractError::UnknownEncoding(label.clone()))?;

    tracing::debug!("Decoding {} bytes as {}", bytes.len(), encoding.name());

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| ExtractError::Decode {
            encoding: encoding.name().to_string(),
        })
}

/// Splits `pdftotext` output into page-ordered lines. Pages are separated by form feeds.
pub fn page_lines(text: &str) -> Vec<String> {
    text.split('\x0c')
        .flat_map(|page| page.lines())
        .map(|line| line.to_string())
        .collect()
}

impl ReportKey {
    pub fn new(pharmacy_code: impl Into<String>, report_date: NaiveDate) -> Self {
        Self {
            pharmacy_code: pharmacy_code.into(),
            report_date,
        }
    }

    /// Derives the key from a saved report name such as `reitz_20250716_body.htm`.
    pub fn from_file_name(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SourceError::InvalidFileName(path.display().to_string()))?;

        let mut parts = name.splitn(3, '_');
        let (Some(pharmacy), Some(date), Some(_rest)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SourceError::InvalidFileName(name.to_string()));
        };
        if pharmacy.is_empty() {
            return Err(SourceError::InvalidFileName(name.to_string()));
        }

        let report_date = NaiveDate::parse_from_str(date, "%Y%m%d")
            .map_err(|_| SourceError::InvalidDate(date.to_string()))?;

        Ok(Self::new(pharmacy, report_date))
    }
}
