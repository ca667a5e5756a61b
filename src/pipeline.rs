// src/pipeline.rs
use crate::extractors::daily::DailyReportExtractor;
use crate::report::models::{KeyedReport, ParsedReport, ReportKey};
use crate::utils::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct DailyOutcome {
    pub path: PathBuf,
    pub result: Result<ParsedDocument, AppError>,
}

/// A parsed report with its key and the decoded HTML (kept for debug annotation).
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub keyed: KeyedReport,
    pub parsed: ParsedReport,
    pub html: String,
}

/// Reads, decodes and parses one report file.
///
/// The key comes from `key_override` when given, otherwise from the file name.
pub fn parse_daily_file(
    extractor: &DailyReportExtractor,
    path: &Path,
    key_override: Option<&ReportKey>,
) -> Result<ParsedDocument, AppError> {
    let key = match key_override {
        Some(key) => key.clone(),
        None => ReportKey::from_file_name(path)?,
    };

    let bytes = std::fs::read(path)?;
    tracing::info!(
        "Parsing {} ({} bytes) for {} on {}",
        path.display(),
        bytes.len(),
        key.pharmacy_code,
        key.report_date
    );

    let html = extractor.decode(&bytes)?;
    let parsed = extractor.parse_html(&html);

    Ok(ParsedDocument {
        keyed: KeyedReport {
            key,
            record: parsed.record.clone(),
        },
        parsed,
        html,
    })
}

/// Parses every file concurrently on blocking workers. Outcomes keep the input order.
pub async fn parse_daily_files(
    extractor: Arc<DailyReportExtractor>,
    paths: Vec<PathBuf>,
    key_override: Option<ReportKey>,
) -> Vec<DailyOutcome> {
    let key_override = key_override.map(Arc::new);
    let mut tasks = JoinSet::new();

    for (index, path) in paths.iter().cloned().enumerate() {
        let extractor = Arc::clone(&extractor);
        let key_override = key_override.clone();
        tasks.spawn_blocking(move || {
            let result = parse_daily_file(&extractor, &path, key_override.as_deref());
            (index, DailyOutcome { path, result })
        });
    }

    let mut outcomes: Vec<Option<DailyOutcome>> = paths.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => tracing::error!("Parse worker failed: {}", e),
        }
    }

    outcomes
        .into_iter()
        .zip(paths)
        .map(|(outcome, path)| {
            outcome.unwrap_or_else(|| DailyOutcome {
                path,
                result: Err(AppError::Processing("parse worker did not complete".to_string())),
            })
        })
        .collect()
}
