// src/utils/html_debug.rs
use crate::report::models::{Diagnostic, Section};
use crate::utils::error::StorageError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

// Column captions that unlock the summary tables, highlighted to show where data starts
static HEADER_CAPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)>\s*description\s*<").expect("Failed to compile HEADER_CAPTION_RE")
});

/// Kinds of highlight in an annotated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Heading of a section the locator anchored.
    Located,
    /// Heading text present in the markup but not anchored (not bold, or not inside a table).
    Unanchored,
    /// A column-header caption.
    Caption,
}

impl Highlight {
    fn css_class(&self) -> &'static str {
        match self {
            Highlight::Located => "highlight-located",
            Highlight::Unanchored => "highlight-unanchored",
            Highlight::Caption => "highlight-caption",
        }
    }
}

/// Finds every section heading and header caption in `html`.
///
/// Headings of sections reported missing in `diagnostics` are marked `Unanchored`.
pub fn find_highlights(html: &str, diagnostics: &[Diagnostic]) -> Vec<(usize, usize, Highlight)> {
    let mut highlights = Vec::new();

    for section in Section::ALL {
        let missing = diagnostics.contains(&Diagnostic::SectionNotFound { section });
        let kind = if missing {
            Highlight::Unanchored
        } else {
            Highlight::Located
        };
        for (start, matched) in html.match_indices(section.heading()) {
            highlights.push((start, start + matched.len(), kind));
        }
    }

    for mat in HEADER_CAPTION_RE.find_iter(html) {
        // Highlight only the caption text, not the surrounding tag brackets
        highlights.push((mat.start() + 1, mat.end() - 1, Highlight::Caption));
    }

    highlights.sort_by_key(|h| h.0);
    highlights
}

/// Wraps every highlight in a styled span so the report can be inspected in a browser.
pub fn annotate_html(html: &str, highlights: &[(usize, usize, Highlight)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-located { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-unanchored { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-caption { background-color: #ADD8E6; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    for &(start, end, kind) in highlights {
        // Skip overlaps; highlights are sorted by start
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}\">",
            kind.css_class(),
            start,
            end
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");
        last_pos = end;
    }
    debug_html.push_str(&html[last_pos..]);

    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Writes an annotated copy of a decoded report to `path`.
pub fn create_debug_html(
    html: &str,
    diagnostics: &[Diagnostic],
    path: impl AsRef<Path>,
) -> Result<(), StorageError> {
    let path = path.as_ref();
    let highlights = find_highlights(html, diagnostics);
    fs::write(path, annotate_html(html, &highlights))?;

    tracing::info!(
        "Saved debug HTML with {} highlights to {}",
        highlights.len(),
        path.display()
    );
    Ok(())
}
