// src/extractors/rows.rs

use crate::extractors::dom::TreeNode;

/// Column captions that open the data part of the summary tables.
pub const DESCRIPTION_TODAY_MONTH: &[&str] = &["description", "today", "this month"];

/// Where a section parse stands with respect to its column-header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    Seeking,
    Unlocked,
}

/// What a single table row turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// No cells at all.
    Empty,
    /// Merged title cell at the top of the table.
    Title,
    /// The column-header row; the classifier unlocks on it.
    Header,
    /// Anything before the header row.
    Preamble,
    /// Unlocked but with fewer cells than the section needs.
    Short,
    Data,
}

/// Row layout rules for one report section.
#[derive(Debug, Clone, Copy)]
pub struct RowLayout {
    /// Lower-case captions that unlock the section; `None` means unlocked from the first row.
    pub header: Option<&'static [&'static str]>,
    pub min_cells: usize,
}

/// Per-section `Seeking -> Unlocked` state machine.
#[derive(Debug)]
pub struct RowClassifier {
    layout: RowLayout,
    state: ClassifierState,
}

impl RowClassifier {
    pub fn new(layout: RowLayout) -> Self {
        let state = match layout.header {
            Some(_) => ClassifierState::Seeking,
            None => ClassifierState::Unlocked,
        };
        Self { layout, state }
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    /// True when the section ended without ever seeing its header row.
    pub fn header_missing(&self) -> bool {
        self.state == ClassifierState::Seeking
    }

    /// Classifies the row at `row_index` (position among all rows of the table).
    pub fn classify<N: TreeNode>(&mut self, row_index: usize, cells: &[N]) -> RowKind {
        let Some(lead) = cells.first() else {
            return RowKind::Empty;
        };

        match self.state {
            ClassifierState::Seeking => {
                if row_index == 0 && lead.column_span() > 1 {
                    return RowKind::Title;
                }
                if self.is_header(cells) {
                    self.state = ClassifierState::Unlocked;
                    return RowKind::Header;
                }
                RowKind::Preamble
            }
            ClassifierState::Unlocked => {
                if cells.len() < self.layout.min_cells {
                    RowKind::Short
                } else {
                    RowKind::Data
                }
            }
        }
    }

    fn is_header<N: TreeNode>(&self, cells: &[N]) -> bool {
        let Some(expected) = self.layout.header else {
            return false;
        };
        cells.len() >= expected.len()
            && cells
                .iter()
                .zip(expected)
                .all(|(cell, caption)| cell.stripped_text().to_lowercase() == *caption)
    }
}
