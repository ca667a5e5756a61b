// src/extractors/dom.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
// Elements vendors use to title a report section
static EMPHASIS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("b, strong, h1, h2, h3, h4, h5, h6")
        .expect("Failed to compile EMPHASIS_SELECTOR")
});

// --- Tree Abstraction ---

/// A handle to one element of a parsed report.
///
/// Handles are cheap copies borrowed from their document.
pub trait TreeNode: Copy {
    /// Lower-case tag name, e.g. "table".
    fn tag_name(&self) -> &str;

    fn attr(&self, name: &str) -> Option<&str>;

    /// Every descendant text fragment trimmed and joined with no separator.
    fn stripped_text(&self) -> String;

    fn parent_element(&self) -> Option<Self>;

    /// All descendant elements (not including self) with the given tag, in document order.
    fn descendants_by_tag(&self, tag: &str) -> Vec<Self>;

    /// Number of columns the element spans; 1 when no usable `colspan` is present.
    fn column_span(&self) -> usize {
        self.attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
    }
}

/// Read-only view over a parsed document, independent of the HTML backend.
pub trait DocumentTree {
    type Node<'a>: TreeNode
    where
        Self: 'a;

    /// Bold and heading-like elements, in document order.
    fn emphasis_nodes(&self) -> Vec<Self::Node<'_>>;
}

// --- scraper Backend ---

/// A report parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(html_content: &str) -> Self {
        Self {
            html: Html::parse_document(html_content),
        }
    }
}

impl<'a> TreeNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn stripped_text(&self) -> String {
        self.text().map(str::trim).collect()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn descendants_by_tag(&self, tag: &str) -> Vec<Self> {
        self.descendants()
            .skip(1) // descendants() starts with the element itself
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == tag)
            .collect()
    }
}

impl DocumentTree for HtmlDocument {
    type Node<'a> = ElementRef<'a>;

    fn emphasis_nodes(&self) -> Vec<ElementRef<'_>> {
        self.html.select(&EMPHASIS_SELECTOR).collect()
    }
}

// --- Section Locator ---

/// Finds the table that holds the section titled by `heading`.
///
/// The first emphasis node whose stripped text contains `heading` (case-sensitive) anchors the
/// search; its nearest `table` ancestor is returned. `None` means the section is absent.
pub fn locate_section<'d, D: DocumentTree>(document: &'d D, heading: &str) -> Option<D::Node<'d>> {
    let anchor = document
        .emphasis_nodes()
        .into_iter()
        .find(|node| node.stripped_text().contains(heading))?;

    tracing::trace!("Found heading <{}> for section '{}'", anchor.tag_name(), heading);

    let mut current = anchor.parent_element();
    while let Some(node) = current {
        if node.tag_name() == "table" {
            return Some(node);
        }
        current = node.parent_element();
    }

    tracing::debug!("Heading '{}' found but it is not inside a table", heading);
    None
}
