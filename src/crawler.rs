use scraper::{ElementRef, Html, Node};

use crate::error::ExtractorError;

pub const ROW_MARKER: &str = "1";
pub const PRIMARY_SUFFIX: &str = ".htm";

pub fn find_primary_document_name(html: &[u8]) -> Result<String, ExtractorError> {
    let text = String::from_utf8_lossy(html);
    let document = Html::parse_document(&text);

    for table in collect_tables(&document) {
        let Some(row) = find_marker_row(table) else {
            continue;
        };
        // The first marked row decides; later tables are not consulted.
        return first_text(row, is_primary_name)
            .map(str::to_string)
            .ok_or_else(|| {
                ExtractorError::NotFound(format!(
                    "row marked {ROW_MARKER} has no {PRIMARY_SUFFIX} document"
                ))
            });
    }

    Err(ExtractorError::NotFound(
        "no table on the index page marks a primary document".to_string(),
    ))
}

fn collect_tables(document: &Html) -> Vec<ElementRef<'_>> {
    let mut tables = Vec::new();
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "table" {
                tables.push(element);
            }
        }
        stack.extend(node.children().rev());
    }
    tables
}

fn find_marker_row(table: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut stack = vec![*table];
    while let Some(node) = stack.pop() {
        if let Node::Text(text) = node.value() {
            if &**text == ROW_MARKER {
                return node
                    .parent()
                    .and_then(|parent| parent.parent())
                    .and_then(ElementRef::wrap);
            }
        }
        stack.extend(node.children().rev());
    }
    None
}

fn first_text<'a>(root: ElementRef<'a>, matches: fn(&str) -> bool) -> Option<&'a str> {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if let Node::Text(text) = node.value() {
            let text: &'a str = text;
            if matches(text) {
                return Some(text);
            }
        }
        stack.extend(node.children().rev());
    }
    None
}

fn is_primary_name(text: &str) -> bool {
    text.len() > PRIMARY_SUFFIX.len() && text.ends_with(PRIMARY_SUFFIX)
}
