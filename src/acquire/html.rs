//! HTML text extraction
//!
//! Text is collected by a depth-first walk that drops whole subtrees which
//! usually hold navigation, boilerplate or invisible text.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose subtrees never contribute text
const SKIPPED_TAGS: &[&str] = &[
    "head", "sup", "header", "footer", "nav", "label", "textarea", "script", "noscript", "style",
];

/// ARIA roles whose subtrees never contribute text
const SKIPPED_ROLES: &[&str] = &["navigation", "contentinfo", "button"];

/// Extracts the visible text of a document
///
/// Each non-blank text node is trimmed and followed by a single space, in
/// document order.
pub fn extract_text(document: &Html) -> String {
    let mut out = String::new();
    collect_text(document.root_element(), &mut out);
    out
}

/// Extracts the first non-empty `<title>`, trimmed
pub fn extract_title(document: &Html) -> String {
    let selector = match Selector::parse("title") {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };

    document
        .select(&selector)
        .filter_map(|title| {
            title.children().find_map(|child| match child.value() {
                Node::Text(text) => Some(text.trim().to_string()),
                _ => None,
            })
        })
        .find(|title| !title.is_empty())
        .unwrap_or_default()
}

fn is_skipped(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if SKIPPED_TAGS.contains(&value.name()) {
        return true;
    }
    matches!(value.attr("role"), Some(role) if SKIPPED_ROLES.contains(&role))
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if is_skipped(&element) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push_str(trimmed);
                    out.push(' ');
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}
