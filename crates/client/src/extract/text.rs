//! Visible-text helpers over a parsed document.

use scraper::{ElementRef, Node};

/// Whether an element name is in the strip list.
fn is_stripped(name: &str, strip: &[String]) -> bool {
    strip.iter().any(|s| s.eq_ignore_ascii_case(name))
}

/// Whether `element` sits inside (or is) a stripped element.
pub fn inside_stripped(element: ElementRef<'_>, strip: &[String]) -> bool {
    if is_stripped(element.value().name(), strip) {
        return true;
    }
    element
        .ancestors()
        .filter_map(|n| n.value().as_element())
        .any(|e| is_stripped(e.name(), strip))
}

/// Visible text under `root`, skipping stripped subtrees.
///
/// Every text node is whitespace-collapsed, empty ones are dropped, and the
/// rest are joined with single spaces in document order.
pub fn visible_text(root: ElementRef<'_>, strip: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut stack = vec![*root];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => parts.extend(text.split_whitespace()),
            Node::Element(el) if is_stripped(el.name(), strip) => {}
            Node::Element(_) => stack.extend(node.children().rev()),
            _ => {}
        }
    }

    parts.join(" ")
}

/// Cut `text` to `max_chars` characters, appending `marker` when cut.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], marker),
        None => text.to_string(),
    }
}
