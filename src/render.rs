//! Indented textual rendering of elements for reports

use crate::document::Element;

/// Render an element and its subtree starting at column zero
pub fn element_to_string(element: &Element) -> String {
    render_element(element, 0)
}

/// Render an element indented by `indent` tabs
///
/// The opening tag carries the attributes in document order, non-blank text
/// goes on its own line one level deeper, and children follow recursively.
pub fn render_element(element: &Element, indent: usize) -> String {
    let mut lines = Vec::new();
    render_into(element, indent, &mut lines);
    lines.join("\n")
}

fn render_into(element: &Element, indent: usize, lines: &mut Vec<String>) {
    let indentation = "\t".repeat(indent);

    let mut opening = format!("{}<{}", indentation, element.tag);
    for (key, value) in &element.attributes {
        opening.push_str(&format!(" {}=\"{}\"", key, value));
    }
    opening.push('>');
    lines.push(opening);

    let text = element.trimmed_text();
    if !text.is_empty() {
        lines.push(format!("{}\t{}", indentation, text));
    }

    for child in &element.children {
        render_into(child, indent + 1, lines);
    }

    lines.push(format!("{}</{}>", indentation, element.tag));
}
