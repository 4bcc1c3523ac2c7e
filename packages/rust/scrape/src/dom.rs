//! Bridge from parsed HTML to the converter's tagged [`Node`] tree.

use mushaf_annotate::Node;
use scraper::ElementRef;

/// Build the fragment tree for a verse cell, dropping `audio` and `a`
/// subtrees up front — the equivalent of cloning the cell with its player
/// and link children removed before conversion.
pub fn cell_fragment(cell: ElementRef<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in cell.children() {
        convert(child, &mut nodes);
    }
    nodes
}

fn convert(node: ego_tree::NodeRef<'_, scraper::Node>, out: &mut Vec<Node>) {
    match node.value() {
        scraper::Node::Text(text) => out.push(Node::text(text.text.to_string())),
        scraper::Node::Element(element) => {
            let tag = element.name().to_string();
            if tag == "audio" || tag == "a" {
                return;
            }

            let mut children = Vec::new();
            for child in node.children() {
                convert(child, &mut children);
            }

            let mut converted = Node::element(tag, children);
            if let Some(class) = element.attr("class") {
                converted = converted.with_class(class);
            }
            if let Some(title) = element.attr("title") {
                converted = converted.with_title(title);
            }
            out.push(converted);
        }
        // Comments, doctypes, processing instructions: nothing to carry over.
        _ => {}
    }
}
