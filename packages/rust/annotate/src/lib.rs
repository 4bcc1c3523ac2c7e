//! Styled-markup to semantic-annotation conversion.
//!
//! The upstream transliteration pages mark pronunciation features with
//! presentation tags: `<span class="heavy">`, `<span title="Long Vowel">`,
//! `<u>`, nested `<font>` wrappers. This crate flattens that styling into a
//! compact annotation format (`<heavy>Qa</heavy>af`) where the tag names the
//! phonetic feature instead of a CSS class.
//!
//! The converter is a pure function over a tagged [`Node`] tree; it performs
//! no I/O and holds no state, so it is testable with fragment literals.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Whitespace runs collapse to a single space in the final output.
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A DOM-like fragment node: either a text leaf or a tagged element.
///
/// Matched exhaustively in the converter — there is no duck typing and no
/// fallthrough on node shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A text leaf, appended verbatim (before whitespace normalization).
    Text(String),
    /// A tagged element with optional `class`/`title` attributes.
    Element {
        tag: String,
        class: Option<String>,
        title: Option<String>,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Element {
            tag: tag.into(),
            class: None,
            title: None,
            children,
        }
    }

    pub fn with_class(mut self, value: impl Into<String>) -> Self {
        if let Self::Element { class, .. } = &mut self {
            *class = Some(value.into());
        }
        self
    }

    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        if let Self::Element { title, .. } = &mut self {
            *title = Some(value.into());
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Tags that contribute nothing to the annotation output.
const EXCLUDED_TAGS: [&str; 3] = ["audio", "a", "img"];

/// Convert a fragment tree into a semantic annotation string.
///
/// Depth-first, left-to-right. Styling spans are leaves for annotation
/// purposes: their content is the flattened text, never a nested annotation.
/// The result has whitespace runs collapsed and is trimmed; empty input
/// yields an empty string.
pub fn annotate(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render(node, &mut out);
    }
    trace!(raw_len = out.len(), "annotation rendered");
    WHITESPACE.replace_all(&out, " ").trim().to_string()
}

fn render(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Element {
            tag,
            class,
            title,
            children,
        } => match tag.as_str() {
            "span" => {
                let content = flat_text(children);
                if let Some(class) = class {
                    wrap(out, class, &content);
                } else if let Some(title) = title {
                    let sanitized: String =
                        title.chars().filter(|c| !c.is_whitespace()).collect();
                    wrap(out, &sanitized, &content);
                } else {
                    out.push_str(&content);
                }
            }
            "u" => {
                // Class annotation takes precedence over underline semantics.
                if let Some((class, content)) = first_classed_span(children) {
                    wrap(out, class, &content);
                } else {
                    wrap(out, "u", &flat_text(children));
                }
            }
            tag if EXCLUDED_TAGS.contains(&tag) => {}
            // `font` and any other generic container are transparent.
            _ => {
                for child in children {
                    render(child, out);
                }
            }
        },
    }
}

fn wrap(out: &mut String, tag: &str, content: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(content);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Flatten a subtree to its text content, skipping excluded elements.
fn flat_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    collect_text(nodes, &mut text);
    text
}

fn collect_text(nodes: &[Node], text: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => text.push_str(t),
            Node::Element { tag, children, .. } => {
                if !EXCLUDED_TAGS.contains(&tag.as_str()) {
                    collect_text(children, text);
                }
            }
        }
    }
}

/// Find the first descendant span carrying a class, depth-first, and return
/// its class together with its flattened text.
fn first_classed_span(nodes: &[Node]) -> Option<(&str, String)> {
    for node in nodes {
        if let Node::Element {
            tag,
            class,
            children,
            ..
        } = node
        {
            if tag == "span" {
                if let Some(class) = class {
                    return Some((class.as_str(), flat_text(children)));
                }
            }
            if let Some(found) = first_classed_span(children) {
                return Some(found);
            }
        }
    }
    None
}
