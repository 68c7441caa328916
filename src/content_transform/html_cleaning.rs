//! DOM removal and serialisation over scraper trees.
//!
//! Elements are never detached from the tree. Callers collect the
//! [`NodeId`]s to drop and serialise the tree while skipping them, which
//! keeps the pass O(n) and leaves the parsed document untouched.

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use log::{debug, warn};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Maximum nesting depth serialised; deeper branches are truncated.
const MAX_HTML_NESTING_DEPTH: usize = 100;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements the parser drops outside their table or list context
const CONTEXT_BOUND_ELEMENTS: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Elements whose text content is emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse a selector, logging and skipping invalid ones
#[must_use]
pub fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            debug!(target: "sitemigrate::dom", "Skipping invalid selector '{selector}': {e}");
            None
        }
    }
}

#[must_use]
pub fn parse_selectors(selectors: &[&str]) -> Vec<Selector> {
    selectors.iter().filter_map(|s| parse_selector(s)).collect()
}

/// Collect every descendant of `root` matching any selector
#[must_use]
pub fn collect_removals(root: &ElementRef, selectors: &[Selector]) -> HashSet<NodeId> {
    let mut to_remove = HashSet::new();
    for sel in selectors {
        for elem in root.select(sel) {
            to_remove.insert(elem.id());
        }
    }
    to_remove.remove(&root.id());
    to_remove
}

/// Serialise the children of `element`, skipping removed subtrees
pub fn serialize_children_excluding(
    element: &ElementRef,
    to_remove: &HashSet<NodeId>,
    output: &mut String,
) {
    for child in element.children() {
        serialize_node(child, to_remove, output, 0, false);
    }
}

/// Inner HTML of `element` with every subtree matching `selectors` dropped
#[must_use]
pub fn remove_elements_from_html(element: &ElementRef, selectors: &[Selector]) -> String {
    let to_remove = collect_removals(element, selectors);
    let mut result = String::new();
    serialize_children_excluding(element, &to_remove, &mut result);
    result
}

/// Serialise `element` itself (tags included), skipping removed subtrees
pub fn serialize_outer_excluding(
    element: &ElementRef,
    to_remove: &HashSet<NodeId>,
    output: &mut String,
) {
    serialize_node(**element, to_remove, output, 0, false);
}

/// Serialise a content region so that re-parsing the output as a body
/// fragment finds the same region again.
///
/// Context-bound regions (`td`, `tr`, `li`, ...) are emitted as a `div`
/// carrying the region's `id` and `class`, with children normalised through
/// one parse so table parts inside them collapse the same way every time.
pub fn serialize_region_excluding(
    element: &ElementRef,
    to_remove: &HashSet<NodeId>,
    output: &mut String,
) {
    if !CONTEXT_BOUND_ELEMENTS.contains(&element.value().name()) {
        serialize_outer_excluding(element, to_remove, output);
        return;
    }

    let mut inner = String::new();
    serialize_children_excluding(element, to_remove, &mut inner);
    let normalized = Html::parse_fragment(&inner);

    output.push_str("<div");
    for attr in ["id", "class"] {
        if let Some(value) = element.value().attr(attr) {
            output.push(' ');
            output.push_str(attr);
            output.push_str("=\"");
            html_escape::encode_double_quoted_attribute_to_string(value, output);
            output.push('"');
        }
    }
    output.push('>');
    serialize_children_excluding(&normalized.root_element(), &HashSet::new(), output);
    output.push_str("</div>");
}

fn serialize_node(
    node: NodeRef<'_, Node>,
    to_remove: &HashSet<NodeId>,
    output: &mut String,
    depth: usize,
    raw_text: bool,
) {
    if depth > MAX_HTML_NESTING_DEPTH {
        warn!(
            target: "sitemigrate::dom",
            "Maximum HTML nesting depth {MAX_HTML_NESTING_DEPTH} exceeded, truncating branch"
        );
        return;
    }

    match node.value() {
        Node::Text(text) => {
            if raw_text {
                output.push_str(text);
            } else {
                html_escape::encode_text_to_string(&**text, output);
            }
        }
        Node::Element(elem) => {
            if to_remove.contains(&node.id()) {
                return;
            }

            let name = elem.name();
            output.push('<');
            output.push_str(name);
            for (attr, value) in elem.attrs() {
                output.push(' ');
                output.push_str(attr);
                output.push_str("=\"");
                html_escape::encode_double_quoted_attribute_to_string(value, output);
                output.push('"');
            }
            output.push('>');

            if VOID_ELEMENTS.contains(&name) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&name);
            for child in node.children() {
                serialize_node(child, to_remove, output, depth + 1, raw);
            }

            output.push_str("</");
            output.push_str(name);
            output.push('>');
        }
        Node::Comment(comment) => {
            output.push_str("<!--");
            output.push_str(comment);
            output.push_str("-->");
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                serialize_node(child, to_remove, output, depth + 1, raw_text);
            }
        }
        _ => {}
    }
}
