//! Label-driven recovery over a parsed body fragment.
//!
//! Every bold label (`<strong>`/`<b>`) is indexed once; each field then has
//! its own recovery rule over the indexed tree. Blocks that carry a label
//! only as plain `Label:` text are handled in a second pass, so bold labels
//! win when both exist.

use std::collections::HashMap;

use ego_tree::NodeId;
use ego_tree::iter::Edge;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use super::labels::{FieldLabel, after_last_occurrence, leading_label, scrub_trailing_labels, split_at_labels, split_list};
use super::{ParsedFields, Renewable};
use crate::content_transform::html_cleaning::parse_selector;
use crate::page_extractor::dom::{BLOCK_ELEMENTS, UNSAFE_CONTENT, element_text, render_text};
use crate::utils::normalize_whitespace;

const EMPHASIS: &str = "strong, b";

/// Containers that own a label's same-paragraph text
const LABEL_BLOCKS: &[&str] = &[
    "p", "li", "dd", "dt", "td", "div", "section", "h2", "h3", "h4", "h5", "h6", "blockquote",
];

/// Blocks scanned for plain-text `Label:` markers
const PLAIN_LABEL_BLOCKS: &str = "p, dd, td, h2, h3, h4, h5, h6";

const WRAPPERS: &[&str] = &["div", "section", "article", "main"];

/// Bold label elements of one fragment, keyed by node
struct LabelIndex {
    labels: Vec<(NodeId, FieldLabel)>,
    by_id: HashMap<NodeId, FieldLabel>,
}

impl LabelIndex {
    fn build(root: &ElementRef) -> Self {
        let mut labels = Vec::new();
        if let Some(selector) = parse_selector(EMPHASIS) {
            for el in root.select(&selector) {
                if let Some(label) = FieldLabel::from_text(&element_text(&el)) {
                    labels.push((el.id(), label));
                }
            }
        }
        let by_id = labels.iter().copied().collect();
        Self { labels, by_id }
    }

    fn is_label(&self, id: NodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// First bold label inside (or equal to) `el`
    fn first_within(&self, el: &ElementRef) -> Option<(NodeId, FieldLabel)> {
        el.descendants()
            .find_map(|node| self.by_id.get(&node.id()).map(|label| (node.id(), *label)))
    }
}

/// Recover every field from `body_html`; missing fields stay empty
#[must_use]
pub fn recover_fields(body_html: &str) -> ParsedFields {
    let fragment = Html::parse_fragment(body_html);
    let root = fragment.root_element();
    let index = LabelIndex::build(&root);

    let mut fields = ParsedFields {
        description: extract_description(&content_root(root, &index), &index),
        ..ParsedFields::default()
    };

    for (id, label) in &index.labels {
        let Some(el) = fragment.tree.get(*id).and_then(ElementRef::wrap) else {
            continue;
        };
        recover_bold_label(&el, *label, &index, &mut fields);
    }
    // Plain markers trailing a bold label's value, once every bold label has had its turn
    for (id, label) in &index.labels {
        if let Some(el) = fragment.tree.get(*id).and_then(ElementRef::wrap) {
            recover_trailing_plain_labels(&el, *label, &index, &mut fields);
        }
    }

    recover_plain_labels(&root, &index, &mut fields);
    fields
}

/// Descend through lone wrapper elements to the real content container
fn content_root<'a>(root: ElementRef<'a>, index: &LabelIndex) -> ElementRef<'a> {
    let mut current = root;
    loop {
        let mut elements = current.children().filter_map(ElementRef::wrap);
        let (Some(only), None) = (elements.next(), elements.next()) else {
            return current;
        };
        let has_loose_text = current
            .children()
            .any(|child| child.value().as_text().is_some_and(|t| !t.trim().is_empty()));
        if has_loose_text || !WRAPPERS.contains(&only.value().name()) || index.is_label(only.id()) {
            return current;
        }
        current = only;
    }
}

/// Text of top-level nodes up to the first node that carries a label.
///
/// Prose that precedes the label inside that node is kept as the tail of
/// the description.
fn extract_description(container: &ElementRef, index: &LabelIndex) -> String {
    let mut parts = Vec::new();

    for child in container.children() {
        match child.value() {
            Node::Text(text) => {
                let text = normalize_whitespace(text);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            Node::Element(elem) if !UNSAFE_CONTENT.contains(&elem.name()) => {
                let Some(el) = ElementRef::wrap(child) else {
                    continue;
                };

                if let Some((label_id, _)) = index.first_within(&el) {
                    let prefix = text_before(&el, label_id);
                    if !prefix.is_empty() {
                        parts.push(prefix);
                    }
                    break;
                }

                let text = render_text(&el);
                let segments = split_at_labels(&text);
                if segments.iter().any(|(label, _)| label.is_some()) {
                    if let Some((None, prefix)) = segments.first()
                        && !prefix.is_empty()
                    {
                        parts.push(prefix.clone());
                    }
                    break;
                }
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            _ => {}
        }
    }

    parts.join("\n\n")
}

fn recover_bold_label(el: &ElementRef, label: FieldLabel, index: &LabelIndex, fields: &mut ParsedFields) {
    match label {
        FieldLabel::Eligibility | FieldLabel::Requirements => {
            if slot_list(fields, label).is_empty() {
                let items = match following_list(el, index) {
                    Some(list) => list_items(&list),
                    None => split_list(&same_block_text(el, label, index)),
                };
                *slot_list(fields, label) = items;
            }
        }
        FieldLabel::Amount | FieldLabel::Deadline => {
            if slot_text(fields, label).is_empty() {
                *slot_text(fields, label) = scalar_value(el, label, index);
            }
        }
        FieldLabel::Renewable => {
            if fields.renewable.details.is_empty() {
                fields.renewable = Renewable::from_text(&scalar_value(el, label, index));
            }
        }
        FieldLabel::Apply => {
            if fields.apply_url.is_empty() {
                fields.apply_url = link_after(el);
            }
        }
    }
}

fn slot_list(fields: &mut ParsedFields, label: FieldLabel) -> &mut Vec<String> {
    if label == FieldLabel::Requirements {
        &mut fields.requirements
    } else {
        &mut fields.eligibility
    }
}

fn slot_text(fields: &mut ParsedFields, label: FieldLabel) -> &mut String {
    if label == FieldLabel::Deadline {
        &mut fields.deadline
    } else {
        &mut fields.amount
    }
}

/// Same-paragraph text, else the next paragraph unless another label owns it
fn scalar_value(el: &ElementRef, label: FieldLabel, index: &LabelIndex) -> String {
    let same = normalize_whitespace(&same_block_text(el, label, index));
    if !same.is_empty() {
        return same;
    }

    let Some(next) = next_block(&label_block(el)) else {
        return String::new();
    };
    if matches!(next.value().name(), "ul" | "ol") {
        return String::new();
    }

    let text = normalize_whitespace(&render_text(&next));
    let leading = index
        .first_within(&next)
        .filter(|(id, _)| starts_with_node(&next, *id))
        .map(|(_, found)| found)
        .or_else(|| leading_label(&text));

    match leading {
        Some(other) if other != label => String::new(),
        _ => owned_segment(&text, label),
    }
}

/// Text after `el` inside its block, cut at the next label
fn same_block_text(el: &ElementRef, label: FieldLabel, index: &LabelIndex) -> String {
    owned_segment(&text_after_label(el, index), label)
}

/// Raw block text between `el` and the next bold label
fn text_after_label(el: &ElementRef, index: &LabelIndex) -> String {
    let block = label_block(el);
    let mut sink = TextSink::default();
    let mut after = false;

    for edge in block.traverse() {
        match &edge {
            Edge::Close(node) if node.id() == el.id() => {
                after = true;
                continue;
            }
            Edge::Open(node) if after && index.is_label(node.id()) => break,
            _ => {}
        }
        if after {
            sink.feed(&edge);
        }
    }

    let text = sink.finish();
    text.trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

/// Hand plain `Label:` segments that follow a bold label's value to their own fields
fn recover_trailing_plain_labels(
    el: &ElementRef,
    label: FieldLabel,
    index: &LabelIndex,
    fields: &mut ParsedFields,
) {
    let block = label_block(el);
    for (found, value) in split_at_labels(&text_after_label(el, index)).into_iter().skip(1) {
        if let Some(found) = found
            && found != label
        {
            assign_plain_label(found, &owned_segment(&value, found), &block, index, fields);
        }
    }
}

/// The part of `text` that belongs to `label`, scrubbed of leaked labels.
///
/// Text led by a different label belongs to that label and yields `""`.
fn owned_segment(text: &str, label: FieldLabel) -> String {
    let text = if label == FieldLabel::Deadline {
        after_last_occurrence(text, label)
    } else {
        text.to_string()
    };

    let segment = match split_at_labels(&text).into_iter().next() {
        Some((None, segment)) => segment,
        Some((Some(found), segment)) if found == label => segment,
        Some(_) => String::new(),
        None => String::new(),
    };
    scrub_trailing_labels(&segment)
}

/// Nearest following list: siblings first, then the parent's siblings, and
/// so on up the tree. A sibling that starts another field stops the search.
fn following_list<'a>(el: &ElementRef<'a>, index: &LabelIndex) -> Option<ElementRef<'a>> {
    let mut node = **el;
    loop {
        for sibling in node.next_siblings() {
            let Some(sibling) = ElementRef::wrap(sibling) else {
                continue;
            };
            if matches!(sibling.value().name(), "ul" | "ol") {
                return Some(sibling);
            }
            if index.first_within(&sibling).is_some() || leading_label(&render_text(&sibling)).is_some() {
                return None;
            }
            if let Some(selector) = parse_selector("ul, ol")
                && let Some(list) = sibling.select(&selector).next()
            {
                return Some(list);
            }
        }
        node = node.parent()?;
    }
}

fn list_items(list: &ElementRef) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(|li| scrub_trailing_labels(&element_text(&li)))
        .filter(|item| !item.is_empty())
        .collect()
}

/// First link after the label in its block, else in the next block
fn link_after(el: &ElementRef) -> String {
    let block = label_block(el);
    let mut after = false;
    for edge in block.traverse() {
        match edge {
            Edge::Close(node) if node.id() == el.id() => after = true,
            Edge::Open(node) if after => {
                if let Some(href) = node
                    .value()
                    .as_element()
                    .filter(|e| e.name() == "a")
                    .and_then(|e| e.attr("href"))
                {
                    return href.trim().to_string();
                }
            }
            _ => {}
        }
    }

    next_block(&block)
        .and_then(|next| {
            parse_selector("a[href]")
                .and_then(|sel| next.select(&sel).next())
                .and_then(|a| a.value().attr("href").map(|h| h.trim().to_string()))
        })
        .unwrap_or_default()
}

/// Second pass over blocks that carry labels as plain `Label:` text
fn recover_plain_labels(root: &ElementRef, index: &LabelIndex, fields: &mut ParsedFields) {
    let Some(selector) = parse_selector(PLAIN_LABEL_BLOCKS) else {
        return;
    };

    for block in root.select(&selector) {
        if index.first_within(&block).is_some() {
            continue;
        }
        let text = render_text(&block);
        for (label, value) in split_at_labels(&text) {
            let Some(label) = label else {
                continue;
            };
            assign_plain_label(label, &owned_segment(&value, label), &block, index, fields);
        }
    }
}

/// Store a plain-text label's value unless the field is already filled
fn assign_plain_label(
    label: FieldLabel,
    value: &str,
    block: &ElementRef,
    index: &LabelIndex,
    fields: &mut ParsedFields,
) {
    match label {
        FieldLabel::Eligibility | FieldLabel::Requirements => {
            if slot_list(fields, label).is_empty() {
                let items = if value.is_empty() {
                    following_list(block, index)
                        .map(|list| list_items(&list))
                        .unwrap_or_default()
                } else {
                    split_list(value)
                };
                *slot_list(fields, label) = items;
            }
        }
        FieldLabel::Amount | FieldLabel::Deadline => {
            if slot_text(fields, label).is_empty() {
                *slot_text(fields, label) = normalize_whitespace(value);
            }
        }
        FieldLabel::Renewable => {
            if fields.renewable.details.is_empty() {
                fields.renewable = Renewable::from_text(&normalize_whitespace(value));
            }
        }
        FieldLabel::Apply => {
            if fields.apply_url.is_empty()
                && let Some(sel) = parse_selector("a[href]")
                && let Some(a) = block.select(&sel).next()
            {
                fields.apply_url = a.value().attr("href").unwrap_or_default().trim().to_string();
            }
        }
    }
}

/// Nearest block-level ancestor of a label
fn label_block<'a>(el: &ElementRef<'a>) -> ElementRef<'a> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| LABEL_BLOCKS.contains(&ancestor.value().name()))
        .or_else(|| el.parent().and_then(ElementRef::wrap))
        .unwrap_or(*el)
}

fn next_block<'a>(block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    block.next_siblings().find_map(ElementRef::wrap)
}

/// Nothing but whitespace precedes node `id` inside `el`
fn starts_with_node(el: &ElementRef, id: NodeId) -> bool {
    for node in el.descendants() {
        if node.id() == id {
            return true;
        }
        if node.value().as_text().is_some_and(|t| !t.trim().is_empty()) {
            return false;
        }
    }
    false
}

/// Block-aware text of `el` up to node `stop`
fn text_before(el: &ElementRef, stop: NodeId) -> String {
    let mut sink = TextSink::default();
    for edge in el.traverse() {
        if let Edge::Open(node) = &edge
            && node.id() == stop
        {
            break;
        }
        sink.feed(&edge);
    }
    sink.finish()
}

/// Accumulates text from traversal edges with block elements as line breaks
#[derive(Default)]
struct TextSink {
    out: String,
    skipping: Option<NodeId>,
}

impl TextSink {
    fn feed(&mut self, edge: &Edge<'_, Node>) {
        match edge {
            Edge::Open(node) => {
                if self.skipping.is_some() {
                    return;
                }
                match node.value() {
                    Node::Text(text) => self.out.push_str(text),
                    Node::Element(elem) => {
                        let name = elem.name();
                        if UNSAFE_CONTENT.contains(&name) {
                            self.skipping = Some(node.id());
                        } else if name == "br" || BLOCK_ELEMENTS.contains(&name) {
                            self.out.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if self.skipping == Some(node.id()) {
                    self.skipping = None;
                    return;
                }
                if self.skipping.is_none()
                    && let Node::Element(elem) = node.value()
                    && BLOCK_ELEMENTS.contains(&elem.name())
                {
                    self.out.push('\n');
                }
            }
        }
    }

    fn finish(self) -> String {
        self.out
            .lines()
            .map(normalize_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_paragraph_fallback() {
        let fields = recover_fields("<p><strong>Amount:</strong></p><p>$750 per semester</p>");
        assert_eq!(fields.amount, "$750 per semester");
    }

    #[test]
    fn test_next_paragraph_owned_by_other_label_is_ignored() {
        let fields = recover_fields(
            "<p><strong>Amount:</strong></p><p><strong>Deadline:</strong> June 5</p>",
        );
        assert_eq!(fields.amount, "");
        assert_eq!(fields.deadline, "June 5");
    }

    #[test]
    fn test_labels_sharing_a_paragraph_split() {
        let fields = recover_fields(
            "<p><strong>Amount:</strong> $500 <strong>Deadline:</strong> April 1</p>",
        );
        assert_eq!(fields.amount, "$500");
        assert_eq!(fields.deadline, "April 1");
    }

    #[test]
    fn test_plain_label_after_bold_value_keeps_both() {
        let fields = recover_fields("<p><strong>Amount:</strong> $500 Deadline: May 1</p>");
        assert_eq!(fields.amount, "$500");
        assert_eq!(fields.deadline, "May 1");
    }

    #[test]
    fn test_bold_label_wins_over_trailing_plain_marker() {
        let fields = recover_fields(
            "<p><strong>Amount:</strong> $500 Deadline: May 1</p><p><strong>Deadline:</strong> June 30</p>",
        );
        assert_eq!(fields.amount, "$500");
        assert_eq!(fields.deadline, "June 30");
    }

    #[test]
    fn test_deadline_takes_last_occurrence() {
        let fields = recover_fields("<p><strong>Deadline:</strong> Deadline: March 15</p>");
        assert_eq!(fields.deadline, "March 15");
    }

    #[test]
    fn test_colon_outside_emphasis() {
        let fields = recover_fields("<p><b>Amount</b>: $2,000</p>");
        assert_eq!(fields.amount, "$2,000");
    }

    #[test]
    fn test_plain_text_labels() {
        let fields = recover_fields(
            "<p>Supports nursing students.</p><p>Amount: $300</p><p>Eligibility:</p><ul><li>Nursing major</li></ul>",
        );
        assert_eq!(fields.description, "Supports nursing students.");
        assert_eq!(fields.amount, "$300");
        assert_eq!(fields.eligibility, vec!["Nursing major"]);
    }

    #[test]
    fn test_apply_link_and_wrapped_content() {
        let fields = recover_fields(
            r#"<div class="entry-content"><p>About the fund.</p>
               <p><strong>How to Apply:</strong> <a href="/apply/fund">Apply online</a></p></div>"#,
        );
        assert_eq!(fields.description, "About the fund.");
        assert_eq!(fields.apply_url, "/apply/fund");
    }

    #[test]
    fn test_no_labels_is_all_description() {
        let fields = recover_fields("<p>One.</p><p>Two.</p>");
        assert_eq!(fields.description, "One.\n\nTwo.");
        assert!(fields.eligibility.is_empty());
        assert_eq!(fields.amount, "");
    }
}
