//! Read-only query handle over a rendered DOM snapshot.
//!
//! Every lookup takes a prioritized selector chain: the first selector that
//! matches wins, and a miss yields an empty value instead of an error.

use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::content_transform::html_cleaning::{parse_selector, parse_selectors, remove_elements_from_html};
use crate::utils::normalize_whitespace;

/// Elements stripped from every captured HTML region
pub const UNSAFE_CONTENT: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line in [`render_text`]
pub(crate) const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parse a full document (rendered page)
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parse an HTML fragment (stored content region)
    #[must_use]
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    #[must_use]
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// First element matching the chain, trying selectors in order
    #[must_use]
    pub fn select_first(&self, chain: &[&str]) -> Option<ElementRef<'_>> {
        select_first_in(&self.root(), chain)
    }

    #[must_use]
    pub fn first_text(&self, chain: &[&str]) -> String {
        scoped_text(&self.root(), chain)
    }

    #[must_use]
    pub fn first_attr(&self, chain: &[&str], attr: &str) -> String {
        scoped_attr(&self.root(), chain, attr)
    }

    /// Content of `<title>`
    #[must_use]
    pub fn document_title(&self) -> String {
        self.first_text(&["head > title", "title"])
    }

    /// `content` of the first `<meta>` whose `name` or `property` is in `names`
    #[must_use]
    pub fn meta_content(&self, names: &[&str]) -> String {
        let Some(selector) = parse_selector("meta[content]") else {
            return String::new();
        };
        for name in names {
            let found = self.html.select(&selector).find(|meta| {
                let el = meta.value();
                el.attr("name").or_else(|| el.attr("property")) == Some(*name)
            });
            if let Some(meta) = found {
                let content = meta.value().attr("content").unwrap_or_default().trim();
                if !content.is_empty() {
                    return content.to_string();
                }
            }
        }
        String::new()
    }
}

#[must_use]
pub fn select_first_in<'a>(scope: &ElementRef<'a>, chain: &[&str]) -> Option<ElementRef<'a>> {
    chain
        .iter()
        .filter_map(|s| parse_selector(s))
        .find_map(|sel| scope.select(&sel).next())
}

#[must_use]
pub fn select_all_in<'a>(scope: &ElementRef<'a>, chain: &[&str]) -> Vec<ElementRef<'a>> {
    for sel in chain.iter().filter_map(|s| parse_selector(s)) {
        let found: Vec<_> = scope.select(&sel).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Whitespace-normalised text of the first non-empty match within `scope`
#[must_use]
pub fn scoped_text(scope: &ElementRef, chain: &[&str]) -> String {
    for sel in chain.iter().filter_map(|s| parse_selector(s)) {
        for el in scope.select(&sel) {
            let text = element_text(&el);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Trimmed attribute of the first match within `scope` that carries it
#[must_use]
pub fn scoped_attr(scope: &ElementRef, chain: &[&str], attr: &str) -> String {
    for sel in chain.iter().filter_map(|s| parse_selector(s)) {
        for el in scope.select(&sel) {
            if let Some(value) = el.value().attr(attr).map(str::trim)
                && !value.is_empty()
            {
                return value.to_string();
            }
        }
    }
    String::new()
}

#[must_use]
pub fn element_text(el: &ElementRef) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

#[must_use]
pub fn sanitized_inner_html(el: &ElementRef) -> String {
    remove_elements_from_html(el, &parse_selectors(UNSAFE_CONTENT))
        .trim()
        .to_string()
}

/// Plain-text rendering that keeps block structure as line breaks.
///
/// Runs of whitespace inside a line collapse to one space; empty lines are
/// dropped.
#[must_use]
pub fn render_text(el: &ElementRef) -> String {
    let mut raw = String::new();
    for child in el.children() {
        collect_text(child, &mut raw, 0);
    }

    raw.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(node: ego_tree::NodeRef<'_, Node>, out: &mut String, depth: usize) {
    if depth > 100 {
        return;
    }
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(elem) => {
            let name = elem.name();
            if UNSAFE_CONTENT.contains(&name) {
                return;
            }
            if name == "br" {
                out.push('\n');
                return;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                collect_text(child, out, depth + 1);
            }
            if block {
                out.push('\n');
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
            <title>Spring Gala | Example Foundation</title>
            <meta name="description" content="  Annual gala recap ">
            <meta property="og:image" content="https://example.org/gala.jpg">
        </head><body>
            <article>
                <h1 class="entry-title">  Spring   Gala </h1>
                <div class="entry-content"><p>Hello <b>world</b></p><script>track()</script></div>
                <time datetime="2024-03-01">March 1</time>
            </article>
        </body></html>
    "#;

    #[test]
    fn test_fallback_chain_order() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.first_text(&[".missing", "h1.entry-title", "h1"]), "Spring Gala");
        assert_eq!(doc.first_text(&[".missing", ".also-missing"]), "");
        assert_eq!(doc.first_attr(&["time[datetime]"], "datetime"), "2024-03-01");
    }

    #[test]
    fn test_inner_html_drops_scripts() {
        let doc = HtmlDocument::parse(PAGE);
        let content = doc.select_first(&[".entry-content"]).expect("content region");
        assert_eq!(sanitized_inner_html(&content), "<p>Hello <b>world</b></p>");
    }

    #[test]
    fn test_meta_and_title() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.document_title(), "Spring Gala | Example Foundation");
        assert_eq!(doc.meta_content(&["description"]), "Annual gala recap");
        assert_eq!(
            doc.meta_content(&["twitter:image", "og:image"]),
            "https://example.org/gala.jpg"
        );
    }

    #[test]
    fn test_render_text_keeps_blocks() {
        let doc = HtmlDocument::parse_fragment(
            "<div><p>Amount: $500</p><p>Deadline:<br>  April 2</p><ul><li>One</li><li>Two</li></ul></div>",
        );
        assert_eq!(
            render_text(&doc.root()),
            "Amount: $500\nDeadline:\nApril 2\nOne\nTwo"
        );
    }
}
