//! Plain-text extraction from the HTML stored in content block properties.

use scraper::{Html, Node};

use crate::content::ContentBlock;

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table", "blockquote", "pre",
    "section", "article", "hr",
];

/// Elements whose text is never content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Removes markup, decodes entities and collapses whitespace. Block elements become line breaks.
///
/// ```
/// # use core_ltx::rule_gen::strip_html;
/// assert_eq!(strip_html("<p>Hello <b>world</b></p><p>Bye</p>"), "Hello world\nBye");
/// ```
pub fn strip_html(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return collapse_lines(html);
    }

    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    for node in fragment.tree.root().descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => text.push('\n'),
            Node::Text(t) => {
                let skipped = node
                    .ancestors()
                    .filter_map(|a| a.value().as_element())
                    .any(|e| SKIPPED_ELEMENTS.contains(&e.name()));
                if !skipped {
                    text.push_str(t);
                }
            }
            _ => {}
        }
    }
    collapse_lines(&text)
}

/// Whitespace-normalized, non-empty lines joined with `\n`.
fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body text of a page: `title` and `text` of every block, depth first, one paragraph each.
pub fn extract_body(blocks: &[ContentBlock]) -> String {
    let mut paragraphs = Vec::new();
    collect_paragraphs(blocks, &mut paragraphs);
    paragraphs.join("\n\n")
}

fn collect_paragraphs(blocks: &[ContentBlock], out: &mut Vec<String>) {
    for block in blocks {
        for raw in [block.properties.title(), block.properties.text()].into_iter().flatten() {
            let paragraph = strip_html(raw);
            if !paragraph.is_empty() {
                out.push(paragraph);
            }
        }
        collect_paragraphs(&block.children, out);
    }
}
