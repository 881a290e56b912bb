//! Markdown rendering of a page forest into categorized link lists.

use super::categorizer::Categorizer;
use super::text_utils::{escape_link_text, heading, single_line};
use super::tree::TreeNode;
use crate::content::{PageContext, PageId};

/// Looks up the absolute URL of a page. `None` renders the page as plain text.
pub type UrlLookup<'a> = dyn Fn(PageId) -> Option<String> + 'a;

/// `- [title](url): description`, or the bare title when there is no URL.
pub fn link_line(ctx: &PageContext<'_>, id: PageId, url: Option<&str>) -> String {
    let title = escape_link_text(ctx.title(id));
    let mut line = match url {
        Some(url) => format!("[{}]({})", title, url),
        None => title,
    };
    if let Some(description) = ctx.description(id) {
        line.push_str(": ");
        line.push_str(&single_line(description));
    }
    line
}

struct Bucket<'t> {
    key: String,
    entries: Vec<(PageId, &'t [TreeNode])>,
}

/// Renders `forest` as one section per bucket.
///
/// Home pages (root or homepage-typed) go to "Main Pages", which always comes first; their children
/// are bucketed as if they were top-level entries. Other buckets appear in order of first use.
/// Buckets are kept apart by category key, so two categories sharing a label still get two sections.
/// Each entry lists its direct children as a nested list; deeper levels are not shown.
pub fn render_tree(
    ctx: &PageContext<'_>,
    forest: &[TreeNode],
    heading_level: usize,
    categorizer: &Categorizer,
    url_of: &UrlLookup<'_>,
) -> String {
    let language = &ctx.language.id;
    let mut main = Bucket {
        key: "main_pages".to_string(),
        entries: Vec::new(),
    };
    let mut buckets: Vec<Bucket<'_>> = Vec::new();

    let mut pending: Vec<&TreeNode> = forest.iter().rev().collect();
    while let Some(node) = pending.pop() {
        if ctx.is_root_or_homepage(node.page) {
            main.entries.push((node.page, &[]));
            pending.extend(node.children.iter().rev());
            continue;
        }
        let key = categorizer.category_key(ctx, node.page);
        tracing::debug!("[page: {}] category '{}'", ctx.page(node.page).identifier, key);
        let entry = (node.page, node.children.as_slice());
        match buckets.iter_mut().find(|b| b.key == key) {
            Some(bucket) => bucket.entries.push(entry),
            None => buckets.push(Bucket {
                key: key.to_string(),
                entries: vec![entry],
            }),
        }
    }

    let mut out = String::new();
    for bucket in std::iter::once(&main).chain(buckets.iter()) {
        if bucket.entries.is_empty() {
            continue;
        }
        let title = categorizer.translator().translate(&bucket.key, language);
        out.push_str(&heading(heading_level, &title));
        out.push_str("\n\n");
        for (page, children) in &bucket.entries {
            out.push_str(&format!("- {}\n", link_line(ctx, *page, url_of(*page).as_deref())));
            for child in children.iter() {
                let url = url_of(child.page);
                out.push_str(&format!("  - {}\n", link_line(ctx, child.page, url.as_deref())));
            }
        }
        out.push('\n');
    }
    out
}
