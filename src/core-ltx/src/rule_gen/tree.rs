//! Filtered page hierarchy for one language.

use crate::content::{PageContext, PageId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub page: PageId,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// The node and all its descendants, depth first.
    pub fn flatten(&self) -> Vec<PageId> {
        let mut out = vec![self.page];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

/// Pages that are not listed at all, regardless of configuration: footers, error pages, `noindex`.
pub fn is_excluded_page_type(ctx: &PageContext<'_>, id: PageId) -> bool {
    let name = ctx.page(id).name.to_lowercase();
    name.contains("footer") || name.contains("404") || ctx.properties(id).noindex()
}

/// Why a page (and its subtree) is left out of the index tree, if it is.
fn skip_reason(ctx: &PageContext<'_>, id: PageId) -> Option<&'static str> {
    if ctx.is_shortcut(id) {
        Some("shortcut")
    } else if !ctx.is_accessible(id) {
        Some("not accessible")
    } else if is_excluded_page_type(ctx, id) {
        Some("excluded page type")
    } else if !ctx.exists(id) {
        Some("no variant in language")
    } else if ctx.properties(id).include_in_optional() {
        Some("listed under optional")
    } else {
        None
    }
}

/// Ordered forest below `root`. Root-level children sit at depth 1; nothing deeper than `max_depth` is kept.
/// With `include_root` the forest is the root itself (depth 0) holding that subtree.
pub fn build_tree(ctx: &PageContext<'_>, root: PageId, max_depth: usize, include_root: bool) -> Vec<TreeNode> {
    if include_root {
        if let Some(reason) = skip_reason(ctx, root) {
            tracing::debug!("[page: {}] root skipped: {}", ctx.page(root).identifier, reason);
            return Vec::new();
        }
        return vec![TreeNode {
            page: root,
            children: build_children(ctx, root, 1, max_depth),
        }];
    }
    build_children(ctx, root, 1, max_depth)
}

fn build_children(ctx: &PageContext<'_>, parent: PageId, depth: usize, max_depth: usize) -> Vec<TreeNode> {
    if depth > max_depth {
        return Vec::new();
    }
    ctx.page(parent)
        .children
        .iter()
        .filter_map(|&child| match skip_reason(ctx, child) {
            Some(reason) => {
                tracing::debug!("[page: {}] skipped: {}", ctx.page(child).identifier, reason);
                None
            }
            None => Some(TreeNode {
                page: child,
                children: build_children(ctx, child, depth + 1, max_depth),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentTree, NodeTypes, PageSpec, PropertyBag, keys};
    use crate::i18n::LanguageDimension;

    fn en(spec: PageSpec) -> PageSpec {
        spec.variant("en", PropertyBag::new())
    }

    fn tree() -> ContentTree {
        ContentTree::from(
            en(PageSpec::new("root", "home", "Homepage"))
                .child(en(PageSpec::new("f", "features", "Page")).child(
                    en(PageSpec::new("a", "a", "Page")).child(en(PageSpec::new("deep", "deep", "Page"))),
                ))
                .child(en(PageSpec::new("legal", "legal", "Page").hidden()).child(en(PageSpec::new("t", "terms", "Page"))))
                .child(en(PageSpec::new("s", "docs-link", "Shortcut")))
                .child(en(PageSpec::new("foot", "footer", "Page")).child(en(PageSpec::new("imp", "imprint", "Page"))))
                .child(en(PageSpec::new("e404", "page-404", "Page")))
                .child(PageSpec::new("noidx", "private", "Page").variant("en", PropertyBag::new().with(keys::NOINDEX, true)))
                .child(PageSpec::new("opt", "changelog", "Page").variant("en", PropertyBag::new().with(keys::INCLUDE_IN_OPTIONAL, "1")))
                .child(PageSpec::new("de-only", "nur-deutsch", "Page").variant("de", PropertyBag::new()))
                .child(en(PageSpec::new("gone", "gone", "Page").removed())),
        )
    }

    fn identifiers(tree: &ContentTree, forest: &[TreeNode]) -> Vec<String> {
        forest
            .iter()
            .flat_map(TreeNode::flatten)
            .map(|id| tree.page(id).identifier.clone())
            .collect()
    }

    #[test]
    fn test_filters_and_skips_subtrees() {
        let tree = tree();
        let types = NodeTypes::default();
        let lang = LanguageDimension::new("en");
        let ctx = PageContext::new(&tree, &types, &lang);
        let forest = build_tree(&ctx, tree.root(), 5, false);
        assert_eq!(identifiers(&tree, &forest), vec!["f", "a", "deep"]);
    }

    #[test]
    fn test_max_depth() {
        let tree = tree();
        let types = NodeTypes::default();
        let lang = LanguageDimension::new("en");
        let ctx = PageContext::new(&tree, &types, &lang);
        assert_eq!(identifiers(&tree, &build_tree(&ctx, tree.root(), 2, false)), vec!["f", "a"]);
        assert_eq!(identifiers(&tree, &build_tree(&ctx, tree.root(), 0, false)), Vec::<String>::new());
    }

    #[test]
    fn test_include_root() {
        let tree = tree();
        let types = NodeTypes::default();
        let lang = LanguageDimension::new("en");
        let ctx = PageContext::new(&tree, &types, &lang);
        let forest = build_tree(&ctx, tree.root(), 1, true);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].page, tree.root());
        assert_eq!(identifiers(&tree, &forest), vec!["root", "f"]);
    }

    #[test]
    fn test_language_without_variants() {
        let tree = tree();
        let types = NodeTypes::default();
        let lang = LanguageDimension::new("de");
        let ctx = PageContext::new(&tree, &types, &lang);
        assert!(build_tree(&ctx, tree.root(), 5, true).is_empty());
        assert_eq!(identifiers(&tree, &build_tree(&ctx, tree.root(), 5, false)), vec!["de-only"]);
    }
}
