//! Priority-ordered bucketing of pages into categories (index) and groups (full content).

use std::sync::Arc;

use super::config::BucketConfig;
use super::matcher::matches_any;
use crate::content::{PageContext, PageId};
use crate::i18n::Translator;

/// Buckets are sorted by ascending priority once; ties keep declaration order.
#[derive(Debug, Clone)]
pub struct Categorizer {
    categories: Vec<BucketConfig>,
    default_category: String,
    groups: Vec<BucketConfig>,
    default_group: Option<String>,
    translator: Arc<Translator>,
}

fn sorted(mut buckets: Vec<BucketConfig>) -> Vec<BucketConfig> {
    buckets.sort_by_key(|b| b.priority);
    buckets
}

impl Categorizer {
    pub fn new(
        categories: Vec<BucketConfig>,
        default_category: String,
        groups: Vec<BucketConfig>,
        default_group: Option<String>,
        translator: Arc<Translator>,
    ) -> Self {
        Self {
            categories: sorted(categories),
            default_category,
            groups: sorted(groups),
            default_group,
            translator,
        }
    }

    /// Key of the first matching category, or the default category key.
    pub fn category_key(&self, ctx: &PageContext<'_>, id: PageId) -> &str {
        self.categories
            .iter()
            .find(|c| matches_any(ctx, id, &c.rules))
            .map(|c| c.name.as_str())
            .unwrap_or(self.default_category.as_str())
    }

    /// Translated name of the page's category in the context language.
    pub fn categorize_node(&self, ctx: &PageContext<'_>, id: PageId) -> String {
        let key = self.category_key(ctx, id);
        tracing::debug!("[page: {}] category '{}'", ctx.page(id).identifier, key);
        self.translator.translate(key, &ctx.language.id)
    }

    /// Key of the first matching group, else the default group (if configured).
    pub fn group_key(&self, ctx: &PageContext<'_>, id: PageId) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| matches_any(ctx, id, &g.rules))
            .map(|g| g.name.as_str())
            .or(self.default_group.as_deref())
    }

    pub fn group_node(&self, ctx: &PageContext<'_>, id: PageId) -> Option<String> {
        self.group_key(ctx, id)
            .map(|key| self.translator.translate(key, &ctx.language.id))
    }

    /// Group keys in render order: configured groups by priority, then the default group.
    pub fn group_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::with_capacity(self.groups.len() + 1);
        for key in self.groups.iter().map(|g| g.name.as_str()).chain(self.default_group.as_deref()) {
            if !order.contains(&key) {
                order.push(key);
            }
        }
        order
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentTree, NodeTypes, PageSpec, PropertyBag};
    use crate::i18n::{LanguageDimension, TranslationTable};
    use crate::rule_gen::matcher::MatchRule;

    fn bucket(name: &str, priority: i64, rules: Vec<MatchRule>) -> BucketConfig {
        BucketConfig {
            name: name.into(),
            priority,
            rules,
        }
    }

    fn path(p: &str) -> MatchRule {
        MatchRule::Path {
            patterns: vec![p.to_string()],
        }
    }

    fn translator() -> Arc<Translator> {
        let mut table = TranslationTable::new();
        let features = table.entry("features".into()).or_default();
        features.insert("en".into(), "Features".into());
        features.insert("de".into(), "Funktionen".into());
        Arc::new(Translator::with_defaults(&table))
    }

    fn tree() -> ContentTree {
        ContentTree::from(
            PageSpec::new("root", "home", "Homepage").child(
                PageSpec::new("f", "features", "Page")
                    .variant("en", PropertyBag::new())
                    .child(PageSpec::new("a", "a", "Page").variant("en", PropertyBag::new())),
            ),
        )
    }

    #[test]
    fn test_lower_priority_number_wins() {
        let c = Categorizer::new(
            vec![bucket("late", 50, vec![path("/features")]), bucket("features", 10, vec![path("/features/*")])],
            "uncategorized".into(),
            vec![],
            None,
            translator(),
        );
        let tree = tree();
        let types = NodeTypes::default();
        let en = LanguageDimension::new("en");
        let ctx = PageContext::new(&tree, &types, &en);
        let a = tree.find_by_identifier("a").unwrap();
        assert_eq!(c.category_key(&ctx, a), "features");
        assert_eq!(c.category_key(&ctx, tree.find_by_identifier("f").unwrap()), "late");
        for _ in 0..3 {
            assert_eq!(c.categorize_node(&ctx, a), "Features");
        }
        let de = LanguageDimension::new("de");
        assert_eq!(c.categorize_node(&ctx.with_language(&de), a), "Funktionen");
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let c = Categorizer::new(
            vec![bucket("first", 100, vec![MatchRule::Always]), bucket("second", 100, vec![MatchRule::Always])],
            "uncategorized".into(),
            vec![],
            None,
            translator(),
        );
        let tree = tree();
        let types = NodeTypes::default();
        let en = LanguageDimension::new("en");
        let ctx = PageContext::new(&tree, &types, &en);
        assert_eq!(c.category_key(&ctx, tree.root()), "first");
    }

    #[test]
    fn test_default_category_is_translated() {
        let c = Categorizer::new(vec![], "uncategorized".into(), vec![], None, translator());
        let tree = tree();
        let types = NodeTypes::default();
        let de = LanguageDimension::new("de");
        let ctx = PageContext::new(&tree, &types, &de);
        assert_eq!(c.categorize_node(&ctx, tree.root()), "Weitere Seiten");
    }

    #[test]
    fn test_groups_with_and_without_default() {
        let groups = vec![bucket("docs", 5, vec![path("/features/*")]), bucket("never", 1, vec![MatchRule::Never])];
        let tree = tree();
        let types = NodeTypes::default();
        let en = LanguageDimension::new("en");
        let ctx = PageContext::new(&tree, &types, &en);
        let a = tree.find_by_identifier("a").unwrap();
        let f = tree.find_by_identifier("f").unwrap();

        let c = Categorizer::new(vec![], "uncategorized".into(), groups.clone(), None, translator());
        assert_eq!(c.group_node(&ctx, a).as_deref(), Some("docs"));
        assert_eq!(c.group_node(&ctx, f), None);
        assert_eq!(c.group_order(), vec!["never", "docs"]);

        let c = Categorizer::new(vec![], "uncategorized".into(), groups, Some("other".into()), translator());
        assert_eq!(c.group_node(&ctx, f).as_deref(), Some("Other"));
        assert_eq!(c.group_order(), vec!["never", "docs", "other"]);
    }
}
