use super::{ContentTree, NodeTypes, Page, PageId, PageVariant, PropertyBag};
use crate::i18n::LanguageDimension;

/// A content tree seen through one language: everything the pipeline asks about a page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub tree: &'a ContentTree,
    pub types: &'a NodeTypes,
    pub language: &'a LanguageDimension,
}

impl<'a> PageContext<'a> {
    pub fn new(tree: &'a ContentTree, types: &'a NodeTypes, language: &'a LanguageDimension) -> Self {
        Self { tree, types, language }
    }

    /// Same tree, other language.
    pub fn with_language(&self, language: &'a LanguageDimension) -> Self {
        Self { language, ..*self }
    }

    pub fn page(&self, id: PageId) -> &'a Page {
        self.tree.page(id)
    }

    /// The tree root and homepage-typed pages sit at the top of the URL hierarchy.
    pub fn is_root_or_homepage(&self, id: PageId) -> bool {
        id == self.tree.root() || self.types.is_homepage_type(&self.page(id).node_type)
    }

    pub fn is_shortcut(&self, id: PageId) -> bool {
        self.types.is_shortcut_type(&self.page(id).node_type)
    }

    /// URL segment of one page: `uriPathSegment` in this language, else the page name.
    fn segment(&self, id: PageId) -> &'a str {
        self.properties(id)
            .uri_path_segment()
            .unwrap_or(self.page(id).name.as_str())
    }

    /// Segments from the top of the hierarchy down to the page, skipping root and homepage nodes.
    pub fn segments(&self, id: PageId) -> Vec<&'a str> {
        let mut segments: Vec<&str> = std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .filter(|p| !self.is_root_or_homepage(*p))
            .map(|p| self.segment(p))
            .collect();
        segments.reverse();
        segments
    }

    /// Root-relative path without language prefix. The root itself is `/`.
    pub fn path(&self, id: PageId) -> String {
        format!("/{}", self.segments(id).join("/"))
    }

    /// Number of ancestors that are neither the root nor a homepage.
    pub fn depth(&self, id: PageId) -> usize {
        self.tree
            .ancestors(id)
            .filter(|p| !self.is_root_or_homepage(*p))
            .count()
    }

    /// Variant for this language, trying the dimension's raw values in order.
    pub fn variant(&self, id: PageId) -> Option<&'a PageVariant> {
        let page = self.page(id);
        self.language.values().find_map(|v| page.variants.get(v))
    }

    pub fn exists(&self, id: PageId) -> bool {
        self.variant(id).is_some()
    }

    pub fn properties(&self, id: PageId) -> &'a PropertyBag {
        self.variant(id).map(|v| &v.properties).unwrap_or(PropertyBag::empty())
    }

    /// `title` property, else the page name.
    pub fn title(&self, id: PageId) -> &'a str {
        self.properties(id).title().unwrap_or(self.page(id).name.as_str())
    }

    /// `llmDescription`, else `metaDescription`.
    pub fn description(&self, id: PageId) -> Option<&'a str> {
        self.properties(id).description()
    }

    /// Hidden or removed pages, and pages below one, are not accessible. The root never counts.
    pub fn is_accessible(&self, id: PageId) -> bool {
        let root = self.tree.root();
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .filter(|p| *p != root)
            .all(|p| {
                let page = self.page(p);
                !page.hidden && !page.removed
            })
    }
}
