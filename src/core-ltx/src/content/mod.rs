//! Content tree of one site: pages stored in an arena, addressed by [`PageId`].
//!
//! The tree owns every page; the parent link is a plain id used for lookups only.
//! A tree is built once from its nested JSON (or [`PageSpec`]) form and is read-only afterwards.

mod context;
mod node_types;
mod properties;
mod site;

use std::collections::BTreeMap;

use serde::Deserialize;

pub use context::PageContext;
pub use node_types::NodeTypes;
pub use properties::{PropertyBag, keys};
pub use site::{ContentSnapshot, ContentSource, Domain, JsonFileSource, Site, StaticSource};
pub(crate) use site::strip_port;

/// Index of a page inside its [`ContentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub usize);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: PageId,
    /// Stable CMS identifier, also the target of `node://<identifier>` references.
    pub identifier: String,
    pub name: String,
    pub node_type: String,
    pub hidden: bool,
    pub removed: bool,
    pub parent: Option<PageId>,
    pub children: Vec<PageId>,
    /// Per-language variants keyed by raw dimension value.
    pub variants: BTreeMap<String, PageVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageVariant {
    #[serde(default)]
    pub properties: PropertyBag,
    /// Body of the page, in document order.
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// A content element (text, headline, container, ...) inside a page body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub properties: PropertyBag,
    #[serde(default)]
    pub children: Vec<ContentBlock>,
}

impl ContentBlock {
    pub fn text(node_type: &str, text: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            properties: PropertyBag::new().with(keys::TEXT, text),
            children: Vec::new(),
        }
    }
}

/// Nested description of a page and its subtree, as found in content snapshots.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageSpec {
    pub identifier: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub variants: BTreeMap<String, PageVariant>,
    #[serde(default)]
    pub children: Vec<PageSpec>,
}

impl PageSpec {
    pub fn new(identifier: &str, name: &str, node_type: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: name.to_string(),
            node_type: node_type.to_string(),
            ..Default::default()
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }

    /// Adds (or replaces) the variant for one raw dimension value.
    pub fn variant(self, dimension_value: &str, properties: PropertyBag) -> Self {
        self.variant_with_content(dimension_value, properties, Vec::new())
    }

    pub fn variant_with_content(
        mut self,
        dimension_value: &str,
        properties: PropertyBag,
        content: Vec<ContentBlock>,
    ) -> Self {
        self.variants
            .insert(dimension_value.to_string(), PageVariant { properties, content });
        self
    }

    pub fn child(mut self, child: PageSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Arena of pages. `PageId(0)` is always the root (the site node).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PageSpec")]
pub struct ContentTree {
    pages: Vec<Page>,
}

impl From<PageSpec> for ContentTree {
    fn from(root: PageSpec) -> Self {
        let mut tree = ContentTree { pages: Vec::new() };
        tree.insert(root, None);
        tree
    }
}

impl ContentTree {
    fn insert(&mut self, spec: PageSpec, parent: Option<PageId>) -> PageId {
        let id = PageId(self.pages.len());
        self.pages.push(Page {
            id,
            identifier: spec.identifier,
            name: spec.name,
            node_type: spec.node_type,
            hidden: spec.hidden,
            removed: spec.removed,
            parent,
            children: Vec::with_capacity(spec.children.len()),
            variants: spec.variants,
        });
        for child in spec.children {
            let child_id = self.insert(child, Some(id));
            self.pages[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> PageId {
        PageId(0)
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id.0)
    }

    /// Page by id. Ids are only handed out by this tree, so they are always in range.
    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn parent(&self, id: PageId) -> Option<PageId> {
        self.get(id).and_then(|p| p.parent)
    }

    /// Ancestors of a page, nearest first, ending with the root.
    pub fn ancestors(&self, id: PageId) -> impl Iterator<Item = PageId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<PageId> {
        self.pages.iter().find(|p| p.identifier == identifier).map(|p| p.id)
    }

    /// All pages in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
