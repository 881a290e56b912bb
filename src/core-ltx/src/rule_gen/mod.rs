//! # llms.txt generation pipeline
//!
//! Turns the content tree of a site into two markdown documents:
//!
//! - `llms.txt`: an index of links, bucketed into categories, plus optional pages and external resources.
//! - `llms-full.txt`: the extracted text of every page that passes the exclusion rules, bucketed into groups.
//!
//! Everything here is synchronous and pure with respect to its inputs. Rule sets are compiled once by
//! [`Generator::new`] and then evaluated per page.
//!
//! ```
//! use core_ltx::content::{ContentSnapshot, ContentTree, Domain, PageSpec, PropertyBag, Site};
//! use core_ltx::rule_gen::{GenerateOptions, Generator, LlmsConfig};
//!
//! let site = Site {
//!     id: "acme".into(),
//!     name: "Acme".into(),
//!     domains: vec![Domain::new("acme.test")],
//!     tree: ContentTree::from(
//!         PageSpec::new("root", "acme", "Homepage").variant("en", PropertyBag::new().with("title", "Acme")),
//!     ),
//! };
//! let snapshot = ContentSnapshot { sites: vec![site.clone()] };
//! let generator = Generator::new(LlmsConfig::default());
//! let docs = generator.generate(&snapshot, &site, generator.languages(), &GenerateOptions::default());
//! assert!(docs.index.starts_with("# Acme"));
//! ```

pub mod categorizer;
mod config;
mod errors;
pub mod exclusion;
mod generator;
mod html;
pub mod matcher;
pub mod render;
pub mod text_utils;
pub mod tree;
mod url_utils;

pub use categorizer::Categorizer;
pub use config::{
    BucketConfig, DEFAULT_PRIORITY, ExclusionConfig, ExtraSection, FallbackTexts, FullContentConfig, LlmsConfig,
};
pub use errors::{LlmsGenError, Result};
pub use exclusion::ExclusionFilter;
pub use generator::{Documents, GenerateOptions, Generator};
pub use html::{extract_body, strip_html};
pub use matcher::{DepthComparison, MatchRule, PropertyOperator, Relation, matches, matches_any};
pub use tree::{TreeNode, build_tree};
pub use url_utils::{NODE_REFERENCE_PREFIX, UrlResolver};
