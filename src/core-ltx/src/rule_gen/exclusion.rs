//! Which pages stay out of the full-content document.

use super::config::ExclusionConfig;
use super::matcher::path_matches;
use crate::content::{PageContext, PageId};

#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    config: ExclusionConfig,
}

impl ExclusionFilter {
    pub fn new(config: ExclusionConfig) -> Self {
        Self { config }
    }

    /// First check that fires wins: page override, path pattern, type, hidden, footer name.
    pub fn is_excluded(&self, ctx: &PageContext<'_>, id: PageId) -> bool {
        let page = ctx.page(id);
        let reason = if ctx.properties(id).exclude_from_full_content() {
            Some("excludeFromFullContent")
        } else if self.path_excluded(ctx, id) {
            Some("path pattern")
        } else if ctx.types.is_any(&page.node_type, &self.config.types) {
            Some("type")
        } else if self.config.exclude_hidden && page.hidden {
            Some("hidden")
        } else if self.config.exclude_footer_pages && page.name.to_lowercase().contains("footer") {
            Some("footer page")
        } else {
            None
        };
        if let Some(reason) = reason {
            tracing::debug!("[page: {}] excluded from full content ({})", page.identifier, reason);
        }
        reason.is_some()
    }

    fn path_excluded(&self, ctx: &PageContext<'_>, id: PageId) -> bool {
        if self.config.path_patterns.is_empty() {
            return false;
        }
        let path = ctx.path(id);
        self.config.path_patterns.iter().any(|pattern| match path_matches(pattern, &path) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Ignoring exclusion pattern '{}': {}", pattern, e);
                false
            }
        })
    }
}
