//! Absolute URL resolution for pages and shortcut targets.

use url::Url;

use crate::content::{ContentSnapshot, PageContext, PageId, Site};
use crate::rule_gen::errors::{LlmsGenError, Result};

/// Prefix of shortcut targets that point at another page by identifier.
pub const NODE_REFERENCE_PREFIX: &str = "node://";

/// Builds absolute URLs for one site.
///
/// Host order: explicit override, the site's first active domain, any active domain of any site,
/// the configured fallback domain.
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'a> {
    snapshot: &'a ContentSnapshot,
    site: &'a Site,
    default_scheme: &'a str,
    fallback_domain: Option<&'a str>,
    host_override: Option<&'a str>,
}

impl<'a> UrlResolver<'a> {
    pub fn new(
        snapshot: &'a ContentSnapshot,
        site: &'a Site,
        default_scheme: &'a str,
        fallback_domain: Option<&'a str>,
        host_override: Option<&'a str>,
    ) -> Self {
        Self {
            snapshot,
            site,
            default_scheme,
            fallback_domain,
            host_override,
        }
    }

    /// `scheme://host/` all page URLs of this site start with.
    pub fn base_url(&self) -> Result<Url> {
        if let Some(host) = non_empty(self.host_override) {
            return self.url_for(host, None);
        }
        if let Some(domain) = self.site.primary_domain() {
            return self.url_for(&domain.host, domain.scheme.as_deref());
        }
        if let Some(domain) = self.snapshot.active_domains().next() {
            return self.url_for(&domain.host, domain.scheme.as_deref());
        }
        if let Some(host) = non_empty(self.fallback_domain) {
            return self.url_for(host, None);
        }
        Err(LlmsGenError::NoHostResolvable(self.site.id.clone()))
    }

    /// Accepts both bare hosts (`acme.test:8080`) and full origins (`http://localhost:3000`).
    fn url_for(&self, host: &str, scheme: Option<&str>) -> Result<Url> {
        let host = host.trim().trim_end_matches('/');
        if host.contains("://") {
            let mut url = Url::parse(host)?;
            url.set_path("/");
            return Ok(url);
        }
        let scheme = scheme.unwrap_or(self.default_scheme);
        Ok(Url::parse(&format!("{}://{}/", scheme, host))?)
    }

    /// Language segment + page segments on top of the resolved host.
    pub fn page_url(&self, ctx: &PageContext<'_>, id: PageId) -> Result<String> {
        let mut url = self.base_url()?;
        let prefix = ctx.language.uri_segment();
        let segments = ctx.segments(id);
        let parts: Vec<&str> = std::iter::once(prefix)
            .filter(|p| !p.is_empty())
            .chain(segments.iter().copied())
            .collect();
        url.set_path(&format!("/{}", parts.join("/")));
        Ok(url.to_string())
    }

    /// Target of a shortcut page: an absolute URL, a `node://<identifier>` reference,
    /// or a site-relative path.
    pub fn shortcut_target(&self, ctx: &PageContext<'_>, id: PageId) -> Result<String> {
        let page = ctx.page(id);
        let target = ctx
            .properties(id)
            .target()
            .ok_or_else(|| LlmsGenError::InvalidShortcutTarget(page.identifier.clone()))?;

        if let Some(identifier) = target.strip_prefix(NODE_REFERENCE_PREFIX) {
            let referenced = ctx
                .tree
                .find_by_identifier(identifier)
                .ok_or_else(|| LlmsGenError::InvalidShortcutTarget(page.identifier.clone()))?;
            return self.page_url(ctx, referenced);
        }
        if target.starts_with('/') {
            return Ok(self.base_url()?.join(target)?.to_string());
        }
        match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.to_string()),
            _ => Err(LlmsGenError::InvalidShortcutTarget(page.identifier.clone())),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
