//! Assembles the `llms.txt` index and `llms-full.txt` documents of a site.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use super::categorizer::Categorizer;
use super::config::LlmsConfig;
use super::exclusion::ExclusionFilter;
use super::html::extract_body;
use super::render::{link_line, render_tree};
use super::text_utils::{blockquote, heading};
use super::tree::{build_tree, is_excluded_page_type};
use super::url_utils::UrlResolver;
use crate::content::{ContentSnapshot, PageContext, PageId, Site};
use crate::i18n::{LanguageDetector, LanguageDimension, RequestInfo, Translator};

/// Per-run inputs that are not part of the configuration.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Host (or origin) to build absolute URLs with, usually from the triggering request.
    pub host_override: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            host_override: None,
            generated_at: Utc::now(),
        }
    }
}

/// The two generated artifacts of one site and language selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documents {
    pub index: String,
    pub full: String,
}

/// Holds the rule sets, compiled once from the configuration.
#[derive(Debug)]
pub struct Generator {
    config: LlmsConfig,
    languages: Vec<LanguageDimension>,
    translator: Arc<Translator>,
    categorizer: Categorizer,
    exclusions: ExclusionFilter,
    detector: LanguageDetector,
}

impl Generator {
    pub fn new(config: LlmsConfig) -> Self {
        let languages = config.effective_languages();
        let translator = Arc::new(Translator::with_defaults(&config.translations));
        let categorizer = Categorizer::new(
            config.categories.clone(),
            config.default_category.clone(),
            config.full_content.groups.clone(),
            config.full_content.default_group.clone(),
            translator.clone(),
        );
        let exclusions = ExclusionFilter::new(config.full_content_exclusions.clone());
        let detector = LanguageDetector::new(&config.language_detection, &languages);
        Self {
            config,
            languages,
            translator,
            categorizer,
            exclusions,
            detector,
        }
    }

    pub fn config(&self) -> &LlmsConfig {
        &self.config
    }

    /// Languages to generate, in configured order.
    pub fn languages(&self) -> &[LanguageDimension] {
        &self.languages
    }

    pub fn language(&self, id: &str) -> Option<&LanguageDimension> {
        self.languages.iter().find(|l| l.id == id)
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn exclusions(&self) -> &ExclusionFilter {
        &self.exclusions
    }

    /// Language id for a request. Always one of the configured languages or the default language.
    pub fn detect_language(&self, request: &RequestInfo) -> String {
        self.detector.detect(request)
    }

    /// Both documents for `site`, covering `languages` (one document section per language when several).
    pub fn generate(
        &self,
        snapshot: &ContentSnapshot,
        site: &Site,
        languages: &[LanguageDimension],
        options: &GenerateOptions,
    ) -> Documents {
        let resolver = UrlResolver::new(
            snapshot,
            site,
            &self.config.scheme,
            self.config.fallback_domain.as_deref(),
            options.host_override.as_deref(),
        );
        let run = Run {
            generator: self,
            site,
            resolver,
            languages,
        };
        tracing::debug!(
            "[site: {}] generating for languages {:?}",
            site.id,
            languages.iter().map(|l| l.id.as_str()).collect::<Vec<_>>()
        );
        Documents {
            index: run.index_document(options.generated_at),
            full: run.full_document(),
        }
    }
}

/// One generation pass over one site.
struct Run<'a> {
    generator: &'a Generator,
    site: &'a Site,
    resolver: UrlResolver<'a>,
    languages: &'a [LanguageDimension],
}

impl<'a> Run<'a> {
    fn ctx(&self, language: &'a LanguageDimension) -> PageContext<'a> {
        PageContext::new(&self.site.tree, &self.generator.config.node_types, language)
    }

    fn config(&self) -> &'a LlmsConfig {
        &self.generator.config
    }

    fn primary_language(&self) -> Option<&'a LanguageDimension> {
        self.languages.first()
    }

    fn multilingual(&self) -> bool {
        self.languages.len() > 1
    }

    fn translate(&self, key: &str, language: &str) -> String {
        self.generator.translator.translate(key, language)
    }

    /// Absolute page URL; failures are logged and yield `None`.
    fn page_url(&self, ctx: &PageContext<'_>, id: PageId) -> Option<String> {
        match self.resolver.page_url(ctx, id) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    "[site: {}, page: {}, language: {}] no URL: {}",
                    self.site.id,
                    ctx.page(id).identifier,
                    ctx.language.id,
                    e
                );
                None
            }
        }
    }

    fn site_title(&self) -> String {
        let root = self.site.tree.root();
        self.primary_language()
            .and_then(|l| self.ctx(l).properties(root).title())
            .map(str::to_string)
            .or_else(|| self.config().fallback.title.clone())
            .unwrap_or_else(|| self.site.display_name().to_string())
    }

    fn site_description(&self) -> Option<String> {
        let language = self.primary_language()?;
        let root = self.site.tree.root();
        self.config()
            .site_descriptions
            .get(&language.id)
            .cloned()
            .or_else(|| self.ctx(language).description(root).map(str::to_string))
            .or_else(|| self.config().fallback.description.clone())
            .filter(|d| !d.trim().is_empty())
    }

    fn site_context(&self) -> Option<String> {
        let root = self.site.tree.root();
        self.config()
            .llm_context
            .clone()
            .or_else(|| {
                self.primary_language()
                    .and_then(|l| self.ctx(l).properties(root).llm_context())
                    .map(str::to_string)
            })
            .filter(|c| !c.trim().is_empty())
    }

    /// `# title`, `> description` and context, shared by both documents.
    fn header(&self, with_context: bool) -> String {
        let mut out = format!("{}\n\n", heading(1, &self.site_title()));
        if let Some(description) = self.site_description() {
            out.push_str(&blockquote(&description));
            out.push_str("\n\n");
        }
        if with_context {
            if let Some(context) = self.site_context() {
                out.push_str(context.trim());
                out.push_str("\n\n");
            }
        }
        out
    }

    fn index_document(&self, generated_at: DateTime<Utc>) -> String {
        let config = self.config();
        let level = config.heading_level;
        let ui_language = self.primary_language().map(|l| l.id.as_str()).unwrap_or("en");
        let mut out = self.header(true);

        for section in &config.extra_sections {
            out.push_str(&heading(level, &section.title));
            out.push_str("\n\n");
            if !section.content.trim().is_empty() {
                out.push_str(section.content.trim());
                out.push_str("\n\n");
            }
        }

        for language in self.languages {
            let ctx = self.ctx(language);
            let forest = build_tree(&ctx, self.site.tree.root(), config.max_depth, config.include_root);
            let url_of = |id: PageId| self.page_url(&ctx, id);
            let tree_level = if self.multilingual() { level + 1 } else { level };
            let rendered = render_tree(&ctx, &forest, tree_level, &self.generator.categorizer, &url_of);
            if self.multilingual() {
                out.push_str(&heading(level, language.label()));
                out.push_str("\n\n");
            }
            out.push_str(&rendered);
        }

        let optional = self.optional_entries();
        if !optional.is_empty() {
            out.push_str(&heading(level, &self.translate("optional", ui_language)));
            out.push_str("\n\n");
            for line in optional {
                out.push_str(&format!("- {}\n", line));
            }
            out.push('\n');
        }

        let external = self.external_entries();
        if !external.is_empty() {
            out.push_str(&heading(level, &self.translate("external_resources", ui_language)));
            out.push_str("\n\n");
            for line in external {
                out.push_str(&format!("- {}\n", line));
            }
            out.push('\n');
        }

        out.push_str("---\n\n");
        out.push_str(&format!(
            "{}: {}\n",
            self.translate("generated_at", ui_language),
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        out
    }

    /// Pages flagged `includeInOptional`, across all languages, one line per distinct URL.
    fn optional_entries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();
        for language in self.languages {
            let ctx = self.ctx(language);
            for page in self.site.tree.iter() {
                let id = page.id;
                if !ctx.exists(id)
                    || !ctx.properties(id).include_in_optional()
                    || ctx.is_shortcut(id)
                    || !ctx.is_accessible(id)
                {
                    continue;
                }
                let url = self.page_url(&ctx, id);
                let key = url.clone().unwrap_or_else(|| format!("{}:{}", language.id, page.identifier));
                if seen.insert(key) {
                    lines.push(link_line(&ctx, id, url.as_deref()));
                }
            }
        }
        lines
    }

    /// Shortcut pages flagged `includeShortcut`, linking to their resolved targets.
    fn external_entries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();
        for language in self.languages {
            let ctx = self.ctx(language);
            for page in self.site.tree.iter() {
                let id = page.id;
                if !ctx.is_shortcut(id)
                    || !ctx.exists(id)
                    || !ctx.properties(id).include_shortcut()
                    || !ctx.is_accessible(id)
                {
                    continue;
                }
                match self.resolver.shortcut_target(&ctx, id) {
                    Ok(target) => {
                        if seen.insert(target.clone()) {
                            lines.push(link_line(&ctx, id, Some(&target)));
                        }
                    }
                    Err(e) => tracing::warn!(
                        "[site: {}, page: {}] skipping external resource: {}",
                        self.site.id,
                        page.identifier,
                        e
                    ),
                }
            }
        }
        lines
    }

    /// Pages of one language that belong in the full-content document, in tree order.
    fn full_content_pages(&self, ctx: &PageContext<'_>) -> Vec<PageId> {
        let max_depth = self.config().full_content.max_depth;
        let mut pages = Vec::new();
        let mut pending = vec![(self.site.tree.root(), 0usize)];
        while let Some((id, depth)) = pending.pop() {
            if depth > max_depth || !ctx.is_accessible(id) || is_excluded_page_type(ctx, id) {
                continue;
            }
            if ctx.exists(id) && !ctx.is_shortcut(id) && !self.generator.exclusions.is_excluded(ctx, id) {
                pages.push(id);
            }
            let children = &ctx.page(id).children;
            pending.extend(children.iter().rev().map(|c| (*c, depth + 1)));
        }
        pages
    }

    fn full_page_section(&self, ctx: &PageContext<'_>, id: PageId, level: usize) -> String {
        let mut out = format!("{}\n\n", heading(level, ctx.title(id)));
        if let Some(url) = self.page_url(ctx, id) {
            out.push_str(&format!("{}: {}\n\n", self.translate("url", &ctx.language.id), url));
        }
        if let Some(description) = ctx.description(id) {
            out.push_str(&blockquote(description));
            out.push_str("\n\n");
        }
        if let Some(context) = ctx.properties(id).llm_context() {
            out.push_str(context);
            out.push_str("\n\n");
        }
        let body = ctx.variant(id).map(|v| extract_body(&v.content)).unwrap_or_default();
        if !body.is_empty() {
            out.push_str(&body);
            out.push_str("\n\n");
        }
        out.push_str("---\n\n");
        out
    }

    fn full_document(&self) -> String {
        let level = self.config().heading_level;
        let categorizer = &self.generator.categorizer;
        let mut out = self.header(false);

        for language in self.languages {
            let ctx = self.ctx(language);
            let group_level = if self.multilingual() { level + 1 } else { level };
            if self.multilingual() {
                out.push_str(&heading(level, language.label()));
                out.push_str("\n\n");
            }

            let pages = self.full_content_pages(&ctx);
            let keyed: Vec<(PageId, Option<&str>)> =
                pages.iter().map(|id| (*id, categorizer.group_key(&ctx, *id))).collect();

            for group in categorizer.group_order() {
                let members: Vec<PageId> = keyed.iter().filter(|(_, g)| *g == Some(group)).map(|(id, _)| *id).collect();
                if members.is_empty() {
                    continue;
                }
                out.push_str(&heading(group_level, &self.translate(group, &language.id)));
                out.push_str("\n\n");
                for id in members {
                    out.push_str(&self.full_page_section(&ctx, id, group_level + 1));
                }
            }
            for (id, _) in keyed.iter().filter(|(_, g)| g.is_none()) {
                out.push_str(&self.full_page_section(&ctx, *id, group_level + 1));
            }
        }
        out
    }
}
