use std::collections::HashMap;

use globset::{Glob, GlobBuilder, GlobMatcher};
use serde::Deserialize;

use super::FALLBACK_LANGUAGE;
use crate::content::strip_port;

/// One value of the language dimension, e.g. `en` with raw values `["en", "en_US"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageDimension {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Raw dimension values tried, in order, when looking up a page variant. Empty means `[id]`.
    #[serde(default)]
    pub values: Vec<String>,
    /// URL prefix segment. `None` uses the id, an empty string disables the prefix.
    #[serde(default)]
    pub uri_segment: Option<String>,
}

impl LanguageDimension {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            values: Vec::new(),
            uri_segment: None,
        }
    }

    pub fn with_values(id: &str, values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::new(id)
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        let fallback = self.values.is_empty().then_some(self.id.as_str());
        self.values.iter().map(String::as_str).chain(fallback)
    }

    pub fn uri_segment(&self) -> &str {
        self.uri_segment.as_deref().unwrap_or(&self.id).trim_matches('/')
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStrategy {
    Path,
    Domain,
    Header,
    #[default]
    Auto,
    #[serde(other)]
    Unknown,
}

/// A path pattern (`/de/*` glob, or `/de` prefix) selecting a language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathLanguage {
    pub pattern: String,
    pub language: String,
}

/// A host (exact or `*.example.de` wildcard) selecting a language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainLanguage {
    pub host: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageDetectionConfig {
    #[serde(default)]
    pub strategy: DetectionStrategy,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub path_patterns: Vec<PathLanguage>,
    #[serde(default)]
    pub domains: Vec<DomainLanguage>,
}

impl Default for LanguageDetectionConfig {
    fn default() -> Self {
        Self {
            strategy: DetectionStrategy::default(),
            default_language: default_language(),
            path_patterns: Vec::new(),
            domains: Vec::new(),
        }
    }
}

fn default_language() -> String {
    FALLBACK_LANGUAGE.to_string()
}

/// What the resolver looks at. A page can be resolved with [`RequestInfo::from_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub path: String,
    pub host: Option<String>,
    pub accept_language: Option<String>,
}

impl RequestInfo {
    pub fn from_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn accept_language(mut self, header: &str) -> Self {
        self.accept_language = Some(header.to_string());
        self
    }
}

#[derive(Debug)]
enum PathRule {
    Prefix(String),
    Glob(GlobMatcher),
}

/// Maps a request to a configured language. Patterns are compiled once; the per-request call is pure.
#[derive(Debug)]
pub struct LanguageDetector {
    strategy: DetectionStrategy,
    default_language: String,
    paths: Vec<(PathRule, String)>,
    exact_hosts: Vec<(String, String)>,
    wildcard_hosts: Vec<(GlobMatcher, String)>,
    /// Lowercased language tag (id or raw value) to language id.
    known: HashMap<String, String>,
}

impl LanguageDetector {
    /// Invalid patterns, and patterns naming a language that is not configured, are logged and left out.
    /// A default language that is not configured is replaced by the first configured language.
    pub fn new(config: &LanguageDetectionConfig, languages: &[LanguageDimension]) -> Self {
        let mut known = HashMap::new();
        for language in languages {
            for tag in std::iter::once(language.id.as_str()).chain(language.values()) {
                known
                    .entry(normalize_tag(tag))
                    .or_insert_with(|| language.id.clone());
            }
        }
        let configured = |language: &str, rule: &str| {
            let id = known.get(&normalize_tag(language)).cloned();
            if id.is_none() {
                tracing::warn!("Skipping language rule '{}': '{}' is not a configured language", rule, language);
            }
            id
        };

        let paths = config
            .path_patterns
            .iter()
            .filter_map(|p| {
                let language = configured(&p.language, &p.pattern)?;
                let rule = if p.pattern.contains('*') {
                    match Glob::new(&p.pattern) {
                        Ok(glob) => PathRule::Glob(glob.compile_matcher()),
                        Err(e) => {
                            tracing::warn!("Skipping invalid language path pattern '{}': {}", p.pattern, e);
                            return None;
                        }
                    }
                } else {
                    PathRule::Prefix(p.pattern.clone())
                };
                Some((rule, language))
            })
            .collect();

        let mut exact_hosts = Vec::new();
        let mut wildcard_hosts = Vec::new();
        for d in &config.domains {
            let Some(language) = configured(&d.language, &d.host) else {
                continue;
            };
            if d.host.contains('*') {
                match GlobBuilder::new(&d.host).case_insensitive(true).build() {
                    Ok(glob) => wildcard_hosts.push((glob.compile_matcher(), language)),
                    Err(e) => tracing::warn!("Skipping invalid language host pattern '{}': {}", d.host, e),
                }
            } else {
                exact_hosts.push((d.host.to_lowercase(), language));
            }
        }

        let default_language = match known.get(&normalize_tag(&config.default_language)) {
            Some(id) => id.clone(),
            None => {
                let first = languages
                    .first()
                    .map(|l| l.id.clone())
                    .unwrap_or_else(|| config.default_language.clone());
                tracing::warn!(
                    "Default language '{}' is not configured, using '{}'",
                    config.default_language,
                    first
                );
                first
            }
        };

        Self {
            strategy: config.strategy,
            default_language,
            paths,
            exact_hosts,
            wildcard_hosts,
            known,
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn detect(&self, request: &RequestInfo) -> String {
        let detected = match self.strategy {
            DetectionStrategy::Path => self.from_path(&request.path),
            DetectionStrategy::Domain => request.host.as_deref().and_then(|h| self.from_host(h)),
            DetectionStrategy::Header => request.accept_language.as_deref().and_then(|h| self.from_header(h)),
            DetectionStrategy::Auto => self
                .from_path(&request.path)
                .or_else(|| request.host.as_deref().and_then(|h| self.from_host(h)))
                .or_else(|| request.accept_language.as_deref().and_then(|h| self.from_header(h))),
            DetectionStrategy::Unknown => {
                tracing::warn!("Unknown language detection strategy, using '{}'", self.default_language);
                None
            }
        };
        detected.unwrap_or_else(|| self.default_language.clone())
    }

    fn from_path(&self, path: &str) -> Option<String> {
        self.paths
            .iter()
            .find(|(rule, _)| match rule {
                PathRule::Prefix(prefix) => path.starts_with(prefix.as_str()),
                PathRule::Glob(glob) => glob.is_match(path),
            })
            .map(|(_, language)| language.clone())
    }

    fn from_host(&self, host: &str) -> Option<String> {
        let host = strip_port(host).to_lowercase();
        self.exact_hosts
            .iter()
            .find(|(h, _)| *h == host)
            .map(|(_, language)| language.clone())
            .or_else(|| {
                self.wildcard_hosts
                    .iter()
                    .find(|(glob, _)| glob.is_match(&host))
                    .map(|(_, language)| language.clone())
            })
    }

    fn from_header(&self, header: &str) -> Option<String> {
        parse_accept_language(header).into_iter().find_map(|tag| {
            let tag = normalize_tag(&tag);
            self.known.get(&tag).cloned().or_else(|| {
                let primary = tag.split('-').next()?;
                self.known.get(primary).cloned()
            })
        })
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', "-")
}

/// Language tags from an `Accept-Language` header, by descending quality.
/// Ties keep header order; malformed entries, `*` and `q=0` are dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut candidates: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                return None;
            }
            let mut quality = 1.0f32;
            for param in parts {
                let (name, value) = param.split_once('=')?;
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?;
                }
            }
            (quality > 0.0 && quality <= 1.0).then(|| (tag.to_string(), quality))
        })
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.into_iter().map(|(tag, _)| tag).collect()
}
