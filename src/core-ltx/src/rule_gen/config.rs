//! Generation configuration, loaded once from a TOML file.
//!
//! ```toml
//! fallback_domain = "www.acme.test"
//!
//! [[languages]]
//! id = "en"
//! label = "English"
//!
//! [[categories]]
//! name = "features"
//! priority = 10
//! rules = [{ type = "path", patterns = ["/features"] }]
//!
//! [full_content_exclusions]
//! path_patterns = ["/legal/*"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::matcher::MatchRule;
use crate::content::NodeTypes;
use crate::errors::{Error, read_file};
use crate::i18n::{LanguageDetectionConfig, LanguageDimension, TranslationTable};

/// Priority of a category or group that does not set one.
pub const DEFAULT_PRIORITY: i64 = 100;

/// Deepest configurable section heading; nested language and page headings go two levels below.
pub const MAX_HEADING_LEVEL: usize = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct LlmsConfig {
    /// Languages to generate, in output order. Empty means a single `en` language.
    #[serde(default)]
    pub languages: Vec<LanguageDimension>,

    /// Fold all languages into one document stored under the `all` dimension.
    #[serde(default = "default_true")]
    pub consolidate_languages: bool,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Host used when neither the request nor any site provides one.
    #[serde(default)]
    pub fallback_domain: Option<String>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Level of the top section headings, clamped to `1..=MAX_HEADING_LEVEL`.
    #[serde(default = "default_heading_level", deserialize_with = "clamped_heading_level")]
    pub heading_level: usize,

    /// List the site root (home page) in the index.
    #[serde(default = "default_true")]
    pub include_root: bool,

    /// Free-form context below the index header. Falls back to the root page's `llmContext`.
    #[serde(default)]
    pub llm_context: Option<String>,

    /// Site description per language; wins over the root page's description.
    #[serde(default)]
    pub site_descriptions: BTreeMap<String, String>,

    #[serde(default)]
    pub fallback: FallbackTexts,

    #[serde(default)]
    pub extra_sections: Vec<ExtraSection>,

    /// Index buckets.
    #[serde(default)]
    pub categories: Vec<BucketConfig>,

    /// Translation key of the bucket for pages no category claims.
    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default)]
    pub full_content: FullContentConfig,

    #[serde(default)]
    pub full_content_exclusions: ExclusionConfig,

    #[serde(default)]
    pub translations: TranslationTable,

    #[serde(default)]
    pub language_detection: LanguageDetectionConfig,

    #[serde(default)]
    pub node_types: NodeTypes,

    /// Seconds clients may cache served artifacts.
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age: u64,
}

impl Default for LlmsConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            consolidate_languages: true,
            scheme: default_scheme(),
            fallback_domain: None,
            max_depth: default_max_depth(),
            heading_level: default_heading_level(),
            include_root: true,
            llm_context: None,
            site_descriptions: BTreeMap::new(),
            fallback: FallbackTexts::default(),
            extra_sections: Vec::new(),
            categories: Vec::new(),
            default_category: default_category(),
            full_content: FullContentConfig::default(),
            full_content_exclusions: ExclusionConfig::default(),
            translations: TranslationTable::new(),
            language_detection: LanguageDetectionConfig::default(),
            node_types: NodeTypes::default(),
            cache_max_age: default_cache_max_age(),
        }
    }
}

/// Title and description used when the site root provides neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FallbackTexts {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Static markdown section appended after the context block of the index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtraSection {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// A category (index) or group (full content): a named bucket with OR-combined rules.
///
/// Rules are read one by one: a malformed rule is logged and kept as [`MatchRule::Unknown`],
/// which never matches, instead of failing the whole configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBucketConfig")]
pub struct BucketConfig {
    /// Translation key of the bucket title.
    pub name: String,
    /// Lower numbers are evaluated first.
    pub priority: i64,
    pub rules: Vec<MatchRule>,
}

#[derive(Deserialize)]
struct RawBucketConfig {
    name: String,
    #[serde(default = "default_priority")]
    priority: i64,
    #[serde(default)]
    rules: Option<serde_json::Value>,
}

impl From<RawBucketConfig> for BucketConfig {
    fn from(raw: RawBucketConfig) -> Self {
        let rules = match raw.rules {
            None => Vec::new(),
            Some(serde_json::Value::Array(rules)) => rules
                .into_iter()
                .enumerate()
                .map(|(i, rule)| {
                    serde_json::from_value::<MatchRule>(rule).unwrap_or_else(|e| {
                        tracing::warn!("[bucket: {}] Rule #{} is invalid and never matches: {}", raw.name, i + 1, e);
                        MatchRule::Unknown
                    })
                })
                .collect(),
            Some(other) => {
                tracing::warn!("[bucket: {}] Ignoring rules, expected a list but got: {}", raw.name, other);
                Vec::new()
            }
        };
        BucketConfig {
            name: raw.name,
            priority: raw.priority,
            rules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FullContentConfig {
    #[serde(default = "default_full_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub groups: Vec<BucketConfig>,
    /// Translation key for pages no group claims. Unset means such pages stay ungrouped.
    #[serde(default)]
    pub default_group: Option<String>,
}

impl Default for FullContentConfig {
    fn default() -> Self {
        Self {
            max_depth: default_full_max_depth(),
            groups: Vec::new(),
            default_group: None,
        }
    }
}

/// Pages kept out of the full-content document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExclusionConfig {
    #[serde(default)]
    pub path_patterns: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default = "default_true")]
    pub exclude_hidden: bool,
    #[serde(default = "default_true")]
    pub exclude_footer_pages: bool,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            path_patterns: Vec::new(),
            types: Vec::new(),
            exclude_hidden: true,
            exclude_footer_pages: true,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_scheme() -> String {
    "https".into()
}
fn default_max_depth() -> usize {
    5
}
fn default_full_max_depth() -> usize {
    10
}
fn default_heading_level() -> usize {
    2
}
fn clamped_heading_level<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let level = usize::deserialize(deserializer)?;
    let clamped = level.clamp(1, MAX_HEADING_LEVEL);
    if clamped != level {
        tracing::warn!("heading_level {} is out of range, using {}", level, clamped);
    }
    Ok(clamped)
}
fn default_category() -> String {
    "uncategorized".into()
}
fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}
fn default_cache_max_age() -> u64 {
    3600
}

impl LlmsConfig {
    pub fn from_toml_str(toml: &str) -> Result<Self, Error> {
        Ok(toml::from_str(toml)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        tracing::debug!("Loading generation config from {}", path.display());
        Self::from_toml_str(&read_file(path)?)
    }

    /// Configured languages, or a lone `en` when none are configured.
    pub fn effective_languages(&self) -> Vec<LanguageDimension> {
        if self.languages.is_empty() {
            vec![LanguageDimension::new(&self.language_detection.default_language)]
        } else {
            self.languages.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = LlmsConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.heading_level, 2);
        assert_eq!(config.full_content.max_depth, 10);
        assert_eq!(config.scheme, "https");
        assert_eq!(config.cache_max_age, 3600);
        assert_eq!(config.default_category, "uncategorized");
        assert!(config.include_root);
        assert!(config.consolidate_languages);
        assert!(config.full_content_exclusions.exclude_hidden);
        assert!(config.full_content_exclusions.exclude_footer_pages);
        assert_eq!(config.effective_languages(), vec![LanguageDimension::new("en")]);
    }

    #[test]
    fn test_full_config() {
        let config = LlmsConfig::from_toml_str(indoc! {r#"
            fallback_domain = "www.acme.test"
            consolidate_languages = false

            [[languages]]
            id = "en"
            label = "English"

            [[languages]]
            id = "de"
            label = "Deutsch"
            values = ["de", "de_CH"]

            [[categories]]
            name = "features"
            priority = 10
            rules = [
                { type = "path", patterns = ["/features"] },
                { type = "parentRelation", relation = "depth", operator = "lessThan", depth = 2 },
            ]

            [[categories]]
            name = "blog"

            [full_content]
            default_group = "other"

            [[full_content.groups]]
            name = "docs"
            priority = 1
            rules = [{ type = "type", types = ["Acme:Doc"] }]

            [full_content_exclusions]
            path_patterns = ["/legal/*"]
            exclude_hidden = false

            [translations.features]
            en = "Features"
            de = "Funktionen"

            [language_detection]
            strategy = "path"
            path_patterns = [{ pattern = "/de/*", language = "de" }]

            [node_types]
            homepage_types = ["Acme:Home"]

            [node_types.supertypes]
            "Acme:Doc" = ["Acme:Page"]
        "#})
        .unwrap();
        assert_eq!(config.languages.len(), 2);
        assert_eq!(config.languages[1].values, vec!["de", "de_CH"]);
        assert_eq!(config.categories[0].rules.len(), 2);
        assert_eq!(config.categories[1].priority, DEFAULT_PRIORITY);
        assert_eq!(config.full_content.groups[0].name, "docs");
        assert_eq!(config.full_content.default_group.as_deref(), Some("other"));
        assert_eq!(config.full_content_exclusions.path_patterns, vec!["/legal/*"]);
        assert!(!config.full_content_exclusions.exclude_hidden);
        assert_eq!(config.translations["features"]["de"], "Funktionen");
        assert!(config.node_types.is_a("Acme:Doc", "Acme:Page"));
        assert!(!config.consolidate_languages);
    }

    #[test]
    fn test_malformed_rules_are_kept_as_never_matching() {
        let config = LlmsConfig::from_toml_str(indoc! {r#"
            [[categories]]
            name = "features"
            rules = [
                { type = "path", patterns = "/features" },
                { type = "parentRelation", relation = "depth", depth = -1 },
                { type = "always" },
            ]

            [[categories]]
            name = "blog"
            rules = "everything"
        "#})
        .unwrap();
        assert_eq!(
            config.categories[0].rules,
            vec![MatchRule::Unknown, MatchRule::Unknown, MatchRule::Always]
        );
        assert_eq!(config.categories[0].priority, DEFAULT_PRIORITY);
        assert!(config.categories[1].rules.is_empty());
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let config = LlmsConfig::from_toml_str("heading_level = 9223372036854775807").unwrap();
        assert_eq!(config.heading_level, MAX_HEADING_LEVEL);
        let config = LlmsConfig::from_toml_str("heading_level = 0").unwrap();
        assert_eq!(config.heading_level, 1);
        let config = LlmsConfig::from_toml_str("heading_level = 3").unwrap();
        assert_eq!(config.heading_level, 3);
    }

    #[test]
    fn test_invalid_toml() {
        let err = LlmsConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
