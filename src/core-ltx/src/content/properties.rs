//! Typed access to the dynamic property bag of a page (or content block) variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the properties the generator knows about.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const META_DESCRIPTION: &str = "metaDescription";
    pub const LLM_DESCRIPTION: &str = "llmDescription";
    pub const LLM_CONTEXT: &str = "llmContext";
    pub const EXCLUDE_FROM_FULL_CONTENT: &str = "excludeFromFullContent";
    pub const INCLUDE_IN_OPTIONAL: &str = "includeInOptional";
    pub const INCLUDE_SHORTCUT: &str = "includeShortcut";
    pub const NOINDEX: &str = "noindex";
    pub const TARGET: &str = "target";
    pub const URI_PATH_SEGMENT: &str = "uriPathSegment";
    pub const TEXT: &str = "text";
}

/// Named, arbitrarily-typed properties. Unknown names stay reachable through [`PropertyBag::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, Value>);

static EMPTY: PropertyBag = PropertyBag(BTreeMap::new());

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared bag with no properties, for pages without a variant in the requested language.
    pub fn empty() -> &'static PropertyBag {
        &EMPTY
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Raw value; `None` for absent properties. JSON `null` is reported as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// String value with surrounding whitespace removed; empty strings count as absent.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Boolean flag. Accepts `true`, `1`, `"true"` and `"1"`; everything else (including absence) is false.
    pub fn flag(&self, name: &str) -> bool {
        match self.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
            _ => false,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.string(keys::TITLE)
    }

    pub fn meta_description(&self) -> Option<&str> {
        self.string(keys::META_DESCRIPTION)
    }

    pub fn llm_description(&self) -> Option<&str> {
        self.string(keys::LLM_DESCRIPTION)
    }

    /// Editor-provided description: the LLM-specific one wins over the meta description.
    pub fn description(&self) -> Option<&str> {
        self.llm_description().or_else(|| self.meta_description())
    }

    pub fn llm_context(&self) -> Option<&str> {
        self.string(keys::LLM_CONTEXT)
    }

    pub fn target(&self) -> Option<&str> {
        self.string(keys::TARGET)
    }

    pub fn uri_path_segment(&self) -> Option<&str> {
        self.string(keys::URI_PATH_SEGMENT)
    }

    pub fn text(&self) -> Option<&str> {
        self.string(keys::TEXT)
    }

    pub fn exclude_from_full_content(&self) -> bool {
        self.flag(keys::EXCLUDE_FROM_FULL_CONTENT)
    }

    pub fn include_in_optional(&self) -> bool {
        self.flag(keys::INCLUDE_IN_OPTIONAL)
    }

    pub fn include_shortcut(&self) -> bool {
        self.flag(keys::INCLUDE_SHORTCUT)
    }

    pub fn noindex(&self) -> bool {
        self.flag(keys::NOINDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_accessors_default_safely() {
        let bag = PropertyBag::new();
        assert_eq!(bag.title(), None);
        assert_eq!(bag.description(), None);
        assert!(!bag.exclude_from_full_content());
        assert!(!bag.include_in_optional());
        assert!(!bag.noindex());
    }

    #[test]
    fn test_flag_coercion() {
        let bag = PropertyBag::new()
            .with("a", true)
            .with("b", 1)
            .with("c", "TRUE")
            .with("d", "no")
            .with("e", 0)
            .with("f", Value::Null);
        assert!(bag.flag("a"));
        assert!(bag.flag("b"));
        assert!(bag.flag("c"));
        assert!(!bag.flag("d"));
        assert!(!bag.flag("e"));
        assert!(!bag.flag("f"));
    }

    #[test]
    fn test_description_prefers_llm_description() {
        let bag = PropertyBag::new()
            .with(keys::META_DESCRIPTION, "meta")
            .with(keys::LLM_DESCRIPTION, "llm");
        assert_eq!(bag.description(), Some("llm"));

        let bag = PropertyBag::new()
            .with(keys::META_DESCRIPTION, "meta")
            .with(keys::LLM_DESCRIPTION, "   ");
        assert_eq!(bag.description(), Some("meta"));
    }

    #[test]
    fn test_deserialize_from_json_object() {
        let bag: PropertyBag = serde_json::from_value(json!({"title": "Home", "noindex": true})).unwrap();
        assert_eq!(bag.title(), Some("Home"));
        assert!(bag.noindex());
    }
}
