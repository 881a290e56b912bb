use std::collections::BTreeMap;

/// Language every lookup falls back to before giving up.
pub const FALLBACK_LANGUAGE: &str = "en";

/// `key -> language -> text`, as configured under `[translations]`.
pub type TranslationTable = BTreeMap<String, BTreeMap<String, String>>;

/// Resolves display strings for a key in a language.
///
/// Lookup order: requested language, then English, then the first language (in code order)
/// that has the key, then the key itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translator {
    entries: TranslationTable,
}

impl Translator {
    pub fn new(entries: TranslationTable) -> Self {
        Self { entries }
    }

    /// Built-in UI strings with `configured` entries layered on top.
    pub fn with_defaults(configured: &TranslationTable) -> Self {
        let mut entries = default_entries();
        for (key, languages) in configured {
            let slot = entries.entry(key.clone()).or_default();
            for (language, text) in languages {
                slot.insert(language.clone(), text.clone());
            }
        }
        Self { entries }
    }

    pub fn translate(&self, key: &str, language: &str) -> String {
        self.lookup(key, &[language], true)
    }

    pub fn translate_all<S: AsRef<str>>(&self, keys: &[S], language: &str) -> Vec<String> {
        keys.iter().map(|k| self.translate(k.as_ref(), language)).collect()
    }

    /// Tries each of `languages` in order, then English, then returns the key.
    pub fn translate_with_fallbacks<S: AsRef<str>>(&self, key: &str, languages: &[S]) -> String {
        self.lookup(key, languages, false)
    }

    fn lookup<S: AsRef<str>>(&self, key: &str, languages: &[S], any_language: bool) -> String {
        let Some(by_language) = self.entries.get(key) else {
            return key.to_string();
        };
        languages
            .iter()
            .map(AsRef::as_ref)
            .chain(std::iter::once(FALLBACK_LANGUAGE))
            .find_map(|language| by_language.get(language))
            .or_else(|| if any_language { by_language.values().next() } else { None })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|l| !l.is_empty())
    }
}

fn default_entries() -> TranslationTable {
    const DEFAULTS: &[(&str, &str, &str)] = &[
        ("main_pages", "Main Pages", "Hauptseiten"),
        ("uncategorized", "Other Pages", "Weitere Seiten"),
        ("optional", "Optional", "Optional"),
        ("external_resources", "External Resources", "Externe Ressourcen"),
        ("generated_at", "Generated at", "Erstellt am"),
        ("languages", "Languages", "Sprachen"),
        ("url", "URL", "URL"),
        ("other", "Other", "Sonstiges"),
    ];
    DEFAULTS
        .iter()
        .map(|(key, en, de)| {
            let languages = BTreeMap::from([("en".to_string(), en.to_string()), ("de".to_string(), de.to_string())]);
            (key.to_string(), languages)
        })
        .collect()
}
