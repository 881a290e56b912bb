//! Languages: dimension definitions, request-to-language resolution and UI string translation.

mod language;
mod translator;

pub use language::{
    DetectionStrategy, DomainLanguage, LanguageDetectionConfig, LanguageDetector, LanguageDimension, PathLanguage,
    RequestInfo, parse_accept_language,
};
pub use translator::{FALLBACK_LANGUAGE, TranslationTable, Translator};
