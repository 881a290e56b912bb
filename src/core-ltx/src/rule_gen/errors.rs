//! Error types for the llms.txt generation pipeline.

use thiserror::Error;

/// Main error type for llms.txt generation operations.
///
/// None of these abort a generation run: callers log them and degrade the single page
/// (or rule) they concern.
#[derive(Debug, Error)]
pub enum LlmsGenError {
    /// No host could be resolved for absolute URLs: no override, no site domain,
    /// no active domain anywhere and no fallback domain.
    #[error("No host resolvable for site '{0}'")]
    NoHostResolvable(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// Shortcut page without a usable target.
    #[error("Shortcut '{0}' has no resolvable target")]
    InvalidShortcutTarget(String),

    /// Regex error
    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    /// Glob pattern error
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),

    /// Matcher rule whose type tag is not known.
    #[error("Unknown matcher rule type")]
    UnknownRule,

    /// Known rule with an unknown sub-kind (operator, relation or comparison).
    #[error("Unknown {0} in matcher rule")]
    UnknownRuleParameter(&'static str),

    /// Property rule without a property name.
    #[error("Property rule is missing the property name")]
    MissingPropertyName,
}

/// Type alias for Result with LlmsGenError
pub type Result<T> = std::result::Result<T, LlmsGenError>;
