use std::path::PathBuf;

use crate::rule_gen::LlmsGenError;

/// Errors from loading the generation inputs (configuration + content snapshot) and from running generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration or content file could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generation configuration is not valid TOML or does not match the expected schema.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// Content snapshot is not valid JSON or does not match the expected schema.
    #[error("Invalid content snapshot: {0}")]
    InvalidContent(#[from] serde_json::Error),

    /// The content snapshot has no sites at all.
    #[error("No sites found in content snapshot")]
    NoSites,

    /// A site identifier that does not exist in the content snapshot.
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    /// Failure inside the generation pipeline.
    #[error(transparent)]
    Generation(#[from] LlmsGenError),

    /// Writing generated output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads a whole file into a string, keeping the path for error reporting.
pub(crate) fn read_file(path: &std::path::Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file_keeps_path() {
        let err = read_file(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::ReadFile { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoSites.to_string(), "No sites found in content snapshot");
        assert_eq!(Error::UnknownSite("acme".into()).to_string(), "Unknown site: acme");
    }
}
