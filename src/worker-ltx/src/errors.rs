use data_model_ltx::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The content snapshot has no sites to generate.
    #[error("No sites to generate")]
    NoSites,

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    /// Reading or writing the artifact store failed. Aborts the generation run.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Loading configuration or content failed.
    #[error("{0}")]
    Core(#[from] core_ltx::Error),

    /// A required environment variable is not set.
    #[error("{0} must be set in .env file or present as an env var")]
    MissingEnv(&'static str),

    #[error("{0} has an invalid value: {1}")]
    InvalidEnv(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::UnknownSite("acme".into()).to_string(), "Unknown site: acme");
        assert_eq!(
            Error::MissingEnv("LLMS_CONFIG").to_string(),
            "LLMS_CONFIG must be set in .env file or present as an env var"
        );
        let core: Error = core_ltx::Error::NoSites.into();
        assert_eq!(core.to_string(), "No sites found in content snapshot");
    }
}
