use thiserror::Error;

/// Errors local to one provider. They are reported as status text and never
/// abort sibling providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Configuration key {provider}[:{field}] is missing.")]
    ConfigIncomplete { provider: String, field: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} rejected the request: {message}")]
    Api { provider: String, message: String },

    #[error("{0}")]
    Aws(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),
}

impl ProviderError {
    /// Whether this is a configuration problem rather than a request failure.
    pub fn is_config(&self) -> bool {
        matches!(self, ProviderError::ConfigIncomplete { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
