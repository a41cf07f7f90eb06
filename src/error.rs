//! Top-level errors that abort an invalidation run.
//!
//! Per-provider failures live in [`crate::provider::ProviderError`] and never
//! surface here, except as [`CdnError::ProvidersFailed`] in strict mode.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdnError {
    #[error("ERROR: You need to set up {file} to enable CDN invalidation.\n{help}", file = crate::config::SETTINGS_FILE)]
    HostIntegrationMissing { help: String },

    #[error("ERROR: You must specify a config for one of the supported CDNs.\n{help}")]
    ConfigurationMissing { help: String },

    #[error("Invalid filter pattern '{pattern}'")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Cannot read build directory {}: {reason}", path.display())]
    BuildDirectory { path: PathBuf, reason: String },

    #[error("Settings file not found: {}", .0.display())]
    SettingsNotFound(PathBuf),

    #[error("Invalid settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    #[error("Provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("Invalidation failed for: {}", failed.join(", "))]
    ProvidersFailed { failed: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CdnResult<T> = Result<T, CdnError>;
