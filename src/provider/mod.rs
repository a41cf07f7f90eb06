//! CDN provider adapters.
//!
//! Each vendor implements [`CdnProvider`] and is appended to the
//! [`ProviderRegistry`]. The orchestrator only ever talks to the trait.
//!
//! # Architecture
//!
//! ```text
//! Invalidator
//!   - resolves options, selects files
//!   - iterates the registry in order
//!         |
//!    +------------+------------+
//!    |            |            |
//! cloudflare  cloudfront    maxcdn
//!    (each: resolve fields -> purge -> outcome)
//! ```

pub mod cloudflare;
pub mod cloudfront;
mod error;
pub mod fields;
pub mod maxcdn;
pub mod oauth;
mod registry;

pub use cloudflare::CloudflareProvider;
pub use cloudfront::CloudFrontProvider;
pub use error::{ProviderError, ProviderResult};
pub use fields::{FieldKind, FieldSpec, ResolvedConfig};
pub use maxcdn::MaxCdnProvider;
pub use registry::ProviderRegistry;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::env::Environment;
use crate::status::StatusReporter;

/// Result of invalidating through one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationOutcome {
    /// All purge requests were accepted.
    Succeeded { files: usize },
    /// Configuration was incomplete; no request was made.
    Skipped { reason: String },
    /// A purge request failed.
    Failed { message: String },
}

impl InvalidationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvalidationOutcome::Succeeded { .. })
    }
}

/// A CDN vendor that can purge cached paths.
#[async_trait]
pub trait CdnProvider: Send + Sync {
    /// Unique lowercase key, used as the settings table name.
    fn key(&self) -> &str;

    /// Configuration schema.
    fn fields(&self) -> &[FieldSpec];

    /// Issue the purge request(s) for `files`.
    ///
    /// Only called with a configuration that passed validation. Providers
    /// with request size limits split `files` here.
    async fn purge(&self, config: &ResolvedConfig, files: &[String]) -> ProviderResult<()>;

    /// Example settings table for help text.
    fn example_configuration(&self) -> String {
        fields::render_example(self.key(), self.fields())
    }

    /// Validate `config`, purge `files` and report progress to `status`.
    ///
    /// Never fails: configuration and request errors become the outcome.
    async fn invalidate(
        &self,
        config: &ProviderConfig,
        files: &[String],
        env: &dyn Environment,
        status: &mut StatusReporter,
    ) -> InvalidationOutcome {
        let resolved = match fields::resolve(self.key(), self.fields(), config, env) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("[{}] skipped: {e}", self.key());
                status.error_line(self.key(), &format!("Error: {e}"));
                return InvalidationOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        status.begin(self.key(), &format!("Invalidating {} files...", files.len()));
        match self.purge(&resolved, files).await {
            Ok(()) => {
                status.success();
                InvalidationOutcome::Succeeded { files: files.len() }
            }
            Err(e) => {
                tracing::debug!("[{}] purge failed: {e:?}", self.key());
                status.failure(&e.to_string());
                InvalidationOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
