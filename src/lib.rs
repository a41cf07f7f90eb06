//! CDN cache invalidation for generated static sites.
//!
//! After a site build, [`selector::select`] computes the site-relative paths
//! to purge and the [`Invalidator`] hands them to every configured provider
//! in the [`ProviderRegistry`].

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod invalidate;
pub mod logging;
pub mod provider;
pub mod selector;
pub mod status;

pub use config::{CdnOptions, FieldValue, ProviderConfig, Settings};
pub use env::{Environment, ProcessEnv};
pub use error::{CdnError, CdnResult};
pub use invalidate::{CdnHost, Invalidator, ProviderReport, RunSummary, Unconfigured};
pub use provider::{CdnProvider, InvalidationOutcome, ProviderError, ProviderRegistry};
pub use status::StatusReporter;
