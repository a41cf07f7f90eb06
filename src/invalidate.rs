//! Invalidation run: resolve options, select files, dispatch to providers.
//!
//! Only configuration problems abort a run. Provider failures are reported
//! on the status sink and collected in the [`RunSummary`]; in strict mode
//! they additionally fail the run after every provider has been tried.

use crate::config::CdnOptions;
use crate::env::{Environment, ProcessEnv};
use crate::error::{CdnError, CdnResult};
use crate::provider::{InvalidationOutcome, ProviderRegistry};
use crate::selector;
use crate::status::StatusReporter;

/// Whatever embeds cdnpurge and may carry its options.
pub trait CdnHost {
    /// Options, or `None` when CDN invalidation was never set up.
    fn cdn_options(&self) -> Option<CdnOptions>;
}

/// A host without CDN invalidation set up.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

impl CdnHost for Unconfigured {
    fn cdn_options(&self) -> Option<CdnOptions> {
        None
    }
}

impl CdnHost for crate::config::Settings {
    fn cdn_options(&self) -> Option<CdnOptions> {
        Some(crate::config::Settings::cdn_options(self))
    }
}

/// Outcome of one provider in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReport {
    pub provider: String,
    pub outcome: InvalidationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    /// No file matched; no provider was contacted.
    NothingToInvalidate,
    /// Providers that were dispatched to, in registry order.
    Dispatched {
        files: usize,
        reports: Vec<ProviderReport>,
    },
}

impl RunSummary {
    /// Providers whose outcome was not a success.
    pub fn failures(&self) -> Vec<&ProviderReport> {
        match self {
            RunSummary::NothingToInvalidate => Vec::new(),
            RunSummary::Dispatched { reports, .. } => reports
                .iter()
                .filter(|r| !r.outcome.is_success())
                .collect(),
        }
    }
}

/// Runs invalidations against a provider registry.
pub struct Invalidator {
    registry: ProviderRegistry,
    env: Box<dyn Environment>,
    status: StatusReporter,
}

impl Invalidator {
    /// Invalidator using the process environment and stdout.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            env: Box::new(ProcessEnv),
            status: StatusReporter::stdout(),
        }
    }

    pub fn with_env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_status(mut self, status: StatusReporter) -> Self {
        self.status = status;
        self
    }

    /// Resolve options from `explicit` or `host` and invalidate.
    pub async fn run(
        &mut self,
        explicit: Option<CdnOptions>,
        host: &dyn CdnHost,
    ) -> CdnResult<RunSummary> {
        let options = match explicit.or_else(|| host.cdn_options()) {
            Some(options) => options,
            None => {
                return Err(CdnError::HostIntegrationMissing {
                    help: self.registry.example_configuration(),
                });
            }
        };

        for key in options.providers.keys() {
            if self.registry.get(key).is_none() {
                tracing::warn!("[invalidate] ignoring settings for unknown provider '{key}'");
            }
        }

        let configured = self
            .registry
            .iter()
            .filter(|p| options.provider(p.key()).is_some())
            .count();
        if configured == 0 {
            return Err(CdnError::ConfigurationMissing {
                help: self.registry.example_configuration(),
            });
        }

        let filter = selector::compile_filter(options.filter.as_deref())?;
        let files = selector::select(&options.build_dir, &filter)?;
        if files.is_empty() {
            tracing::info!(
                "[invalidate] no files under {} match {}",
                options.build_dir.display(),
                filter.as_str()
            );
            return Ok(RunSummary::NothingToInvalidate);
        }

        let summary = self.dispatch(&options, &files).await;

        let failed: Vec<String> = summary
            .failures()
            .iter()
            .map(|r| r.provider.clone())
            .collect();
        if options.strict && !failed.is_empty() {
            return Err(CdnError::ProvidersFailed { failed });
        }
        Ok(summary)
    }

    /// Invoke every configured provider in registry order.
    async fn dispatch(&mut self, options: &CdnOptions, files: &[String]) -> RunSummary {
        let mut reports = Vec::new();

        for provider in self.registry.iter() {
            let Some(config) = options.provider(provider.key()) else {
                continue;
            };
            tracing::debug!(
                "[invalidate] dispatching {} files to {}",
                files.len(),
                provider.key()
            );

            let outcome = provider
                .invalidate(config, files, self.env.as_ref(), &mut self.status)
                .await;
            reports.push(ProviderReport {
                provider: provider.key().to_string(),
                outcome,
            });
        }

        RunSummary::Dispatched {
            files: files.len(),
            reports,
        }
    }
}
