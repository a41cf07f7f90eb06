//! Invalidate and AfterBuild commands.

use std::path::PathBuf;

use crate::config::Settings;
use crate::error::CdnResult;
use crate::invalidate::{CdnHost, Invalidator, RunSummary, Unconfigured};
use crate::provider::ProviderRegistry;

/// Command-line overrides for a run.
#[derive(Debug, Default, Clone)]
pub struct InvalidateArgs {
    pub filter: Option<String>,
    pub build_dir: Option<PathBuf>,
    pub strict: bool,
}

impl InvalidateArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(filter) = &self.filter {
            settings.filter = Some(filter.clone());
        }
        if let Some(build_dir) = &self.build_dir {
            settings.build_dir = build_dir.clone();
        }
        settings.strict |= self.strict;
    }
}

/// Run invalidate command against the built-in providers.
pub async fn run_invalidate(
    settings: Option<Settings>,
    args: &InvalidateArgs,
) -> CdnResult<RunSummary> {
    let host: Box<dyn CdnHost> = match settings {
        Some(mut settings) => {
            args.apply(&mut settings);
            Box::new(settings)
        }
        None => Box::new(Unconfigured),
    };

    let mut invalidator = Invalidator::new(ProviderRegistry::builtin());
    let summary = invalidator.run(None, host.as_ref()).await?;

    match &summary {
        RunSummary::NothingToInvalidate => println!("No files to invalidate."),
        RunSummary::Dispatched { reports, .. } => {
            let failed = summary.failures().len();
            if failed > 0 {
                tracing::warn!(
                    "[invalidate] {failed} of {} providers did not succeed",
                    reports.len()
                );
            }
        }
    }
    Ok(summary)
}

/// Run after-build hook: invalidate only when enabled in settings.
pub async fn run_after_build(settings: Option<Settings>) -> CdnResult<Option<RunSummary>> {
    match settings {
        Some(settings) if settings.after_build => {
            run_invalidate(Some(settings), &InvalidateArgs::default())
                .await
                .map(Some)
        }
        Some(_) => {
            tracing::info!("[after-build] after_build is disabled, skipping invalidation");
            Ok(None)
        }
        None => {
            tracing::info!("[after-build] no settings file, skipping invalidation");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut settings = Settings::default();
        let args = InvalidateArgs {
            filter: Some("\\.css$".to_string()),
            build_dir: Some(PathBuf::from("public")),
            strict: true,
        };
        args.apply(&mut settings);

        assert_eq!(settings.filter.as_deref(), Some("\\.css$"));
        assert_eq!(settings.build_dir, PathBuf::from("public"));
        assert!(settings.strict);
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let mut settings = Settings {
            filter: Some("\\.html$".to_string()),
            strict: true,
            ..Settings::default()
        };
        InvalidateArgs::default().apply(&mut settings);

        assert_eq!(settings.filter.as_deref(), Some("\\.html$"));
        assert!(settings.strict);
    }

    #[tokio::test]
    async fn test_after_build_disabled_is_noop() {
        let settings = Settings::default();
        assert_eq!(run_after_build(Some(settings)).await.unwrap(), None);
        assert_eq!(run_after_build(None).await.unwrap(), None);
    }
}
