use std::process::ExitCode;

use clap::Parser;

use cdnpurge::cli::commands::{init, invalidate};
use cdnpurge::cli::{Cli, Commands};
use cdnpurge::config::{LoggingConfig, Settings};
use cdnpurge::logging;

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = Settings::discover(cli.config.as_deref())?;

    let logging_config = loaded
        .as_ref()
        .map(|(_, settings)| settings.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    logging::init_with_config(&logging_config);

    if let Some((path, _)) = &loaded {
        tracing::debug!("[config] loaded {}", path.display());
    }

    match cli.command {
        Commands::Invalidate {
            filter,
            build_dir,
            strict,
        } => {
            let args = invalidate::InvalidateArgs {
                filter,
                build_dir,
                strict,
            };
            invalidate::run_invalidate(loaded.map(|(_, settings)| settings), &args).await?;
        }
        Commands::AfterBuild => {
            invalidate::run_after_build(loaded.map(|(_, settings)| settings)).await?;
        }
        Commands::Init { force } => init::run_init(force)?,
        Commands::Config => init::run_config(loaded.as_ref()),
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
