//! Init and Config commands.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::{SETTINGS_FILE, Settings};
use crate::error::{CdnError, CdnResult};
use crate::provider::ProviderRegistry;

/// Commented settings file with every provider table disabled.
pub fn settings_template(registry: &ProviderRegistry) -> String {
    let mut out = String::from(
        "# cdnpurge settings\n\
         #\n\
         # Uncomment the table of each CDN to invalidate. Blank credentials fall\n\
         # back to the environment variables named in the comments.\n\
         \n\
         build_dir = \"build\"\n\
         # filter = \"\\\\.html$\"\n\
         after_build = false\n\
         strict = false\n\
         \n\
         [logging]\n\
         default = \"warn\"\n",
    );

    for provider in registry.iter() {
        out.push('\n');
        for line in provider.example_configuration().lines() {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Write the settings template into `dir`.
pub fn write_template(dir: &Path, registry: &ProviderRegistry, force: bool) -> CdnResult<PathBuf> {
    let config_path = dir.join(SETTINGS_FILE);

    if config_path.exists() && !force {
        return Err(CdnError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "{} already exists. Use --force to overwrite",
                config_path.display()
            ),
        )));
    }

    std::fs::write(&config_path, settings_template(registry))?;
    Ok(config_path)
}

/// Run init command - create configuration file in the current directory.
pub fn run_init(force: bool) -> CdnResult<()> {
    let registry = ProviderRegistry::builtin();
    let path = write_template(Path::new("."), &registry, force)?;

    println!("Created configuration file at: {}", path.display());
    println!("Edit this file to enable your CDNs.");
    Ok(())
}

/// Settings with provider credentials masked for display.
pub fn redacted(settings: &Settings, registry: &ProviderRegistry) -> Settings {
    let mut masked = settings.clone();
    masked.providers = settings
        .providers
        .iter()
        .map(|(key, config)| (key.clone(), registry.redact(key, config)))
        .collect();
    masked
}

/// Run config command - display current configuration.
pub fn run_config(loaded: Option<&(PathBuf, Settings)>) {
    let registry = ProviderRegistry::builtin();

    match loaded {
        Some((path, settings)) => {
            println!("Current Configuration ({}):", path.display());
            println!("{}", "=".repeat(50));
            match toml::to_string_pretty(&redacted(settings, &registry)) {
                Ok(toml_str) => println!("{toml_str}"),
                Err(e) => eprintln!("Error displaying config: {e}"),
            }
        }
        None => println!("No {SETTINGS_FILE} found. Run 'cdnpurge init' to create one."),
    }

    println!("{}", registry.example_configuration());
}
