//! Configuration for cdnpurge.
//!
//! Settings are layered with figment:
//! - Default values
//! - `cdn.toml` (found by walking up from the current directory, or `--config`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CDN_` and use double underscores
//! to separate nested levels:
//! - `CDN_BUILD_DIR=public` sets `build_dir`
//! - `CDN_PROVIDERS__MAXCDN__ZONE_ID=1234` sets `providers.maxcdn.zone_id`
//!
//! These are distinct from the per-provider fallbacks such as `MAXCDN_ALIAS`,
//! which are applied when a provider resolves its own fields.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{CdnError, CdnResult};

/// Name of the settings file looked up in the current directory and its ancestors.
pub const SETTINGS_FILE: &str = "cdn.toml";

/// Default build output directory, relative to the settings file.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// A single configuration value as it appears in a provider table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
}

impl FieldValue {
    /// Scalar value as text. Integers are rendered, lists yield `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::List(_) => None,
        }
    }

    /// List value. A scalar counts as a one-element list.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items.clone(),
            other => other.as_text().into_iter().collect(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Raw configuration for one provider, keyed by field name.
///
/// Values may be blank or missing; providers fill gaps from the environment
/// before validating (see [`crate::provider::fields::resolve`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig(BTreeMap<String, FieldValue>);

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Non-blank scalar value of `field`.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field)
            .and_then(FieldValue::as_text)
            .filter(|value| !value.trim().is_empty())
    }

    /// Non-blank entries of `field`, or `None` when there are none.
    pub fn list(&self, field: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .get(field)?
            .as_list()
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .collect();
        (!items.is_empty()).then_some(items)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the fields present in this table.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Options for one invalidation run.
///
/// This is what a host hands to the [`crate::Invalidator`]; the CLI builds it
/// from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct CdnOptions {
    /// Build output root to scan.
    pub build_dir: PathBuf,
    /// Regex over root-relative paths. `None` matches everything.
    pub filter: Option<String>,
    /// Turn per-provider failures into a failed run.
    pub strict: bool,
    /// Configuration slots keyed by provider key. A present slot marks the
    /// provider as configured.
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl Default for CdnOptions {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            filter: None,
            strict: false,
            providers: BTreeMap::new(),
        }
    }
}

impl CdnOptions {
    /// Builder-style provider slot.
    pub fn with_provider(mut self, key: &str, config: ProviderConfig) -> Self {
        self.providers.insert(key.to_string(), config);
        self
    }

    pub fn provider(&self, key: &str) -> Option<&ProviderConfig> {
        self.providers.get(key)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Build output directory
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Regex selecting which files are invalidated (default: everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Whether `cdnpurge after-build` should invalidate
    #[serde(default)]
    pub after_build: bool,

    /// Exit nonzero when any provider fails
    #[serde(default)]
    pub strict: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-provider configuration tables
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `cdnpurge::provider = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_DIR)
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            filter: None,
            after_build: false,
            strict: false,
            logging: LoggingConfig::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from the nearest `cdn.toml`, or from `explicit` when given.
    ///
    /// Returns `Ok(None)` when no settings file exists, which means the
    /// project has not set up CDN invalidation.
    pub fn discover(explicit: Option<&Path>) -> CdnResult<Option<(PathBuf, Settings)>> {
        let path = match explicit {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => return Err(CdnError::SettingsNotFound(path.to_path_buf())),
            None => match Self::find_settings_file() {
                Some(path) => path,
                None => return Ok(None),
            },
        };

        let mut settings = Self::load_from(&path)?;
        // build_dir is relative to the settings file, not the caller's cwd
        if settings.build_dir.is_relative() {
            if let Some(parent) = path.parent() {
                settings.build_dir = parent.join(&settings.build_dir);
            }
        }
        Ok(Some((path, settings)))
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CDN_").split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Find `cdn.toml` in the current directory or its ancestors.
    fn find_settings_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|dir| dir.join(SETTINGS_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Options for an invalidation run.
    pub fn cdn_options(&self) -> CdnOptions {
        CdnOptions {
            build_dir: self.build_dir.clone(),
            filter: self.filter.clone(),
            strict: self.strict,
            providers: self.providers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.build_dir, PathBuf::from("build"));
        assert!(settings.filter.is_none());
        assert!(!settings.after_build);
        assert!(settings.providers.is_empty());
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cdn.toml");

        let toml_content = r#"
build_dir = "public"
filter = "\\.html$"
after_build = true

[providers.maxcdn]
alias = "acme"
zone_id = 12345

[providers.cloudflare]
base_urls = ["https://example.com", "https://www.example.com"]
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.build_dir, PathBuf::from("public"));
        assert_eq!(settings.filter.as_deref(), Some("\\.html$"));
        assert!(settings.after_build);

        let maxcdn = &settings.providers["maxcdn"];
        assert_eq!(maxcdn.text("alias").as_deref(), Some("acme"));
        assert_eq!(maxcdn.text("zone_id").as_deref(), Some("12345"));

        let cloudflare = &settings.providers["cloudflare"];
        assert_eq!(
            cloudflare.list("base_urls").unwrap(),
            vec!["https://example.com", "https://www.example.com"]
        );
    }

    #[test]
    fn test_empty_provider_table_is_a_slot() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cdn.toml");
        fs::write(&config_path, "[providers.cloudfront]\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        let options = settings.cdn_options();
        assert!(options.provider("cloudfront").is_some());
        assert!(options.provider("maxcdn").is_none());
    }

    #[test]
    fn test_discover_explicit_path_resolves_build_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("site.toml");
        fs::write(&config_path, "build_dir = \"out\"\n").unwrap();

        let (path, settings) = Settings::discover(Some(&config_path)).unwrap().unwrap();
        assert_eq!(path, config_path);
        assert_eq!(settings.build_dir, temp_dir.path().join("out"));
    }

    #[test]
    fn test_discover_explicit_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        let err = Settings::discover(Some(&missing)).unwrap_err();
        assert!(matches!(err, CdnError::SettingsNotFound(_)));
    }

    #[test]
    fn test_provider_config_blank_values() {
        let config = ProviderConfig::new()
            .with("alias", "  ")
            .with("base_urls", vec![String::new()]);

        assert_eq!(config.text("alias"), None);
        assert_eq!(config.list("base_urls"), None);
        assert_eq!(config.text("missing"), None);
    }

    #[test]
    fn test_scalar_counts_as_list() {
        let config = ProviderConfig::new().with("base_urls", "https://example.com");
        assert_eq!(
            config.list("base_urls").unwrap(),
            vec!["https://example.com".to_string()]
        );
    }
}
