//! Ordered provider registry.

use crate::config::ProviderConfig;
use crate::error::{CdnError, CdnResult};

use super::fields::{self, REDACTED};
use super::{CdnProvider, CloudFrontProvider, CloudflareProvider, MaxCdnProvider};

/// Providers in dispatch order. Keys are unique.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn CdnProvider>>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider.
    pub fn builtin() -> Self {
        Self {
            providers: vec![
                Box::new(CloudflareProvider::new()),
                Box::new(CloudFrontProvider::new()),
                Box::new(MaxCdnProvider::new()),
            ],
        }
    }

    /// Append a provider. Fails if its key is already taken.
    pub fn register(&mut self, provider: impl CdnProvider + 'static) -> CdnResult<()> {
        if self.get(provider.key()).is_some() {
            return Err(CdnError::DuplicateProvider(provider.key().to_string()));
        }
        self.providers.push(Box::new(provider));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&dyn CdnProvider> {
        self.providers
            .iter()
            .find(|p| p.key() == key)
            .map(|p| p.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CdnProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Copy of the `key` table safe to print. Secret fields of known
    /// providers are masked; tables of unknown providers are masked entirely.
    pub fn redact(&self, key: &str, config: &ProviderConfig) -> ProviderConfig {
        match self.get(key) {
            Some(provider) => fields::redact(provider.fields(), config),
            None => config
                .field_names()
                .fold(ProviderConfig::new(), |masked, name| masked.with(name, REDACTED)),
        }
    }

    /// Help text listing the example configuration of every provider.
    pub fn example_configuration(&self) -> String {
        let mut text = format!(
            "\nThe example configuration ({}) is:\n",
            crate::config::SETTINGS_FILE
        );
        text.push_str("build_dir   = \"build\"     # default \"build\"\n");
        text.push_str("filter      = \"\\\\.html$\"  # default \".*\"\n");
        text.push_str("after_build = true        # default false\n");
        text.push_str("strict      = false       # default false\n");
        for provider in self.iter() {
            text.push('\n');
            text.push_str(&provider.example_configuration());
        }
        text
    }
}
