//! Environment lookup used for provider configuration fallbacks.
//!
//! Providers never read the process environment directly; they receive an
//! [`Environment`] so tests can supply a plain map instead.

use std::collections::HashMap;

/// Read-only access to environment variables.
pub trait Environment: Send + Sync {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_environment() {
        let mut env = HashMap::new();
        env.insert("MAXCDN_ALIAS".to_string(), "acme".to_string());

        assert_eq!(env.var("MAXCDN_ALIAS").as_deref(), Some("acme"));
        assert_eq!(env.var("MAXCDN_CONSUMER_KEY"), None);
    }

    #[test]
    fn test_process_environment_missing_key() {
        assert_eq!(ProcessEnv.var("CDNPURGE_TEST_SURELY_UNSET_VARIABLE"), None);
    }
}
