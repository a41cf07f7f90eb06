//! Provider configuration schema and validation.
//!
//! Each provider declares its fields as a static [`FieldSpec`] list. The same
//! list drives environment fallback, required-field validation and the
//! example configuration shown in help and error messages.

use std::collections::BTreeMap;

use crate::config::{FieldValue, ProviderConfig};
use crate::env::Environment;

use super::error::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Comma separated when read from the environment.
    List,
}

/// One configuration field of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Environment variable consulted when the field is blank.
    pub env_var: Option<&'static str>,
    pub required: bool,
    /// Value shown in the example configuration.
    pub placeholder: &'static str,
    /// Credential that must never be echoed back to the user.
    pub secret: bool,
}

impl FieldSpec {
    /// A required text field.
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            env_var: None,
            required: true,
            placeholder: "\"...\"",
            secret: false,
        }
    }

    /// A required list field.
    pub const fn list(name: &'static str, placeholder: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List,
            env_var: None,
            required: true,
            placeholder,
            secret: false,
        }
    }

    pub const fn env(mut self, var: &'static str) -> Self {
        self.env_var = Some(var);
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn comment(&self) -> Option<String> {
        match (self.env_var, self.required) {
            (Some(var), _) => Some(format!("# default ${var}")),
            (None, false) => Some("# optional".to_string()),
            (None, true) => None,
        }
    }
}

/// Provider configuration after environment fallback and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    provider: String,
    values: BTreeMap<&'static str, FieldValue>,
}

impl ResolvedConfig {
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Text value of `field`; empty for absent optional fields.
    pub fn text(&self, field: &str) -> String {
        self.values
            .get(field)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
    }

    /// List value of `field`; empty for absent optional fields.
    pub fn list(&self, field: &str) -> Vec<String> {
        self.values
            .get(field)
            .map(FieldValue::as_list)
            .unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }
}

fn from_env(field: &FieldSpec, env: &dyn Environment) -> Option<FieldValue> {
    let raw = env.var(field.env_var?)?;
    match field.kind {
        FieldKind::Text => {
            let value = raw.trim();
            (!value.is_empty()).then(|| FieldValue::Text(value.to_string()))
        }
        FieldKind::List => {
            let items: Vec<String> = raw
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
    }
}

/// Fill blank fields from the environment and check required ones.
///
/// Fails on the first required field that is still blank, in declaration
/// order.
pub fn resolve(
    provider: &str,
    fields: &[FieldSpec],
    config: &ProviderConfig,
    env: &dyn Environment,
) -> ProviderResult<ResolvedConfig> {
    let mut values = BTreeMap::new();

    for field in fields {
        let supplied = match field.kind {
            FieldKind::Text => config.text(field.name).map(FieldValue::Text),
            FieldKind::List => config.list(field.name).map(FieldValue::List),
        };

        match supplied.or_else(|| from_env(field, env)) {
            Some(value) => {
                values.insert(field.name, value);
            }
            None if field.required => {
                return Err(ProviderError::ConfigIncomplete {
                    provider: provider.to_string(),
                    field: field.name.to_string(),
                });
            }
            None => {}
        }
    }

    Ok(ResolvedConfig {
        provider: provider.to_string(),
        values,
    })
}

/// Replacement shown for masked configuration values.
pub const REDACTED: &str = "***";

/// Copy of `config` with every secret field that is set replaced by
/// [`REDACTED`].
pub fn redact(fields: &[FieldSpec], config: &ProviderConfig) -> ProviderConfig {
    let mut masked = config.clone();
    for field in fields.iter().filter(|f| f.secret) {
        if config.get(field.name).is_some() {
            masked.set(field.name, REDACTED);
        }
    }
    masked
}

/// TOML example for one provider, e.g.
///
/// ```text
/// [providers.maxcdn]
/// alias           = "..."  # default $MAXCDN_ALIAS
/// zone_id         = "..."
/// ```
pub fn render_example(provider: &str, fields: &[FieldSpec]) -> String {
    let width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let mut out = format!("[providers.{provider}]\n");

    for field in fields {
        let line = format!("{:<width$} = {}", field.name, field.placeholder);
        match field.comment() {
            Some(comment) => out.push_str(&format!("{line}  {comment}\n")),
            None => out.push_str(&format!("{line}\n")),
        }
    }
    out
}
