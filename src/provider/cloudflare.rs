//! Cloudflare zone cache purge.
//!
//! Cloudflare purges by absolute URL, so every site path is expanded against
//! each configured base URL. The API accepts at most
//! [`MAX_FILES_PER_REQUEST`] URLs per call; larger sets are sent in
//! sequential chunks.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::error::{ProviderError, ProviderResult};
use super::fields::{FieldSpec, ResolvedConfig};
use super::CdnProvider;

pub const KEY: &str = "cloudflare";

const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Cloudflare's per-request URL limit for purge by file.
pub const MAX_FILES_PER_REQUEST: usize = 30;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("zone_id").env("CLOUDFLARE_ZONE_ID"),
    FieldSpec::text("email").env("CLOUDFLARE_EMAIL"),
    FieldSpec::text("client_api_key")
        .env("CLOUDFLARE_CLIENT_API_KEY")
        .secret(),
    FieldSpec::list("base_urls", "[\"https://example.com\", \"https://www.example.com\"]"),
];

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

pub struct CloudflareProvider {
    client: reqwest::Client,
    api_base: String,
}

impl Default for CloudflareProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudflareProvider {
    pub fn new() -> Self {
        Self::with_api_base(API_BASE)
    }

    /// Provider talking to a different API root (proxies, test servers).
    pub fn with_api_base(api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn purge_endpoint(&self, zone_id: &str) -> String {
        format!("{}/zones/{zone_id}/purge_cache", self.api_base)
    }
}

/// Absolute URLs for every path under every base URL.
pub fn purge_urls(base_urls: &[String], files: &[String]) -> Vec<String> {
    base_urls
        .iter()
        .map(|base| base.trim_end_matches('/'))
        .flat_map(|base| files.iter().map(move |file| format!("{base}{file}")))
        .collect()
}

fn api_error(response: ApiResponse) -> ProviderError {
    let message = if response.errors.is_empty() {
        "purge was not successful".to_string()
    } else {
        response
            .errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ")
    };
    ProviderError::Api {
        provider: KEY.to_string(),
        message,
    }
}

fn check_response(status: reqwest::StatusCode, body: &str) -> ProviderResult<()> {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(response) if response.success && status.is_success() => Ok(()),
        Ok(response) if !response.success => Err(api_error(response)),
        _ => Err(ProviderError::Api {
            provider: KEY.to_string(),
            message: status.to_string(),
        }),
    }
}

#[async_trait]
impl CdnProvider for CloudflareProvider {
    fn key(&self) -> &str {
        KEY
    }

    fn fields(&self) -> &[FieldSpec] {
        FIELDS
    }

    async fn purge(&self, config: &ResolvedConfig, files: &[String]) -> ProviderResult<()> {
        let endpoint = self.purge_endpoint(&config.text("zone_id"));
        let email = config.text("email");
        let api_key = config.text("client_api_key");
        let urls = purge_urls(&config.list("base_urls"), files);

        for (index, chunk) in urls.chunks(MAX_FILES_PER_REQUEST).enumerate() {
            tracing::debug!(
                "[cloudflare] purge request {} with {} urls",
                index + 1,
                chunk.len()
            );
            let response = self
                .client
                .post(&endpoint)
                .header("X-Auth-Email", &email)
                .header("X-Auth-Key", &api_key)
                .json(&json!({ "files": chunk }))
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            check_response(status, &body)?;
        }
        Ok(())
    }
}
