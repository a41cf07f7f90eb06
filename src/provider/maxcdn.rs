//! MaxCDN pull-zone cache purge.
//!
//! One signed `DELETE /{alias}/zones/pull.json/{zone_id}/cache` request per
//! run, listing every path as an indexed `files[N]` form parameter.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use super::error::{ProviderError, ProviderResult};
use super::fields::{FieldSpec, ResolvedConfig};
use super::oauth::{self, Consumer};
use super::CdnProvider;

pub const KEY: &str = "maxcdn";

const API_BASE: &str = "https://rws.maxcdn.com";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("alias").env("MAXCDN_ALIAS"),
    FieldSpec::text("consumer_key").env("MAXCDN_CONSUMER_KEY"),
    FieldSpec::text("consumer_secret")
        .env("MAXCDN_CONSUMER_SECRET")
        .secret(),
    FieldSpec::text("zone_id"),
];

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: u16,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

pub struct MaxCdnProvider {
    client: reqwest::Client,
    api_base: String,
}

impl Default for MaxCdnProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MaxCdnProvider {
    pub fn new() -> Self {
        Self::with_api_base(API_BASE)
    }

    pub fn with_api_base(api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn cache_endpoint(&self, alias: &str, zone_id: &str) -> String {
        format!("{}/{alias}/zones/pull.json/{zone_id}/cache", self.api_base)
    }
}

/// Form parameters naming each file to purge.
pub fn file_params(files: &[String]) -> Vec<(String, String)> {
    files
        .iter()
        .enumerate()
        .map(|(i, file)| (format!("files[{i}]"), file.clone()))
        .collect()
}

fn check_response(status: reqwest::StatusCode, body: &str) -> ProviderResult<()> {
    let parsed: Option<ApiResponse> = serde_json::from_str(body).ok();

    let failed_code = parsed.as_ref().is_some_and(|r| r.code >= 300);
    if status.is_success() && !failed_code {
        return Ok(());
    }

    let message = match parsed.and_then(|r| r.error) {
        Some(ApiError {
            message,
            kind: Some(kind),
        }) => format!("{kind}: {message}"),
        Some(ApiError { message, kind: None }) => message,
        None => status.to_string(),
    };
    Err(ProviderError::Api {
        provider: KEY.to_string(),
        message,
    })
}

#[async_trait]
impl CdnProvider for MaxCdnProvider {
    fn key(&self) -> &str {
        KEY
    }

    fn fields(&self) -> &[FieldSpec] {
        FIELDS
    }

    async fn purge(&self, config: &ResolvedConfig, files: &[String]) -> ProviderResult<()> {
        let endpoint = self.cache_endpoint(&config.text("alias"), &config.text("zone_id"));
        let params = file_params(files);
        let consumer_key = config.text("consumer_key");
        let consumer_secret = config.text("consumer_secret");
        let consumer = Consumer {
            key: &consumer_key,
            secret: &consumer_secret,
        };

        let authorization = oauth::authorization_header(
            "DELETE",
            &endpoint,
            &params,
            &consumer,
            &oauth::nonce(),
            chrono::Utc::now().timestamp(),
        )?;

        tracing::debug!("[maxcdn] purging {} files via {endpoint}", files.len());
        let response = self
            .client
            .delete(&endpoint)
            .header(AUTHORIZATION, authorization)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_response(status, &body)
    }
}
