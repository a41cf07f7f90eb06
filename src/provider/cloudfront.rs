//! AWS CloudFront distribution invalidation.
//!
//! CloudFront accepts at most [`MAX_PATHS_PER_BATCH`] paths per invalidation
//! and limits concurrent invalidations per distribution. A single batch is
//! created and left to finish on its own; when several batches are needed,
//! each one is awaited until CloudFront reports it `Completed` before the
//! next is created.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};

use super::error::{ProviderError, ProviderResult};
use super::fields::{FieldSpec, ResolvedConfig};
use super::CdnProvider;

pub const KEY: &str = "cloudfront";

/// CloudFront's per-invalidation path limit.
pub const MAX_PATHS_PER_BATCH: usize = 1000;

const POLL_INTERVAL: Duration = Duration::from_secs(15);

const COMPLETED: &str = "Completed";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("access_key_id").env("AWS_ACCESS_KEY_ID"),
    FieldSpec::text("secret_access_key")
        .env("AWS_SECRET_ACCESS_KEY")
        .secret(),
    FieldSpec::text("distribution_id"),
];

pub struct CloudFrontProvider {
    poll_interval: Duration,
    endpoint_url: Option<String>,
}

impl Default for CloudFrontProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudFrontProvider {
    pub fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            endpoint_url: None,
        }
    }

    /// Override how often a pending batch is polled.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Send API calls to `endpoint_url` instead of the public CloudFront endpoint.
    pub fn with_endpoint_url(mut self, endpoint_url: &str) -> Self {
        self.endpoint_url = Some(endpoint_url.to_string());
        self
    }

    fn client(&self, config: &ResolvedConfig) -> Client {
        let credentials = Credentials::new(
            config.text("access_key_id"),
            config.text("secret_access_key"),
            None,
            None,
            "cdnpurge",
        );
        // CloudFront is a global service homed in us-east-1
        let mut builder = aws_sdk_cloudfront::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials);
        if let Some(endpoint_url) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        Client::from_conf(builder.build())
    }

    async fn wait_until_completed(
        &self,
        client: &Client,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> ProviderResult<()> {
        loop {
            let output = client
                .get_invalidation()
                .distribution_id(distribution_id)
                .id(invalidation_id)
                .send()
                .await
                .map_err(aws_error)?;

            let status = output.invalidation().map(|i| i.status()).unwrap_or_default();
            if status == COMPLETED {
                return Ok(());
            }
            tracing::debug!("[cloudfront] invalidation {invalidation_id} is {status}, waiting");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn aws_error<E: std::error::Error>(e: E) -> ProviderError {
    ProviderError::Aws(DisplayErrorContext(e).to_string())
}

/// Split `files` into invalidation batches.
pub fn batches(files: &[String]) -> Vec<&[String]> {
    files.chunks(MAX_PATHS_PER_BATCH).collect()
}

/// Unique caller reference for one batch of a run.
fn caller_reference(batch: usize) -> String {
    format!(
        "cdnpurge-{}-{batch}",
        chrono::Utc::now().timestamp_millis()
    )
}

fn invalidation_batch(paths: &[String], batch: usize) -> ProviderResult<InvalidationBatch> {
    let paths = Paths::builder()
        .quantity(paths.len() as i32)
        .set_items(Some(paths.to_vec()))
        .build()
        .map_err(aws_error)?;

    InvalidationBatch::builder()
        .paths(paths)
        .caller_reference(caller_reference(batch))
        .build()
        .map_err(aws_error)
}

#[async_trait]
impl CdnProvider for CloudFrontProvider {
    fn key(&self) -> &str {
        KEY
    }

    fn fields(&self) -> &[FieldSpec] {
        FIELDS
    }

    async fn purge(&self, config: &ResolvedConfig, files: &[String]) -> ProviderResult<()> {
        let client = self.client(config);
        let distribution_id = config.text("distribution_id");
        let batches = batches(files);
        let sequential = batches.len() > 1;

        for (index, paths) in batches.iter().enumerate() {
            let output = client
                .create_invalidation()
                .distribution_id(&distribution_id)
                .invalidation_batch(invalidation_batch(paths, index)?)
                .send()
                .await
                .map_err(aws_error)?;

            let invalidation_id = output
                .invalidation()
                .map(|i| i.id().to_string())
                .unwrap_or_default();
            tracing::debug!(
                "[cloudfront] created invalidation {invalidation_id} for {} paths",
                paths.len()
            );

            let is_last = index + 1 == batches.len();
            if sequential && !is_last {
                self.wait_until_completed(&client, &distribution_id, &invalidation_id)
                    .await?;
            }
        }
        Ok(())
    }
}
