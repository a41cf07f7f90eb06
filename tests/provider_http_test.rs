use std::collections::HashMap;
use std::time::Duration;

use cdnpurge::provider::maxcdn::file_params;
use cdnpurge::provider::oauth::{self, Consumer};
use cdnpurge::provider::{CloudFrontProvider, CloudflareProvider, MaxCdnProvider};
use cdnpurge::{CdnProvider, FieldValue, InvalidationOutcome, ProviderConfig, StatusReporter};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pages(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("/page-{i}.html")).collect()
}

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

async fn invalidate(
    provider: &dyn CdnProvider,
    config: &ProviderConfig,
    files: &[String],
) -> (InvalidationOutcome, String) {
    let (mut status, buffer) = StatusReporter::buffered();
    let outcome = provider
        .invalidate(config, files, &no_env(), &mut status)
        .await;
    (outcome, buffer.contents())
}

fn cloudflare_config() -> ProviderConfig {
    ProviderConfig::new()
        .with("zone_id", "zone-1")
        .with("email", "ops@example.com")
        .with("client_api_key", "cf-key")
        .with(
            "base_urls",
            vec![
                "https://example.com".to_string(),
                "https://www.example.com/".to_string(),
            ],
        )
}

#[tokio::test]
async fn test_cloudflare_sends_sequential_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone-1/purge_cache"))
        .and(header("X-Auth-Email", "ops@example.com"))
        .and(header("X-Auth-Key", "cf-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": {"id": "zone-1"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let provider = CloudflareProvider::with_api_base(&server.uri());
    let files = pages(35);
    let (outcome, status) = invalidate(&provider, &cloudflare_config(), &files).await;

    assert_eq!(outcome, InvalidationOutcome::Succeeded { files: 35 });
    assert_eq!(status, "[cloudflare] Invalidating 35 files... ✔\n");

    let requests = server.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["files"].as_array().unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![30, 30, 10]);

    let first: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(first["files"][0], "https://example.com/page-0.html");
    let last: Value = serde_json::from_slice(&requests[2].body).unwrap();
    assert_eq!(last["files"][9], "https://www.example.com/page-34.html");
}

#[tokio::test]
async fn test_cloudflare_unsuccessful_response_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone-1/purge_cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{"code": 1012, "message": "Request must contain files"}],
            "messages": [],
            "result": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = CloudflareProvider::with_api_base(&server.uri());
    let (outcome, status) = invalidate(&provider, &cloudflare_config(), &pages(40)).await;

    assert_eq!(
        outcome,
        InvalidationOutcome::Failed {
            message: "cloudflare rejected the request: Request must contain files (code 1012)"
                .to_string()
        }
    );
    assert!(status.starts_with("[cloudflare] Invalidating 40 files..., error: "));
}

#[tokio::test]
async fn test_cloudflare_gateway_error_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(502).set_body_raw("<html>Bad Gateway</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let provider = CloudflareProvider::with_api_base(&server.uri());
    let (outcome, _) = invalidate(&provider, &cloudflare_config(), &pages(1)).await;

    assert_eq!(
        outcome,
        InvalidationOutcome::Failed {
            message: "cloudflare rejected the request: 502 Bad Gateway".to_string()
        }
    );
}

fn oauth_params(header: &str) -> HashMap<String, String> {
    header
        .trim_start_matches("OAuth ")
        .split(", ")
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| {
            let value = urlencoding::decode(value.trim_matches('"')).unwrap();
            (key.to_string(), value.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn test_maxcdn_sends_signed_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/acme/zones/pull.json/12345/cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = MaxCdnProvider::with_api_base(&server.uri());
    let config = ProviderConfig::new()
        .with("alias", "acme")
        .with("consumer_key", "ck")
        .with("consumer_secret", "cs")
        .with("zone_id", FieldValue::Integer(12345));
    let files = vec!["/".to_string(), "/index.html".to_string()];
    let (outcome, status) = invalidate(&provider, &config, &files).await;

    assert_eq!(outcome, InvalidationOutcome::Succeeded { files: 2 });
    assert_eq!(status, "[maxcdn] Invalidating 2 files... ✔\n");

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];

    let body = String::from_utf8(request.body.clone()).unwrap();
    assert_eq!(body, "files%5B0%5D=%2F&files%5B1%5D=%2Findex.html");

    let authorization = request
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(authorization.starts_with("OAuth "));

    let params = oauth_params(authorization);
    assert_eq!(params["oauth_consumer_key"], "ck");
    assert_eq!(params["oauth_signature_method"], "HMAC-SHA1");

    let endpoint = format!("{}/acme/zones/pull.json/12345/cache", server.uri());
    let expected = oauth::authorization_header(
        "DELETE",
        &endpoint,
        &file_params(&files),
        &Consumer {
            key: "ck",
            secret: "cs",
        },
        &params["oauth_nonce"],
        params["oauth_timestamp"].parse().unwrap(),
    )
    .unwrap();
    assert_eq!(authorization, expected);
}

#[tokio::test]
async fn test_maxcdn_rejection_fails() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "error": {"message": "Invalid consumer key", "type": "unauthorized"}
        })))
        .mount(&server)
        .await;

    let provider = MaxCdnProvider::with_api_base(&server.uri());
    let config = ProviderConfig::new()
        .with("alias", "acme")
        .with("consumer_key", "ck")
        .with("consumer_secret", "cs")
        .with("zone_id", "12345");
    let (outcome, _) = invalidate(&provider, &config, &pages(1)).await;

    assert_eq!(
        outcome,
        InvalidationOutcome::Failed {
            message: "maxcdn rejected the request: unauthorized: Invalid consumer key".to_string()
        }
    );
}

const DISTRIBUTION: &str = "E2EXAMPLE";

fn invalidation_xml(status: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Invalidation xmlns="http://cloudfront.amazonaws.com/doc/2020-05-31/">
  <Id>I2EXAMPLE</Id>
  <Status>{status}</Status>
  <CreateTime>2024-01-01T00:00:00Z</CreateTime>
  <InvalidationBatch>
    <Paths>
      <Quantity>1</Quantity>
      <Items><Path>/page-0.html</Path></Items>
    </Paths>
    <CallerReference>cdnpurge-0-0</CallerReference>
  </InvalidationBatch>
</Invalidation>"#
    )
}

fn cloudfront_config() -> ProviderConfig {
    ProviderConfig::new()
        .with("access_key_id", "AKIDEXAMPLE")
        .with("secret_access_key", "wJalrXUtnFEMI")
        .with("distribution_id", DISTRIBUTION)
}

fn cloudfront(server: &MockServer) -> CloudFrontProvider {
    CloudFrontProvider::new()
        .with_endpoint_url(&server.uri())
        .with_poll_interval(Duration::from_millis(10))
}

async fn mount_create(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/2020-05-31/distribution/{DISTRIBUTION}/invalidation")))
        .respond_with(
            ResponseTemplate::new(201).set_body_raw(invalidation_xml("InProgress"), "text/xml"),
        )
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cloudfront_single_batch_does_not_wait() {
    let server = MockServer::start().await;
    mount_create(&server, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(invalidation_xml("Completed"), "text/xml"))
        .expect(0)
        .mount(&server)
        .await;

    let (outcome, status) = invalidate(&cloudfront(&server), &cloudfront_config(), &pages(3)).await;

    assert_eq!(outcome, InvalidationOutcome::Succeeded { files: 3 });
    assert_eq!(status, "[cloudfront] Invalidating 3 files... ✔\n");
}

#[tokio::test]
async fn test_cloudfront_waits_for_completion_between_batches() {
    let server = MockServer::start().await;
    mount_create(&server, 2).await;

    let get_path = format!("/2020-05-31/distribution/{DISTRIBUTION}/invalidation/I2EXAMPLE");
    Mock::given(method("GET"))
        .and(path(get_path.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(invalidation_xml("InProgress"), "text/xml"),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(get_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(invalidation_xml("Completed"), "text/xml"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (outcome, _) = invalidate(&cloudfront(&server), &cloudfront_config(), &pages(1001)).await;
    assert_eq!(outcome, InvalidationOutcome::Succeeded { files: 1001 });

    let methods: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.method.to_string())
        .collect();
    assert_eq!(methods, vec!["POST", "GET", "GET", "POST"]);
}
