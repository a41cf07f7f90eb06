//! Two-legged OAuth 1.0a request signing (HMAC-SHA1), as required by the
//! MaxCDN REST API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::error::{ProviderError, ProviderResult};

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 percent-encoding; only unreserved characters stay literal.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Signature base string: `METHOD&url&sorted-params`.
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

/// Base64 HMAC-SHA1 of `base` keyed with the consumer and token secrets.
pub fn sign(base: &str, consumer_secret: &str, token_secret: Option<&str>) -> ProviderResult<String> {
    let key = format!(
        "{}&{}",
        encode(consumer_secret),
        encode(token_secret.unwrap_or_default())
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| ProviderError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Consumer credentials for two-legged requests.
#[derive(Debug, Clone)]
pub struct Consumer<'a> {
    pub key: &'a str,
    pub secret: &'a str,
}

/// `Authorization` header value for a request carrying `body_params`.
pub fn authorization_header(
    method: &str,
    url: &str,
    body_params: &[(String, String)],
    consumer: &Consumer<'_>,
    nonce: &str,
    timestamp: i64,
) -> ProviderResult<String> {
    let mut oauth_params = vec![
        ("oauth_consumer_key".to_string(), consumer.key.to_string()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend_from_slice(body_params);
    let base = signature_base_string(method, url, &all_params);
    let signature = sign(&base, consumer.secret, None)?;
    oauth_params.push(("oauth_signature".to_string(), signature));
    oauth_params.sort();

    let header = oauth_params
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {header}"))
}

/// A nonce unique enough for one request per nanosecond per process.
pub fn nonce() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{nanos:x}{:x}", std::process::id())
}
