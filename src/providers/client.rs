use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{http, signing};
use crate::config::{Credentials, TencentCloudConfig};

/// Error object returned inside `Response.Error`.
#[derive(Debug, Error)]
#[error("{service} {action} failed with {code}: {message} (RequestId: {request_id})")]
pub struct TencentApiError {
    pub service: String,
    pub action: String,
    pub code: String,
    pub message: String,
    pub request_id: String,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseMeta {
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Static identity of one Tencent Cloud product API.
#[derive(Debug, Clone, Copy)]
pub struct ApiService {
    pub service: &'static str,
    pub version: &'static str,
    /// Human readable name used in errors and logs.
    pub label: &'static str,
}

/// Signed JSON-over-HTTPS client for a single product endpoint.
pub struct TencentCloudClient {
    http: Client,
    credentials: Credentials,
    region: Option<String>,
    endpoint: Endpoint,
    api: ApiService,
}

/// Request URL plus the bare host that is signed. An endpoint given without
/// a scheme is reached over HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    url: String,
    host: String,
}

impl Endpoint {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches('/');
        let (scheme, host) = match trimmed.split_once("://") {
            Some((scheme, host)) => (scheme.to_ascii_lowercase(), host),
            None => ("https".to_string(), trimmed),
        };
        Self {
            url: format!("{scheme}://{host}/"),
            host: host.to_string(),
        }
    }
}

impl TencentCloudClient {
    pub fn new(config: &TencentCloudConfig, endpoint: &str, api: ApiService) -> Self {
        Self {
            http: http::build_client(config.http_timeout),
            credentials: config.credentials.clone(),
            region: config.region.clone().filter(|r| !r.trim().is_empty()),
            endpoint: Endpoint::parse(endpoint),
            api,
        }
    }

    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    /// Sends `action` with `request` as the JSON body and decodes the
    /// `Response` object. Request bodies are never logged here because some
    /// carry private keys.
    pub fn call<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_string(request)
            .with_context(|| format!("failed to encode {} {action} request", self.api.label))?;
        let timestamp = Utc::now().timestamp();
        let authorization = signing::authorization(
            &self.credentials,
            self.api.service,
            &self.endpoint.host,
            &payload,
            timestamp,
        )?;

        debug!(
            "[tencent-api] {} {} -> {} ({} bytes)",
            self.api.label,
            action,
            self.endpoint.url,
            payload.len()
        );

        let mut builder = self
            .http
            .post(self.endpoint.url.as_str())
            .header("Authorization", authorization)
            .header("Content-Type", signing::CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", self.api.version);
        if let Some(region) = &self.region {
            builder = builder.header("X-TC-Region", region);
        }

        let response = builder
            .body(payload)
            .send()
            .with_context(|| format!("failed to send {} {action} request", self.api.label))?;

        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("failed to read {} {action} response", self.api.label))?;
        if !status.is_success() {
            return Err(http::status_error(self.api.label, status, Some(body)));
        }

        parse_response(self.api.label, action, &body)
    }
}

/// Decodes a `{"Response": {...}}` body, surfacing `Response.Error` as a
/// [`TencentApiError`].
pub fn parse_response<Resp: DeserializeOwned>(label: &str, action: &str, body: &str) -> Result<Resp> {
    let envelope: Envelope = serde_json::from_str(body)
        .with_context(|| format!("failed to parse {label} {action} response"))?;
    let meta: ResponseMeta = serde_json::from_value(envelope.response.clone())
        .with_context(|| format!("failed to parse {label} {action} response metadata"))?;
    let request_id = meta.request_id.unwrap_or_default();

    if let Some(error) = meta.error {
        return Err(TencentApiError {
            service: label.to_string(),
            action: action.to_string(),
            code: error.code,
            message: error.message,
            request_id,
        }
        .into());
    }

    debug!("[tencent-api] {label} {action} succeeded (RequestId: {request_id})");
    serde_json::from_value(envelope.response)
        .with_context(|| format!("unexpected {label} {action} response shape"))
}
