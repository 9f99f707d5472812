use std::time::Duration;

use anyhow::anyhow;
use log::warn;
use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::config::DEFAULT_HTTP_TIMEOUT;

/// Builds the blocking client used for every Tencent Cloud call.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("edge-cert-rotator/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|err| {
            warn!("[tencent-http] failed to build client: {err}");
            Client::new()
        })
}

/// Parses a configured timeout in seconds, falling back to the default for
/// missing, zero, or unparsable values.
pub fn resolve_timeout(raw_secs: Option<&str>) -> Duration {
    let Some(raw) = raw_secs.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return DEFAULT_HTTP_TIMEOUT;
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!("[tencent-http] invalid timeout value {raw:?}; using default");
            DEFAULT_HTTP_TIMEOUT
        }
    }
}

pub fn status_error(
    provider: &str,
    status: StatusCode,
    body: Option<String>,
) -> anyhow::Error {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return anyhow!("{provider} authentication failed");
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return anyhow!("{provider} rate limit exceeded");
    }
    if let Some(body) = body.filter(|body| !body.trim().is_empty()) {
        return anyhow!("{provider} API error ({status}): {body}");
    }
    anyhow!("{provider} API error: {status}")
}

#[cfg(test)]
mod tests {
    use super::{resolve_timeout, status_error};
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn status_error_maps_auth() {
        let err = status_error("Tencent SSL", StatusCode::FORBIDDEN, None);
        assert!(err.to_string().contains("Tencent SSL authentication failed"));
    }

    #[test]
    fn status_error_maps_rate_limit() {
        let err = status_error("Tencent CDN", StatusCode::TOO_MANY_REQUESTS, None);
        assert!(err.to_string().contains("Tencent CDN rate limit exceeded"));
    }

    #[test]
    fn status_error_includes_body() {
        let err = status_error(
            "EdgeOne",
            StatusCode::BAD_GATEWAY,
            Some("upstream unavailable".to_string()),
        );
        let msg = err.to_string();
        assert!(msg.contains("EdgeOne API error"));
        assert!(msg.contains("upstream unavailable"));
    }

    #[test]
    fn status_error_ignores_blank_body() {
        let err = status_error("EdgeOne", StatusCode::BAD_GATEWAY, Some("  ".to_string()));
        assert_eq!(err.to_string(), "EdgeOne API error: 502 Bad Gateway");
    }

    #[test]
    fn resolve_timeout_defaults() {
        assert_eq!(resolve_timeout(None), Duration::from_secs(15));
    }

    #[test]
    fn resolve_timeout_uses_value() {
        assert_eq!(resolve_timeout(Some("20")), Duration::from_secs(20));
    }

    #[test]
    fn resolve_timeout_rejects_zero() {
        assert_eq!(resolve_timeout(Some("0")), Duration::from_secs(15));
    }

    #[test]
    fn resolve_timeout_rejects_invalid() {
        assert_eq!(resolve_timeout(Some("nope")), Duration::from_secs(15));
        assert_eq!(resolve_timeout(Some("  ")), Duration::from_secs(15));
    }
}
