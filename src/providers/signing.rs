//! TC3-HMAC-SHA256 request signing for Tencent Cloud API 3.0.

use anyhow::{Result, anyhow};
use chrono::DateTime;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn hmac_sha256(key: &[u8], message: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| anyhow!("failed to initialise request signer: {err}"))?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Builds the `Authorization` header value for a POST of `payload` to
/// `https://{host}/` at unix time `timestamp`.
pub fn authorization(
    credentials: &Credentials,
    service: &str,
    host: &str,
    payload: &str,
    timestamp: i64,
) -> Result<String> {
    let date = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| anyhow!("request timestamp {timestamp} is out of range"))?
        .format("%Y-%m-%d")
        .to_string();

    let canonical_headers = format!("content-type:{CONTENT_TYPE}\nhost:{host}\n");
    let canonical_request = format!(
        "POST\n/\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{}",
        sha256_hex(payload)
    );

    let credential_scope = format!("{date}/{service}/tc3_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{timestamp}\n{credential_scope}\n{}",
        sha256_hex(&canonical_request)
    );

    let secret_date = hmac_sha256(
        format!("TC3{}", credentials.secret_key.as_str()).as_bytes(),
        &date,
    )?;
    let secret_service = hmac_sha256(&secret_date, service)?;
    let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
    let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

    Ok(format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        credentials.secret_id
    ))
}
