use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::core::errors::RotationError;
use crate::core::types::CertificateType;

pub const DEFAULT_SSL_ENDPOINT: &str = "ssl.tencentcloudapi.com";
pub const DEFAULT_CDN_ENDPOINT: &str = "cdn.tencentcloudapi.com";
pub const DEFAULT_TEO_ENDPOINT: &str = "teo.tencentcloudapi.com";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);
pub const DEFAULT_RESOURCE_TYPES: [&str; 2] = ["cdn", "teo"];

/// API key pair used to sign every request.
#[derive(Clone)]
pub struct Credentials {
    pub secret_id: String,
    pub secret_key: Zeroizing<String>,
}

impl Credentials {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, RotationError> {
        let secret_id = secret_id.into().trim().to_string();
        let secret_key = Zeroizing::new(secret_key.into().trim().to_string());
        if secret_id.is_empty() {
            return Err(RotationError::Config("secret id is required".to_string()));
        }
        if secret_key.is_empty() {
            return Err(RotationError::Config("secret key is required".to_string()));
        }
        Ok(Self {
            secret_id,
            secret_key,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Connection settings shared by the SSL, CDN and EdgeOne clients.
#[derive(Debug, Clone)]
pub struct TencentCloudConfig {
    pub credentials: Credentials,
    /// Sent as `X-TC-Region` when set; the certificate APIs are global.
    pub region: Option<String>,
    pub ssl_endpoint: String,
    pub cdn_endpoint: String,
    pub teo_endpoint: String,
    pub http_timeout: Duration,
}

impl TencentCloudConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            region: None,
            ssl_endpoint: DEFAULT_SSL_ENDPOINT.to_string(),
            cdn_endpoint: DEFAULT_CDN_ENDPOINT.to_string(),
            teo_endpoint: DEFAULT_TEO_ENDPOINT.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Fixed-interval, fixed-budget polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSettings {
    pub certificate_type: CertificateType,
    pub resource_types: Vec<String>,
    pub notify_on_expiry: bool,
    pub rebind_polling: PollingPolicy,
    pub delete_polling: PollingPolicy,
    /// Wait between the last rebind and the delete; zero disables it.
    pub cooldown: Duration,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            certificate_type: CertificateType::Server,
            resource_types: DEFAULT_RESOURCE_TYPES.iter().map(|s| s.to_string()).collect(),
            notify_on_expiry: true,
            rebind_polling: PollingPolicy::default(),
            delete_polling: PollingPolicy::default(),
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl RotationSettings {
    pub fn validate(&self) -> Result<(), RotationError> {
        if self.resource_types.iter().all(|t| t.trim().is_empty()) {
            return Err(RotationError::Config(
                "at least one resource type is required".to_string(),
            ));
        }
        for (name, policy) in [
            ("rebind", &self.rebind_polling),
            ("delete", &self.delete_polling),
        ] {
            if policy.max_attempts == 0 {
                return Err(RotationError::Config(format!(
                    "{name} polling needs at least one attempt"
                )));
            }
        }
        Ok(())
    }
}
