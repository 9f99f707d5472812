//! Command line and environment inputs. Every flag can also be supplied
//! through the environment variable named next to it, which is how CI
//! pipelines usually pass secrets.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    Credentials, DEFAULT_CDN_ENDPOINT, DEFAULT_SSL_ENDPOINT, DEFAULT_TEO_ENDPOINT, PollingPolicy,
    RotationSettings, TencentCloudConfig,
};
use crate::core::errors::RotationError;
use crate::core::types::CertificateType;
use crate::providers::resolve_timeout;

#[derive(Parser, Debug)]
#[command(name = "edge-cert-rotator")]
#[command(about = "Rotate TLS certificates across Tencent Cloud CDN and EdgeOne")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging for this tool
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a certificate, move every resource bound to an older one onto it,
    /// then delete the old certificates
    Rotate(RotateArgs),

    /// Upload a certificate and bind it to EdgeOne site hosts
    #[command(name = "edgeone")]
    EdgeOne(EdgeOneArgs),
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Tencent Cloud API secret id
    #[arg(long, env = "TENCENTCLOUD_SECRET_ID", hide_env_values = true)]
    pub secret_id: String,

    /// Tencent Cloud API secret key
    #[arg(long, env = "TENCENTCLOUD_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// PEM file with the certificate and its chain
    #[arg(long, env = "FULLCHAIN_FILE")]
    pub fullchain_file: PathBuf,

    /// PEM file with the private key
    #[arg(long, env = "KEY_FILE")]
    pub key_file: PathBuf,

    /// Region sent with each request (the certificate APIs are global)
    #[arg(long, env = "TENCENTCLOUD_REGION")]
    pub region: Option<String>,

    /// SSL certificate API endpoint
    #[arg(long, env = "SSL_ENDPOINT", default_value = DEFAULT_SSL_ENDPOINT)]
    pub ssl_endpoint: String,

    /// Per-request HTTP timeout in seconds; zero or unparsable values use the default (15)
    #[arg(long, env = "EDGE_CERT_HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: Option<String>,
}

impl CommonArgs {
    pub fn cloud_config(&self) -> Result<TencentCloudConfig, RotationError> {
        let credentials = Credentials::new(self.secret_id.clone(), self.secret_key.clone())?;
        let mut config = TencentCloudConfig::new(credentials);
        config.region = self.region.clone();
        config.ssl_endpoint = self.ssl_endpoint.clone();
        config.http_timeout = resolve_timeout(self.http_timeout_secs.as_deref());
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Domains whose certificates are rotated; whitespace or newline separated, repeatable
    #[arg(long, env = "DOMAINS", required = true, num_args = 1..)]
    pub domains: Vec<String>,

    /// Resource types to rebind
    #[arg(long, value_delimiter = ',', default_value = "cdn,teo")]
    pub resource_types: Vec<String>,

    /// Certificate type tag for the upload (SVR or CA)
    #[arg(long, default_value = "SVR", value_parser = parse_certificate_type)]
    pub certificate_type: CertificateType,

    /// Seconds between status checks
    #[arg(long, default_value_t = 1)]
    pub poll_interval_secs: u64,

    /// Status checks before a task is reported as timed out
    #[arg(long, default_value_t = 60)]
    pub poll_max_attempts: u32,

    /// Seconds to wait after rebinding before deleting old certificates (0 disables)
    #[arg(long, env = "COOLDOWN_SECS", default_value_t = 60)]
    pub cooldown_secs: u64,

    /// Do not request expiry notifications for rebound resources
    #[arg(long)]
    pub disable_expiry_notification: bool,

    /// CDN API endpoint used for discovery
    #[arg(long, env = "CDN_ENDPOINT", default_value = DEFAULT_CDN_ENDPOINT)]
    pub cdn_endpoint: String,
}

impl RotateArgs {
    pub fn cloud_config(&self) -> Result<TencentCloudConfig, RotationError> {
        let mut config = self.common.cloud_config()?;
        config.cdn_endpoint = self.cdn_endpoint.clone();
        Ok(config)
    }

    pub fn settings(&self) -> RotationSettings {
        let polling = PollingPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
        };
        RotationSettings {
            certificate_type: self.certificate_type,
            resource_types: self
                .resource_types
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            notify_on_expiry: !self.disable_expiry_notification,
            rebind_polling: polling,
            delete_polling: polling,
            cooldown: Duration::from_secs(self.cooldown_secs),
        }
    }
}

#[derive(Args, Debug)]
pub struct EdgeOneArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// EdgeOne site (zone) id
    #[arg(long, env = "EO_SITE_ID")]
    pub site_id: String,

    /// Newline-separated host names to bind
    #[arg(long, env = "EO_DOMAINS")]
    pub hosts: String,

    /// EdgeOne API endpoint
    #[arg(long, env = "EO_ENDPOINT", default_value = DEFAULT_TEO_ENDPOINT)]
    pub teo_endpoint: String,
}

impl EdgeOneArgs {
    pub fn cloud_config(&self) -> Result<TencentCloudConfig, RotationError> {
        let mut config = self.common.cloud_config()?;
        config.teo_endpoint = self.teo_endpoint.clone();
        Ok(config)
    }
}

fn parse_certificate_type(raw: &str) -> Result<CertificateType, String> {
    raw.parse()
}
