use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::EdgeService;
use super::client::{ApiService, TencentCloudClient};
use crate::config::TencentCloudConfig;
use crate::core::types::{CertificateId, EdgeDeployAck};

const TEO_SERVICE: ApiService = ApiService {
    service: "teo",
    version: "2022-09-01",
    label: "EdgeOne",
};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModifyHostsCertificateRequest<'a> {
    zone_id: &'a str,
    hosts: &'a [String],
    mode: &'a str,
    server_cert_info: Vec<ServerCertInfo<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServerCertInfo<'a> {
    cert_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ModifyHostsCertificateResponse {
    #[serde(default)]
    request_id: Option<String>,
}

/// Binds EdgeOne site hosts to an uploaded SSL certificate.
pub struct EdgeOneAdapter {
    client: TencentCloudClient,
}

impl EdgeOneAdapter {
    pub fn new(config: &TencentCloudConfig) -> Self {
        Self {
            client: TencentCloudClient::new(config, &config.teo_endpoint, TEO_SERVICE),
        }
    }
}

fn build_request<'a>(
    site_id: &'a str,
    hosts: &'a [String],
    cert_id: &'a CertificateId,
) -> ModifyHostsCertificateRequest<'a> {
    ModifyHostsCertificateRequest {
        zone_id: site_id,
        hosts,
        mode: "sslcert",
        server_cert_info: vec![ServerCertInfo {
            cert_id: cert_id.as_str(),
        }],
    }
}

impl EdgeService for EdgeOneAdapter {
    fn deploy_edge_domains(
        &self,
        site_id: &str,
        hosts: &[String],
        cert_id: &CertificateId,
    ) -> Result<EdgeDeployAck> {
        let request = build_request(site_id, hosts, cert_id);
        debug!(
            "[edgeone] ModifyHostsCertificate params: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response: ModifyHostsCertificateResponse =
            self.client.call("ModifyHostsCertificate", &request)?;
        info!(
            "[edgeone] ModifyHostsCertificate accepted by {} (RequestId: {})",
            self.client.host(),
            response.request_id.as_deref().unwrap_or("-")
        );
        Ok(EdgeDeployAck {
            request_id: response.request_id,
        })
    }
}
