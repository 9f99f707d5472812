use log::info;
use uuid::Uuid;

use super::upload_certificate;
use crate::core::errors::RotationError;
use crate::core::types::{CertificateMaterial, CertificateType, EdgeDeploySummary};
use crate::domain::normalize_host_list;
use crate::providers::{CertificateService, EdgeService};

/// Single-site EdgeOne deployment: upload, then bind hosts in one call.
/// No discovery, no cleanup and no polling; the edge response is final.
pub struct EdgeOneDeployer<'a> {
    certificates: &'a dyn CertificateService,
    edge: &'a dyn EdgeService,
    run_id: String,
}

impl<'a> EdgeOneDeployer<'a> {
    pub fn new(certificates: &'a dyn CertificateService, edge: &'a dyn EdgeService) -> Self {
        Self {
            certificates,
            edge,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// `raw_hosts` is newline separated; blank lines are ignored. Input is
    /// validated before any remote call is made.
    pub fn deploy(
        &self,
        material: &CertificateMaterial,
        site_id: &str,
        raw_hosts: &str,
    ) -> Result<EdgeDeploySummary, RotationError> {
        let site_id = site_id.trim();
        if site_id.is_empty() {
            return Err(RotationError::Input("EdgeOne site id is required".to_string()));
        }
        let hosts = normalize_host_list(raw_hosts).map_err(|err| {
            RotationError::Input(format!("{} in EdgeOne host list", RotationError::describe(&err)))
        })?;

        info!(
            "[edgeone] run {} deploying to site {} for {} host(s): {}",
            self.run_id,
            site_id,
            hosts.len(),
            hosts.join(", ")
        );

        let cert_id = upload_certificate(self.certificates, material, CertificateType::Server)?;

        info!("[edgeone] Deploying certificate {cert_id} to EdgeOne...");
        let ack = self
            .edge
            .deploy_edge_domains(site_id, &hosts, &cert_id)
            .map_err(|err| RotationError::EdgeDeploy(RotationError::describe(&err)))?;

        info!(
            "[edgeone] run {} finished: {} host(s) now serve {}",
            self.run_id,
            hosts.len(),
            cert_id
        );
        Ok(EdgeDeploySummary {
            run_id: self.run_id.clone(),
            cert_id,
            site_id: site_id.to_string(),
            hosts,
            request_id: ack.request_id,
        })
    }
}
