use anyhow::Result;

use crate::core::types::{
    BatchDeleteResponse, CertificateId, CertificateMaterial, CertificateType, DeleteTaskResult,
    DomainBinding, EdgeDeployAck, RebindRequest, RebindResponse, UploadReceipt,
};

mod cdn;
pub(crate) mod client;
pub(crate) mod http;
mod signing;
mod ssl;
mod teo;

pub use cdn::CdnDiscoveryAdapter;
pub use client::{TencentApiError, TencentCloudClient};
pub use http::resolve_timeout;
pub use ssl::SslCertificateAdapter;
pub use teo::EdgeOneAdapter;

/// Certificate-management backend: upload, rebind, and delete.
pub trait CertificateService: Send + Sync {
    fn upload(
        &self,
        material: &CertificateMaterial,
        certificate_type: CertificateType,
    ) -> Result<UploadReceipt>;

    /// Issues (or re-issues) a rebind. The same call doubles as its own
    /// status check; see [`RebindResponse::is_deployed`].
    fn rebind(&self, request: &RebindRequest) -> Result<RebindResponse>;

    /// Starts deleting `cert_ids`; returns one task id per certificate.
    fn batch_delete(&self, cert_ids: &[CertificateId], synchronous: bool) -> Result<BatchDeleteResponse>;

    /// Read-only status query for delete tasks.
    fn describe_delete_tasks(&self, task_ids: &[String]) -> Result<Vec<DeleteTaskResult>>;
}

/// Reports which certificate each deployed resource currently serves.
pub trait ResourceDiscovery: Send + Sync {
    fn describe_bindings(&self, domains: &[String]) -> Result<Vec<DomainBinding>>;
}

/// Edge platform that binds host names to a certificate in one synchronous call.
pub trait EdgeService: Send + Sync {
    fn deploy_edge_domains(
        &self,
        site_id: &str,
        hosts: &[String],
        cert_id: &CertificateId,
    ) -> Result<EdgeDeployAck>;
}
