use log::info;

use crate::core::errors::RotationError;
use crate::core::types::{CertificateId, CertificateMaterial, CertificateType};
use crate::providers::CertificateService;

pub mod edgeone;
pub mod orchestrator;
pub mod polling;

pub use edgeone::EdgeOneDeployer;
pub use orchestrator::RotationOrchestrator;
pub use polling::{PollStatus, PollingExecutor, Sleeper, ThreadSleeper};

/// Uploads `material` once. A rejected upload or a response without an id
/// is fatal; uploads are never retried since a bad certificate fails the
/// same way every time.
pub(crate) fn upload_certificate(
    certificates: &dyn CertificateService,
    material: &CertificateMaterial,
    certificate_type: CertificateType,
) -> Result<CertificateId, RotationError> {
    let receipt = certificates
        .upload(material, certificate_type)
        .map_err(|err| RotationError::Upload(RotationError::describe(&err)))?;
    let cert_id = receipt.certificate_id().ok_or_else(|| {
        RotationError::Upload("upload response did not include a certificate id".to_string())
    })?;
    info!("[rotation] Uploaded certificate, CertificateId={cert_id}");
    Ok(cert_id)
}
