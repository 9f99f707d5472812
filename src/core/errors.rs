use thiserror::Error;

use super::types::CertificateId;

/// Fatal failures of a rotation or edge deployment run.
/// Anything that reaches the caller as an error aborts the remaining steps.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("certificate upload failed: {0}")]
    Upload(String),
    #[error("resource discovery failed: {0}")]
    Discovery(String),
    #[error("rebinding {old_cert_id} to {new_cert_id} failed: {reason}")]
    Rebind {
        old_cert_id: CertificateId,
        new_cert_id: CertificateId,
        reason: String,
    },
    #[error("certificate deletion failed: {0}")]
    Delete(String),
    #[error("edge deployment failed: {0}")]
    EdgeDeploy(String),
}

impl RotationError {
    /// Renders an `anyhow` error with its full context chain.
    pub(crate) fn describe(err: &anyhow::Error) -> String {
        format!("{err:#}")
    }
}
