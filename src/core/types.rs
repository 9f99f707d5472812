use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// PEM-encoded certificate chain and private key for a single run.
/// Never persisted; the private key is wiped when dropped.
#[derive(Clone)]
pub struct CertificateMaterial {
    pub public_key_pem: String,
    pub private_key_pem: Zeroizing<String>,
}

impl CertificateMaterial {
    pub fn new(public_key_pem: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            public_key_pem: public_key_pem.into(),
            private_key_pem: Zeroizing::new(private_key_pem.into()),
        }
    }
}

impl fmt::Debug for CertificateMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateMaterial")
            .field("public_key_pem_len", &self.public_key_pem.len())
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Opaque certificate identifier assigned by the certificate service.
/// Always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    /// Returns `None` for empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Certificate type tag sent with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificateType {
    #[default]
    Server,
    Ca,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::Server => "SVR",
            CertificateType::Ca => "CA",
        }
    }
}

impl FromStr for CertificateType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SVR" | "SERVER" => Ok(CertificateType::Server),
            "CA" => Ok(CertificateType::Ca),
            other => Err(format!("unsupported certificate type '{other}' (expected SVR or CA)")),
        }
    }
}

/// Certificate currently bound to a deployed resource, as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainBinding {
    pub domain: String,
    pub cert_id: Option<CertificateId>,
}

impl DomainBinding {
    pub fn new(domain: impl Into<String>, cert_id: Option<&str>) -> Self {
        Self {
            domain: domain.into(),
            cert_id: cert_id.and_then(CertificateId::new),
        }
    }
}

/// Distinct certificate ids that must be migrated away from.
/// Iteration order is stable (sorted), which fixes the rebind order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OldCertificateSet(BTreeSet<CertificateId>);

impl OldCertificateSet {
    pub fn from_bindings(bindings: &[DomainBinding], new_cert_id: &CertificateId) -> Self {
        let ids = bindings
            .iter()
            .filter_map(|binding| binding.cert_id.as_ref())
            .filter(|id| *id != new_cert_id)
            .cloned()
            .collect();
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &CertificateId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CertificateId> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<CertificateId> {
        self.0.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Rebind,
    Delete,
}

/// One polling-governed remote operation. Lives only until a terminal
/// observation or budget exhaustion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncTask {
    pub kind: TaskKind,
    pub target_ids: Vec<CertificateId>,
    pub new_cert_id: Option<CertificateId>,
}

impl AsyncTask {
    pub fn rebind(old_cert_id: &CertificateId, new_cert_id: &CertificateId) -> Self {
        Self {
            kind: TaskKind::Rebind,
            target_ids: vec![old_cert_id.clone()],
            new_cert_id: Some(new_cert_id.clone()),
        }
    }

    pub fn delete(target_ids: Vec<CertificateId>) -> Self {
        Self {
            kind: TaskKind::Delete,
            target_ids,
            new_cert_id: None,
        }
    }

    /// Short label used in log lines.
    pub fn label(&self) -> String {
        let targets = self
            .target_ids
            .iter()
            .map(CertificateId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        match (&self.kind, &self.new_cert_id) {
            (TaskKind::Rebind, Some(new_id)) => format!("rebind {targets} -> {new_id}"),
            (TaskKind::Rebind, None) => format!("rebind {targets}"),
            (TaskKind::Delete, _) => format!("delete [{targets}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    TimedOut,
    Failed(String),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed)
    }
}

/// Per-certificate status reported by the delete task status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTaskStatus {
    InProgress,
    Completed,
    Failed,
    Unauthorized,
    ResourceInUse,
    InternalTimeout,
    Unknown(i64),
}

impl DeleteTaskStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => DeleteTaskStatus::InProgress,
            1 => DeleteTaskStatus::Completed,
            2 => DeleteTaskStatus::Failed,
            3 => DeleteTaskStatus::Unauthorized,
            4 => DeleteTaskStatus::ResourceInUse,
            5 => DeleteTaskStatus::InternalTimeout,
            other => DeleteTaskStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            DeleteTaskStatus::InProgress => 0,
            DeleteTaskStatus::Completed => 1,
            DeleteTaskStatus::Failed => 2,
            DeleteTaskStatus::Unauthorized => 3,
            DeleteTaskStatus::ResourceInUse => 4,
            DeleteTaskStatus::InternalTimeout => 5,
            DeleteTaskStatus::Unknown(code) => *code,
        }
    }

    /// Operator-facing reason text for the status code.
    pub fn description(&self) -> &'static str {
        match self {
            DeleteTaskStatus::InProgress => "In progress",
            DeleteTaskStatus::Completed => "Completed",
            DeleteTaskStatus::Failed => "Failed",
            DeleteTaskStatus::Unauthorized => "Unauthorized (requires elevated role)",
            DeleteTaskStatus::ResourceInUse => "Failed — certificate in use by other resources",
            DeleteTaskStatus::InternalTimeout => "Internal timeout",
            DeleteTaskStatus::Unknown(_) => "Unknown status",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, DeleteTaskStatus::InProgress)
    }

    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            DeleteTaskStatus::InProgress | DeleteTaskStatus::Completed
        )
    }
}

impl fmt::Display for DeleteTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.code(), self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebindRequest {
    pub old_cert_id: CertificateId,
    pub new_cert_id: CertificateId,
    pub resource_types: Vec<String>,
    pub notify_on_expiry: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebindResponse {
    pub deploy_record_id: Option<u64>,
}

impl RebindResponse {
    /// A non-zero deploy record id means the backend accepted the rebind.
    pub fn is_deployed(&self) -> bool {
        self.deploy_record_id.is_some_and(|id| id != 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReceipt {
    pub certificate_id: Option<String>,
    pub repeat_cert_id: Option<String>,
}

impl UploadReceipt {
    /// Prefers the fresh id and falls back to the id of an identical,
    /// previously uploaded certificate.
    pub fn certificate_id(&self) -> Option<CertificateId> {
        self.certificate_id
            .as_deref()
            .and_then(CertificateId::new)
            .or_else(|| self.repeat_cert_id.as_deref().and_then(CertificateId::new))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskHandle {
    pub task_id: String,
    pub cert_id: CertificateId,
}

/// Certificate the batch delete request rejected outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub cert_id: CertificateId,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteResponse {
    pub tasks: Vec<DeleteTaskHandle>,
    pub succeeded: Vec<CertificateId>,
    pub failed: Vec<DeleteFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskResult {
    pub task_id: String,
    pub cert_id: Option<CertificateId>,
    pub status: DeleteTaskStatus,
    pub error: Option<String>,
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDeployAck {
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Uploading,
    Discovering,
    Rebinding { index: usize, total: usize },
    Delaying,
    Deleting,
    Done,
    Failed,
}

impl fmt::Display for RotationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationState::Uploading => f.write_str("uploading"),
            RotationState::Discovering => f.write_str("discovering"),
            RotationState::Rebinding { index, total } => {
                write!(f, "rebinding ({index} of {total})")
            }
            RotationState::Delaying => f.write_str("delaying"),
            RotationState::Deleting => f.write_str("deleting"),
            RotationState::Done => f.write_str("done"),
            RotationState::Failed => f.write_str("failed"),
        }
    }
}

/// Result of a rotation run that reached `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSummary {
    pub run_id: String,
    pub new_cert_id: CertificateId,
    pub old_cert_ids: Vec<CertificateId>,
    pub rebinds: Vec<(CertificateId, TaskOutcome)>,
    pub delete: Option<TaskOutcome>,
    pub delete_statuses: Vec<DeleteTaskResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDeploySummary {
    pub run_id: String,
    pub cert_id: CertificateId,
    pub site_id: String,
    pub hosts: Vec<String>,
    pub request_id: Option<String>,
}
