use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::CertificateService;
use super::client::{ApiService, TencentCloudClient};
use crate::config::TencentCloudConfig;
use crate::core::types::{
    BatchDeleteResponse, CertificateId, CertificateMaterial, CertificateType, DeleteFailure,
    DeleteTaskHandle, DeleteTaskResult, DeleteTaskStatus, RebindRequest, RebindResponse,
    UploadReceipt,
};

const SSL_SERVICE: ApiService = ApiService {
    service: "ssl",
    version: "2019-12-05",
    label: "Tencent SSL",
};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UploadCertificateRequest<'a> {
    certificate_public_key: &'a str,
    certificate_private_key: &'a str,
    certificate_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UploadCertificateResponse {
    #[serde(default)]
    certificate_id: Option<String>,
    #[serde(default)]
    repeat_cert_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateCertificateInstanceRequest<'a> {
    old_certificate_id: &'a str,
    certificate_id: &'a str,
    resource_types: &'a [String],
    expiring_notification_switch: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateCertificateInstanceResponse {
    #[serde(default)]
    deploy_record_id: Option<u64>,
    #[serde(default)]
    deploy_status: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteCertificatesRequest<'a> {
    certificate_ids: Vec<&'a str>,
    is_sync: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteCertificatesResponse {
    #[serde(default)]
    success: Option<Vec<String>>,
    #[serde(default)]
    fail: Option<Vec<DeleteFailEntry>>,
    #[serde(default)]
    cert_task_ids: Option<Vec<CertTaskId>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteFailEntry {
    cert_id: String,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CertTaskId {
    cert_id: String,
    task_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDeleteTaskRequest<'a> {
    task_ids: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDeleteTaskResponse {
    #[serde(default)]
    delete_task_result: Option<Vec<DeleteTaskEntry>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteTaskEntry {
    task_id: String,
    #[serde(default)]
    cert_id: Option<String>,
    status: i64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    domains: Option<Vec<String>>,
}

/// Certificate management backed by the Tencent Cloud SSL API.
pub struct SslCertificateAdapter {
    client: TencentCloudClient,
}

impl SslCertificateAdapter {
    pub fn new(config: &TencentCloudConfig) -> Self {
        Self {
            client: TencentCloudClient::new(config, &config.ssl_endpoint, SSL_SERVICE),
        }
    }
}

impl CertificateService for SslCertificateAdapter {
    fn upload(
        &self,
        material: &CertificateMaterial,
        certificate_type: CertificateType,
    ) -> Result<UploadReceipt> {
        info!(
            "[tencent-ssl] Uploading {} certificate to {}",
            certificate_type.as_str(),
            self.client.host()
        );
        let request = UploadCertificateRequest {
            certificate_public_key: &material.public_key_pem,
            certificate_private_key: material.private_key_pem.as_str(),
            certificate_type: certificate_type.as_str(),
        };
        let response: UploadCertificateResponse =
            self.client.call("UploadCertificate", &request)?;
        Ok(UploadReceipt {
            certificate_id: response.certificate_id,
            repeat_cert_id: response.repeat_cert_id,
        })
    }

    fn rebind(&self, request: &RebindRequest) -> Result<RebindResponse> {
        let body = UpdateCertificateInstanceRequest {
            old_certificate_id: request.old_cert_id.as_str(),
            certificate_id: request.new_cert_id.as_str(),
            resource_types: &request.resource_types,
            expiring_notification_switch: u8::from(request.notify_on_expiry),
        };
        let response: UpdateCertificateInstanceResponse =
            self.client.call("UpdateCertificateInstance", &body)?;
        debug!(
            "[tencent-ssl] UpdateCertificateInstance {} -> {}: DeployRecordId={:?}, DeployStatus={:?}",
            request.old_cert_id, request.new_cert_id, response.deploy_record_id, response.deploy_status
        );
        Ok(RebindResponse {
            deploy_record_id: response.deploy_record_id,
        })
    }

    fn batch_delete(&self, cert_ids: &[CertificateId], synchronous: bool) -> Result<BatchDeleteResponse> {
        let body = DeleteCertificatesRequest {
            certificate_ids: cert_ids.iter().map(CertificateId::as_str).collect(),
            is_sync: synchronous,
        };
        let response: DeleteCertificatesResponse = self.client.call("DeleteCertificates", &body)?;
        Ok(convert_delete_response(response))
    }

    fn describe_delete_tasks(&self, task_ids: &[String]) -> Result<Vec<DeleteTaskResult>> {
        let body = DescribeDeleteTaskRequest { task_ids };
        let response: DescribeDeleteTaskResponse = self
            .client
            .call("DescribeDeleteCertificatesTaskResult", &body)?;
        Ok(convert_task_results(response))
    }
}

fn convert_delete_response(response: DeleteCertificatesResponse) -> BatchDeleteResponse {
    let tasks = response
        .cert_task_ids
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match CertificateId::new(entry.cert_id) {
            Some(cert_id) if !entry.task_id.trim().is_empty() => Some(DeleteTaskHandle {
                task_id: entry.task_id,
                cert_id,
            }),
            _ => {
                warn!("[tencent-ssl] ignoring delete task entry without certificate or task id");
                None
            }
        })
        .collect();

    BatchDeleteResponse {
        tasks,
        succeeded: response
            .success
            .unwrap_or_default()
            .into_iter()
            .filter_map(CertificateId::new)
            .collect(),
        failed: response
            .fail
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                CertificateId::new(entry.cert_id).map(|cert_id| DeleteFailure {
                    cert_id,
                    message: entry.msg,
                })
            })
            .collect(),
    }
}

fn convert_task_results(response: DescribeDeleteTaskResponse) -> Vec<DeleteTaskResult> {
    response
        .delete_task_result
        .unwrap_or_default()
        .into_iter()
        .map(|entry| DeleteTaskResult {
            task_id: entry.task_id,
            cert_id: entry.cert_id.and_then(CertificateId::new),
            status: DeleteTaskStatus::from_code(entry.status),
            error: entry.error.filter(|e| !e.trim().is_empty()),
            domains: entry.domains.unwrap_or_default(),
        })
        .collect()
}
