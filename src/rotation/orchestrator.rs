use log::{debug, error, info, warn};
use uuid::Uuid;

use super::polling::{PollStatus, PollingExecutor, Sleeper};
use super::upload_certificate;
use crate::config::RotationSettings;
use crate::core::errors::RotationError;
use crate::core::types::{
    AsyncTask, CertificateId, CertificateMaterial, DeleteTaskHandle, DeleteTaskResult,
    OldCertificateSet, RebindRequest, RotationState, RotationSummary, TaskOutcome,
};
use crate::domain::normalize_domain_inputs;
use crate::providers::{CertificateService, ResourceDiscovery};

/// Drives one rotation run:
/// `Uploading -> Discovering -> Rebinding(i of N) -> Delaying -> Deleting -> Done`.
///
/// Every step is awaited before the next one starts. Rebinds run strictly in
/// order; if rebind `k` fails, ids after `k` are never attempted and deletion
/// is skipped, leaving ids before `k` already migrated. Poll timeouts are
/// logged and tolerated; transport errors are fatal.
pub struct RotationOrchestrator<'a> {
    certificates: &'a dyn CertificateService,
    discovery: &'a dyn ResourceDiscovery,
    settings: &'a RotationSettings,
    sleeper: &'a dyn Sleeper,
    state: RotationState,
    run_id: String,
}

impl<'a> RotationOrchestrator<'a> {
    pub fn new(
        certificates: &'a dyn CertificateService,
        discovery: &'a dyn ResourceDiscovery,
        settings: &'a RotationSettings,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            certificates,
            discovery,
            settings,
            sleeper,
            state: RotationState::Uploading,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run(
        &mut self,
        material: &CertificateMaterial,
        domains: &[String],
    ) -> Result<RotationSummary, RotationError> {
        let result = self.execute(material, domains);
        if let Err(err) = &result {
            error!(
                "[rotation] run {} failed while {}: {}",
                self.run_id, self.state, err
            );
            self.transition(RotationState::Failed);
        }
        result
    }

    fn execute(
        &mut self,
        material: &CertificateMaterial,
        domains: &[String],
    ) -> Result<RotationSummary, RotationError> {
        self.settings.validate()?;
        let domains = normalize_domain_inputs(domains)
            .map_err(|err| RotationError::Input(RotationError::describe(&err)))?;
        info!(
            "[rotation] run {} starting for {} domain(s): {}",
            self.run_id,
            domains.len(),
            domains.join(", ")
        );

        self.transition(RotationState::Uploading);
        let new_cert_id =
            upload_certificate(self.certificates, material, self.settings.certificate_type)?;

        self.transition(RotationState::Discovering);
        let old_certs = self.discover(&domains, &new_cert_id)?;

        let mut summary = RotationSummary {
            run_id: self.run_id.clone(),
            new_cert_id: new_cert_id.clone(),
            old_cert_ids: old_certs.to_vec(),
            rebinds: Vec::new(),
            delete: None,
            delete_statuses: Vec::new(),
        };

        if old_certs.is_empty() {
            info!("[rotation] No old certificates are bound to the requested domains; nothing to rotate");
            self.transition(RotationState::Done);
            return Ok(summary);
        }

        summary.rebinds = self.rebind_all(&old_certs, &new_cert_id)?;
        self.cool_down();

        self.transition(RotationState::Deleting);
        let (outcome, statuses) = self.delete_all(&old_certs)?;
        summary.delete = Some(outcome);
        summary.delete_statuses = statuses;

        self.transition(RotationState::Done);
        let timed_out = summary
            .rebinds
            .iter()
            .filter(|(_, outcome)| !outcome.is_completed())
            .count();
        info!(
            "[rotation] run {} finished: {} certificate(s) rebound to {} ({} unconfirmed), delete {:?}",
            self.run_id,
            summary.rebinds.len(),
            new_cert_id,
            timed_out,
            summary.delete
        );
        Ok(summary)
    }

    fn transition(&mut self, next: RotationState) {
        if self.state != next {
            debug!("[rotation] state {} -> {}", self.state, next);
        }
        self.state = next;
    }

    fn discover(
        &self,
        domains: &[String],
        new_cert_id: &CertificateId,
    ) -> Result<OldCertificateSet, RotationError> {
        let bindings = self
            .discovery
            .describe_bindings(domains)
            .map_err(|err| RotationError::Discovery(RotationError::describe(&err)))?;

        for binding in &bindings {
            match &binding.cert_id {
                Some(cert_id) => info!("[rotation] {} is bound to {}", binding.domain, cert_id),
                None => info!("[rotation] {} has no bound certificate", binding.domain),
            }
        }

        let old_certs = OldCertificateSet::from_bindings(&bindings, new_cert_id);
        info!(
            "[rotation] {} old certificate(s) to replace: {}",
            old_certs.len(),
            join_ids(old_certs.iter())
        );
        Ok(old_certs)
    }

    fn rebind_all(
        &mut self,
        old_certs: &OldCertificateSet,
        new_cert_id: &CertificateId,
    ) -> Result<Vec<(CertificateId, TaskOutcome)>, RotationError> {
        let total = old_certs.len();
        let ordered = old_certs.to_vec();
        let mut outcomes = Vec::with_capacity(total);

        for (index, old_cert_id) in ordered.iter().enumerate() {
            self.transition(RotationState::Rebinding {
                index: index + 1,
                total,
            });
            match self.rebind_one(old_cert_id, new_cert_id) {
                Ok(outcome) => outcomes.push((old_cert_id.clone(), outcome)),
                Err(err) => {
                    error!(
                        "[rotation] Rebind aborted at {} of {}. Already migrated: [{}]. Not attempted: [{}]",
                        index + 1,
                        total,
                        join_ids(ordered[..index].iter()),
                        join_ids(ordered[index + 1..].iter())
                    );
                    return Err(err);
                }
            }
        }
        Ok(outcomes)
    }

    fn rebind_one(
        &self,
        old_cert_id: &CertificateId,
        new_cert_id: &CertificateId,
    ) -> Result<TaskOutcome, RotationError> {
        let task = AsyncTask::rebind(old_cert_id, new_cert_id);
        let label = task.label();
        let request = RebindRequest {
            old_cert_id: old_cert_id.clone(),
            new_cert_id: new_cert_id.clone(),
            resource_types: self.settings.resource_types.clone(),
            notify_on_expiry: self.settings.notify_on_expiry,
        };
        let rebind_error = |reason: String| RotationError::Rebind {
            old_cert_id: old_cert_id.clone(),
            new_cert_id: new_cert_id.clone(),
            reason,
        };

        info!("[rotation] {label}: requesting update");
        let certificates = self.certificates;
        let trigger = certificates
            .rebind(&request)
            .map_err(|err| rebind_error(RotationError::describe(&err)))?;

        let outcome = if trigger.is_deployed() {
            TaskOutcome::Completed
        } else {
            // The update call is re-issued as its own status check.
            PollingExecutor::new(self.sleeper).run_until_done(
                &label,
                &self.settings.rebind_polling,
                || {
                    let response = certificates.rebind(&request)?;
                    Ok(if response.is_deployed() {
                        PollStatus::Done
                    } else {
                        PollStatus::Pending
                    })
                },
            )
        };

        match &outcome {
            TaskOutcome::Completed => info!("[rotation] {label}: deployed"),
            TaskOutcome::TimedOut => error!(
                "[rotation] {label}: not confirmed after {} attempts; continuing",
                self.settings.rebind_polling.max_attempts
            ),
            TaskOutcome::Failed(reason) => return Err(rebind_error(reason.clone())),
        }
        Ok(outcome)
    }

    fn cool_down(&mut self) {
        let cooldown = self.settings.cooldown;
        if cooldown.is_zero() {
            return;
        }
        self.transition(RotationState::Delaying);
        info!(
            "[rotation] Waiting {}s for rebinds to settle before deleting old certificates",
            cooldown.as_secs()
        );
        self.sleeper.sleep(cooldown);
    }

    fn delete_all(
        &self,
        old_certs: &OldCertificateSet,
    ) -> Result<(TaskOutcome, Vec<DeleteTaskResult>), RotationError> {
        let targets = old_certs.to_vec();
        let label = AsyncTask::delete(targets.clone()).label();
        let certificates = self.certificates;

        info!("[rotation] {label}: requesting deletion");
        let response = certificates
            .batch_delete(&targets, true)
            .map_err(|err| RotationError::Delete(RotationError::describe(&err)))?;

        if !response.succeeded.is_empty() {
            info!(
                "[rotation] {label}: accepted [{}]",
                join_ids(response.succeeded.iter())
            );
        }
        for failure in &response.failed {
            error!(
                "[rotation] Delete of {} was rejected: {}",
                failure.cert_id,
                failure.message.as_deref().unwrap_or("no reason given")
            );
        }
        for task in response.tasks.iter().filter(|t| !old_certs.contains(&t.cert_id)) {
            warn!(
                "[rotation] Delete task {} refers to {}, which was not requested",
                task.task_id, task.cert_id
            );
        }

        if response.tasks.is_empty() {
            info!("[rotation] {label}: no delete tasks returned; nothing to poll");
            return Ok((TaskOutcome::Completed, Vec::new()));
        }

        let task_ids: Vec<String> = response.tasks.iter().map(|t| t.task_id.clone()).collect();
        let mut latest: Vec<DeleteTaskResult> = Vec::new();
        let outcome = PollingExecutor::new(self.sleeper).run_until_done(
            &label,
            &self.settings.delete_polling,
            || {
                let results = certificates.describe_delete_tasks(&task_ids)?;
                let settled = delete_tasks_settled(&task_ids, &results);
                latest = results;
                Ok(if settled {
                    PollStatus::Done
                } else {
                    PollStatus::Pending
                })
            },
        );

        match &outcome {
            TaskOutcome::Completed => info!("[rotation] {label}: all delete tasks finished"),
            TaskOutcome::TimedOut => error!(
                "[rotation] {label}: delete tasks still in progress after {} attempts",
                self.settings.delete_polling.max_attempts
            ),
            TaskOutcome::Failed(reason) => return Err(RotationError::Delete(reason.clone())),
        }

        report_delete_statuses(&response.tasks, &latest);
        Ok((outcome, latest))
    }
}

/// True when every task id has a reported status and none is still in
/// progress. Failed statuses count as settled.
pub fn delete_tasks_settled(task_ids: &[String], results: &[DeleteTaskResult]) -> bool {
    task_ids.iter().all(|task_id| {
        results
            .iter()
            .find(|result| &result.task_id == task_id)
            .is_some_and(|result| !result.status.is_in_progress())
    })
}

fn report_delete_statuses(tasks: &[DeleteTaskHandle], results: &[DeleteTaskResult]) {
    for task in tasks {
        let Some(result) = results.iter().find(|r| r.task_id == task.task_id) else {
            warn!(
                "[rotation] No status reported for delete of {} (task {})",
                task.cert_id, task.task_id
            );
            continue;
        };

        if result.status.is_failure() {
            let detail = result
                .error
                .as_deref()
                .map(|e| format!(": {e}"))
                .unwrap_or_default();
            let domains = if result.domains.is_empty() {
                String::new()
            } else {
                format!(" (domains: {})", result.domains.join(", "))
            };
            error!(
                "[rotation] Delete of {} ended with status {}{}{}",
                task.cert_id, result.status, detail, domains
            );
        } else if result.status.is_in_progress() {
            error!(
                "[rotation] Delete of {} is still {}",
                task.cert_id,
                result.status.description()
            );
        } else {
            info!("[rotation] Deleted {} (task {})", task.cert_id, task.task_id);
        }
    }
}

fn join_ids<'i>(ids: impl Iterator<Item = &'i CertificateId>) -> String {
    ids.map(CertificateId::as_str).collect::<Vec<_>>().join(", ")
}
