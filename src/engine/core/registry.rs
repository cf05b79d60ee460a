// Video job registry - the single owner of every Job record

use super::types::{
    AppData, Job, JobId, JobParams, JobStatus, Progress, ProgressPosition, TranscodeParameters,
    VideoMetadata,
};
use crate::engine::backend::{DispatchRequest, TranscodeBackend};
use crate::engine::progress::EventSink;
use crate::engine::validate::{ValidationError, validate_parameters};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("invalid parameters: {}", format_reasons(.0))]
    InvalidParameters(Vec<ValidationError>),

    #[error("job {0} already exists")]
    DuplicateIdentifier(JobId),

    #[error("job {0} has no parameters attached or was already dispatched")]
    NotConfigured(JobId),

    #[error("job {0} is queued or running and cannot be removed")]
    JobActiveCannotRemove(JobId),

    #[error("job {id} is {status:?} and its parameters can no longer change")]
    NotEditable { id: JobId, status: JobStatus },

    #[error("backend rejected job {id}: {reason}")]
    DispatchRejected { id: JobId, reason: String },
}

fn format_reasons(reasons: &[ValidationError]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Jobs in discovery order, plus the settings used to validate and dispatch them
#[derive(Debug)]
pub struct VideoJobRegistry {
    jobs: Vec<Job>,
    app_data: AppData,
}

impl VideoJobRegistry {
    pub fn new(app_data: AppData) -> Self {
        Self {
            jobs: Vec::new(),
            app_data,
        }
    }

    pub fn app_data(&self) -> &AppData {
        &self.app_data
    }

    pub fn update_app_data(&mut self, app_data: AppData) {
        self.app_data = app_data;
    }

    pub fn set_output_directory(&mut self, dir: PathBuf) {
        info!(dir = %dir.display(), "output directory changed");
        self.app_data.output_directory = dir;
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.get(id).map(|j| j.status)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// True while any job is queued or running on the backend
    pub fn has_active_jobs(&self) -> bool {
        self.jobs.iter().any(|j| j.status.is_active())
    }

    /// Number of jobs per status
    pub fn summary(&self) -> HashMap<JobStatus, usize> {
        let mut counts = HashMap::new();
        for job in &self.jobs {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }

    fn job_mut(&mut self, id: JobId) -> Result<&mut Job, RegistryError> {
        self.jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    pub fn add_discovered(&mut self, metadata: VideoMetadata) -> Result<JobId, RegistryError> {
        let id = metadata.id;
        if self.get(id).is_some() {
            warn!(%id, "backend reported a duplicate video identifier");
            return Err(RegistryError::DuplicateIdentifier(id));
        }
        debug!(%id, name = %metadata.name, "video discovered");
        self.jobs.push(Job::new(metadata));
        Ok(id)
    }

    pub fn attach_parameters(
        &mut self,
        id: JobId,
        params: TranscodeParameters,
    ) -> Result<(), RegistryError> {
        let available = self.app_data.cpu_threads;
        let job = self.job_mut(id)?;
        if !matches!(job.status, JobStatus::Discovered | JobStatus::Configuring) {
            return Err(RegistryError::NotEditable {
                id,
                status: job.status,
            });
        }
        validate_parameters(&params, available).map_err(RegistryError::InvalidParameters)?;

        job.params = JobParams::Configured(params);
        job.status = JobStatus::Configuring;
        Ok(())
    }

    /// Hand a configured job to the backend.
    ///
    /// Returns the backend's acknowledgement token. A backend refusal fails the job.
    pub fn dispatch<B: TranscodeBackend + ?Sized>(
        &mut self,
        id: JobId,
        backend: &mut B,
    ) -> Result<String, RegistryError> {
        let output_directory = self.app_data.output_directory.clone();
        let job = self.job_mut(id)?;
        let params = match (&job.status, &job.params) {
            (JobStatus::Configuring, JobParams::Configured(params)) => params.clone(),
            _ => return Err(RegistryError::NotConfigured(id)),
        };

        let request = DispatchRequest {
            id,
            path: job.metadata.path.clone(),
            duration: job.metadata.duration,
            output_directory,
            params,
        };

        match backend.dispatch(request) {
            Ok(ticket) => {
                info!(%id, %ticket, "job dispatched");
                job.status = JobStatus::Queued;
                job.progress = Progress::Percent(0.0);
                job.ticket = Some(ticket.clone());
                Ok(ticket)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(%id, %reason, "dispatch rejected");
                job.status = JobStatus::Failed;
                job.last_error = Some(reason.clone());
                Err(RegistryError::DispatchRejected { id, reason })
            }
        }
    }

    /// Mark a job cancelled and, if the backend holds it, signal intent to stop.
    ///
    /// Terminal jobs stay as they are.
    pub fn cancel<B: TranscodeBackend + ?Sized>(
        &mut self,
        id: JobId,
        backend: &mut B,
    ) -> Result<(), RegistryError> {
        let job = self.job_mut(id)?;
        if job.status.is_terminal() {
            debug!(%id, status = ?job.status, "cancel ignored for finished job");
            return Ok(());
        }
        let was_active = job.status.is_active();
        job.status = JobStatus::Cancelled;
        info!(%id, "job cancelled");

        if was_active {
            if let Err(e) = backend.cancel(id) {
                // Local state is authoritative; later events for this id are dropped anyway
                warn!(%id, "backend cancel failed: {:#}", e);
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, id: JobId) -> Result<Job, RegistryError> {
        let idx = self
            .jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        if self.jobs[idx].status.is_active() {
            return Err(RegistryError::JobActiveCannotRemove(id));
        }
        Ok(self.jobs.remove(idx))
    }

    /// Find a job that can accept backend events
    fn live_job(&mut self, id: JobId, event: &str) -> Option<&mut Job> {
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == id) else {
            debug!(%id, event, "event for unknown job dropped");
            return None;
        };
        if !job.status.is_active() {
            debug!(%id, event, status = ?job.status, "event for inactive job dropped");
            return None;
        }
        Some(job)
    }
}

impl EventSink for VideoJobRegistry {
    fn on_progress(&mut self, id: JobId, percent: f64, position: ProgressPosition) -> bool {
        let Some(job) = self.live_job(id, "progress") else {
            return false;
        };
        job.status = JobStatus::InProgress;
        // Last write wins: the backend may restart a stage and report lower values
        job.progress = match &position {
            ProgressPosition::Completed => Progress::Completed,
            ProgressPosition::At(_) if percent.is_nan() => Progress::Percent(0.0),
            ProgressPosition::At(_) => Progress::Percent(percent.clamp(0.0, 100.0)),
        };
        job.position = Some(position.label().to_string());
        true
    }

    fn on_success(&mut self, id: JobId, mut refreshed: VideoMetadata) -> bool {
        let Some(job) = self.live_job(id, "success") else {
            return false;
        };
        refreshed.id = id;
        job.metadata = refreshed;
        job.status = JobStatus::Completed;
        job.progress = Progress::Completed;
        info!(%id, "job completed");
        true
    }

    fn on_failure(&mut self, id: JobId, reason: String) -> bool {
        let Some(job) = self.live_job(id, "failure") else {
            return false;
        };
        warn!(%id, %reason, "job failed");
        job.status = JobStatus::Failed;
        job.last_error = Some(reason);
        true
    }
}
