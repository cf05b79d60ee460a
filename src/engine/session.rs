// Single-threaded event loop over the registry, dialogs, backend and progress channel

use super::backend::TranscodeBackend;
use super::core::{Job, JobId, RegistryError, TranscodeParameters, VideoJobRegistry};
use super::dialog::{DialogCoordinator, DialogKind};
use super::progress::{BackendEvent, EventSender, EventSink, ProgressChannel};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// What changed after an event was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    JobsDiscovered(Vec<JobId>),
    OutputDirectoryChanged(PathBuf),
    WatermarkImageSelected(PathBuf),
    Progress {
        id: JobId,
        percent: f64,
        position: String,
    },
    Completed(JobId),
    Failed { id: JobId, reason: String },
    LoadingChanged(bool),
}

/// All mutation happens on the thread that owns the session
pub struct Session<B: TranscodeBackend> {
    registry: VideoJobRegistry,
    dialogs: DialogCoordinator,
    backend: B,
    channel: ProgressChannel,
}

impl<B: TranscodeBackend> Session<B> {
    /// `channel` must be the one whose sender the backend was built with
    pub fn new(backend: B, channel: ProgressChannel) -> Result<Self> {
        let app_data = backend
            .app_data()
            .context("Failed to read application settings from backend")?;
        Ok(Self {
            registry: VideoJobRegistry::new(app_data),
            dialogs: DialogCoordinator::new(),
            backend,
            channel,
        })
    }

    pub fn registry(&self) -> &VideoJobRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn sender(&self) -> EventSender {
        self.channel.sender()
    }

    pub fn is_busy(&self) -> bool {
        self.dialogs.is_busy()
    }

    pub fn request_video_files(&mut self) -> Result<bool> {
        self.dialogs
            .request(DialogKind::VideoFiles, &mut self.backend)
    }

    pub fn request_output_directory(&mut self) -> Result<bool> {
        self.dialogs
            .request(DialogKind::OutputDirectory, &mut self.backend)
    }

    pub fn request_watermark_image(&mut self) -> Result<bool> {
        self.dialogs
            .request(DialogKind::WatermarkImage, &mut self.backend)
    }

    pub fn attach_parameters(
        &mut self,
        id: JobId,
        params: TranscodeParameters,
    ) -> Result<(), RegistryError> {
        self.registry.attach_parameters(id, params)
    }

    pub fn dispatch(&mut self, id: JobId) -> Result<String, RegistryError> {
        self.registry.dispatch(id, &mut self.backend)
    }

    pub fn cancel(&mut self, id: JobId) -> Result<(), RegistryError> {
        self.registry.cancel(id, &mut self.backend)
    }

    pub fn remove(&mut self, id: JobId) -> Result<Job, RegistryError> {
        self.registry.remove(id)
    }

    /// Open the job's current file (the output once completed) in the system viewer
    pub fn open_in_viewer(&self, id: JobId) -> Result<()> {
        let job = self.registry.get(id).ok_or(RegistryError::NotFound(id))?;
        self.backend.open_in_viewer(&job.metadata.path)
    }

    /// Apply one event
    pub fn handle(&mut self, event: BackendEvent) -> Option<Notification> {
        match event {
            BackendEvent::Progress {
                id,
                percent,
                position,
            } => {
                if !self.registry.on_progress(id, percent, position) {
                    return None;
                }
                let job = self.registry.get(id)?;
                Some(Notification::Progress {
                    id,
                    percent: job.progress.percent(),
                    position: job.position.clone().unwrap_or_default(),
                })
            }
            BackendEvent::Success { id, metadata } => self
                .registry
                .on_success(id, metadata)
                .then_some(Notification::Completed(id)),
            BackendEvent::Failure { id, reason } => self
                .registry
                .on_failure(id, reason.clone())
                .then_some(Notification::Failed { id, reason }),
            BackendEvent::FilesSelected(outcome) => {
                let added = self.dialogs.on_files_selected(outcome, &mut self.registry);
                (!added.is_empty()).then_some(Notification::JobsDiscovered(added))
            }
            BackendEvent::DirectorySelected(outcome) => self
                .dialogs
                .on_directory_selected(outcome, &mut self.registry)
                .map(Notification::OutputDirectoryChanged),
            BackendEvent::WatermarkImageSelected(outcome) => self
                .dialogs
                .on_watermark_image_selected(outcome)
                .map(Notification::WatermarkImageSelected),
            BackendEvent::LoadingStatusChanged(busy) => {
                self.dialogs.on_loading_status(busy);
                Some(Notification::LoadingChanged(busy))
            }
        }
    }

    /// Apply everything already queued
    pub fn pump(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Some(event) = self.channel.try_next() {
            out.extend(self.handle(event));
        }
        out
    }

    /// Block up to `timeout` for the next event, then drain the queue
    pub fn wait(&mut self, timeout: Duration) -> Vec<Notification> {
        let mut out = Vec::new();
        if let Some(event) = self.channel.recv_timeout(timeout) {
            out.extend(self.handle(event));
            out.extend(self.pump());
        }
        out
    }
}
