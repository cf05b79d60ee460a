// Dialog coordination: selection requests out, selection results into the registry

use super::backend::TranscodeBackend;
use super::core::{JobId, RegistryError, VideoJobRegistry, VideoMetadata};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of an interactive selection.
///
/// `Error` and `Cancelled` both leave the registry unchanged; they differ only in what gets logged.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome<T> {
    Selected(T),
    Error(String),
    Cancelled,
}

impl<T> DialogOutcome<T> {
    pub fn selected(self) -> Option<T> {
        match self {
            DialogOutcome::Selected(value) => Some(value),
            DialogOutcome::Error(_) | DialogOutcome::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    VideoFiles,
    OutputDirectory,
    WatermarkImage,
}

/// Tracks the process-wide busy signal and applies dialog results.
///
/// Holds no job state of its own.
#[derive(Debug, Default)]
pub struct DialogCoordinator {
    busy: bool,
}

impl DialogCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn on_loading_status(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Issue a selection request unless the backend is busy.
    ///
    /// Returns whether the request was sent.
    pub fn request<B: TranscodeBackend + ?Sized>(
        &self,
        kind: DialogKind,
        backend: &mut B,
    ) -> Result<bool> {
        if self.busy {
            debug!(?kind, "dialog request skipped while busy");
            return Ok(false);
        }
        match kind {
            DialogKind::VideoFiles => backend.select_video_files()?,
            DialogKind::OutputDirectory => backend.set_output_directory()?,
            DialogKind::WatermarkImage => backend.select_watermark_image()?,
        }
        Ok(true)
    }

    /// Register every selected video; duplicates are logged and skipped
    pub fn on_files_selected(
        &self,
        outcome: DialogOutcome<Vec<VideoMetadata>>,
        registry: &mut VideoJobRegistry,
    ) -> Vec<JobId> {
        let videos = match outcome {
            DialogOutcome::Selected(videos) => videos,
            DialogOutcome::Error(reason) => {
                warn!(%reason, "video selection failed");
                return Vec::new();
            }
            DialogOutcome::Cancelled => {
                debug!("video selection cancelled");
                return Vec::new();
            }
        };

        let mut added = Vec::with_capacity(videos.len());
        for video in videos {
            match registry.add_discovered(video) {
                Ok(id) => added.push(id),
                Err(RegistryError::DuplicateIdentifier(_)) => {}
                Err(e) => warn!("could not register video: {}", e),
            }
        }
        info!(count = added.len(), "videos added");
        added
    }

    pub fn on_directory_selected(
        &self,
        outcome: DialogOutcome<PathBuf>,
        registry: &mut VideoJobRegistry,
    ) -> Option<PathBuf> {
        let dir = log_outcome(DialogKind::OutputDirectory, outcome)?;
        registry.set_output_directory(dir.clone());
        Some(dir)
    }

    /// The caller merges the returned path into its parameter draft
    pub fn on_watermark_image_selected(&self, outcome: DialogOutcome<PathBuf>) -> Option<PathBuf> {
        log_outcome(DialogKind::WatermarkImage, outcome)
    }
}

fn log_outcome<T>(kind: DialogKind, outcome: DialogOutcome<T>) -> Option<T> {
    match outcome {
        DialogOutcome::Selected(value) => Some(value),
        DialogOutcome::Error(reason) => {
            warn!(?kind, %reason, "dialog failed");
            None
        }
        DialogOutcome::Cancelled => {
            debug!(?kind, "dialog cancelled");
            None
        }
    }
}
