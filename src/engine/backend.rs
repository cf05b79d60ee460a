// Request side of the transcoding backend boundary

use super::core::{AppData, JobId, TranscodeParameters};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Everything the backend needs to start one job
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub id: JobId,
    pub path: PathBuf,
    /// Source duration in seconds, for percentage reporting
    pub duration: f64,
    pub output_directory: PathBuf,
    pub params: TranscodeParameters,
}

/// Requests the core issues to a transcoding backend.
///
/// Interactive requests and dispatch are fire-and-forget: their results arrive later as
/// `BackendEvent`s on the channel the backend was constructed with.
pub trait TranscodeBackend {
    fn app_data(&self) -> Result<AppData>;

    /// Ask for one or more source videos; answered by `FilesSelected`
    fn select_video_files(&mut self) -> Result<()>;

    /// Ask for a new output directory; answered by `DirectorySelected`
    fn set_output_directory(&mut self) -> Result<()>;

    /// Ask for a watermark image; answered by `WatermarkImageSelected`
    fn select_watermark_image(&mut self) -> Result<()>;

    fn open_in_viewer(&self, path: &Path) -> Result<()>;

    /// Start a job. Returns an acknowledgement token.
    fn dispatch(&mut self, request: DispatchRequest) -> Result<String>;

    /// Signal that a job should stop. Best effort.
    fn cancel(&mut self, id: JobId) -> Result<()>;
}
