use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Jobs share their identifier with the probed video they were created from
pub type JobId = Uuid;

/// Process-wide settings reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub output_directory: PathBuf,
    #[serde(rename = "cpuThread")]
    pub cpu_threads: u32,
    pub gpu: bool,
}

/// Facts about a source (or transcoded) file, fixed once probed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: JobId,
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub thumbnail: String,
    pub size: u64,
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub bitrate: u64,
    pub video_codec: String,
    pub audio_codec: String,
    pub video_bitrate: u64,
    pub audio_bitrate: u64,
}

impl VideoMetadata {
    /// Metadata with a fresh identifier and nothing probed yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            name,
            path,
            thumbnail: String::new(),
            size: 0,
            duration: 0.0,
            width: 0,
            height: 0,
            fps: 0.0,
            bitrate: 0,
            video_codec: String::new(),
            audio_codec: String::new(),
            video_bitrate: 0,
            audio_bitrate: 0,
        }
    }
}

/// The transformation requested for one video.
///
/// Enumerable fields hold catalog strings ("copy" included); numeric meaning is left to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeParameters {
    pub video_codec: String,
    pub audio_codec: String,
    pub video_height: String,
    pub fps: String,
    pub video_bitrate: String,
    #[serde(default)]
    pub watermark_content: String,
    #[serde(default)]
    pub watermark_image: String,
    pub watermark_placement: String,
    pub rotate: String,
    #[serde(default)]
    pub use_gpu: bool,
    pub cpu_threads: u32,
}

impl Default for TranscodeParameters {
    fn default() -> Self {
        Self {
            video_codec: "copy".to_string(),
            audio_codec: "copy".to_string(),
            video_height: "copy".to_string(),
            fps: "copy".to_string(),
            video_bitrate: "copy".to_string(),
            watermark_content: String::new(),
            watermark_image: String::new(),
            watermark_placement: "top-right".to_string(),
            rotate: "copy".to_string(),
            use_gpu: false,
            cpu_threads: 1,
        }
    }
}

impl TranscodeParameters {
    pub fn has_text_watermark(&self) -> bool {
        !self.watermark_content.is_empty()
    }

    pub fn has_image_watermark(&self) -> bool {
        !self.watermark_image.is_empty()
    }

    /// Merge a watermark image chosen through the image dialog into this draft
    pub fn with_watermark_image(mut self, path: &Path) -> Self {
        self.watermark_image = path.to_string_lossy().into_owned();
        self
    }
}

/// Parameters are absent until the user configures the job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobParams {
    #[default]
    Unconfigured,
    Configured(TranscodeParameters),
}

impl JobParams {
    pub fn as_configured(&self) -> Option<&TranscodeParameters> {
        match self {
            JobParams::Configured(params) => Some(params),
            JobParams::Unconfigured => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Discovered,
    Configuring,
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Handed to the backend and not yet finished
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::InProgress)
    }
}

/// Stored progress: a percentage, or the backend's "completed" sentinel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Percent(f64),
    Completed,
}

impl Progress {
    pub fn percent(self) -> f64 {
        match self {
            Progress::Percent(p) => p,
            Progress::Completed => 100.0,
        }
    }
}

/// Current-position label carried by a progress event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPosition {
    At(String),
    Completed,
}

impl ProgressPosition {
    /// Interpret a raw label, where "completed" is the end-of-stream sentinel
    pub fn from_label(label: &str) -> Self {
        if label == "completed" {
            ProgressPosition::Completed
        } else {
            ProgressPosition::At(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ProgressPosition::At(label) => label,
            ProgressPosition::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub metadata: VideoMetadata,
    pub params: JobParams,
    pub status: JobStatus,
    pub progress: Progress,
    /// Last position label reported by the backend
    pub position: Option<String>,
    /// Acknowledgement token returned by the backend on dispatch
    pub ticket: Option<String>,
    pub last_error: Option<String>,
}

impl Job {
    /// Create a freshly discovered job
    pub fn new(metadata: VideoMetadata) -> Self {
        Self {
            id: metadata.id,
            metadata,
            params: JobParams::Unconfigured,
            status: JobStatus::Discovered,
            progress: Progress::Percent(0.0),
            position: None,
            ticket: None,
            last_error: None,
        }
    }
}

/// Parser for ffmpeg `-progress` output (key=value lines)
#[derive(Debug, Default, Clone)]
pub struct ProgressParser {
    pub out_time_us: u64,
    pub total_size: Option<u64>,
    pub is_complete: bool,
    /// Set once a full progress block (terminated by `progress=`) has been read
    pub block_ready: bool,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single line of ffmpeg progress output
    pub fn parse_line(&mut self, line: &str) {
        self.block_ready = false;
        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                // out_time_ms is microseconds too, despite the name
                "out_time_us" | "out_time_ms" => {
                    if let Ok(us) = value.trim().parse::<u64>() {
                        self.out_time_us = us;
                    }
                }
                "total_size" => {
                    if let Ok(size) = value.trim().parse::<u64>() {
                        self.total_size = Some(size);
                    }
                }
                "progress" => {
                    self.block_ready = true;
                    if value.trim() == "end" {
                        self.is_complete = true;
                    }
                }
                _ => {}
            }
        }
    }

    /// Get output time in seconds
    pub fn out_time_s(&self) -> f64 {
        self.out_time_us as f64 / 1_000_000.0
    }

    /// Calculate progress percentage given total duration
    pub fn progress_pct(&self, duration_s: f64) -> f64 {
        if duration_s > 0.0 {
            (self.out_time_s() / duration_s * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}
