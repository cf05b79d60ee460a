// ffmpeg-backed transcoding backend: one worker thread per dispatched job

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, info, warn};

use super::backend::{DispatchRequest, TranscodeBackend};
use super::core::{
    AppData, JobId, ProgressParser, ProgressPosition, build_transcode_cmd, derive_output_path,
    expand_selection, format_cmd,
};
use super::dialog::DialogOutcome;
use super::progress::{BackendEvent, EventSender};
use super::{hardware, probe};
use crate::config::Config;
use crate::units::format_duration;

/// Lines of ffmpeg stderr kept for failure reports
const STDERR_TAIL_LINES: usize = 12;

/// Detect process-wide settings from config and the host
pub fn detect_app_data(config: &Config) -> AppData {
    AppData {
        output_directory: config.output_directory(),
        cpu_threads: hardware::cpu_thread_count(),
        gpu: hardware::gpu_supported(),
    }
}

/// Answers for interactive requests, supplied up front by a non-interactive front end
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Files or directories to offer as the video selection
    pub videos: Vec<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub watermark_image: Option<PathBuf>,
}

pub struct FfmpegBackend {
    events: EventSender,
    app_data: AppData,
    selection: Selection,
    /// Write the chosen output directory back to the config file
    persist_output_directory: bool,
    cancel_flags: HashMap<JobId, Arc<AtomicBool>>,
}

impl FfmpegBackend {
    pub fn new(events: EventSender, app_data: AppData, selection: Selection) -> Self {
        Self {
            events,
            app_data,
            selection,
            persist_output_directory: false,
            cancel_flags: HashMap::new(),
        }
    }

    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist_output_directory = persist;
        self
    }

    fn apply_output_directory(&mut self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        if self.persist_output_directory {
            let mut config = Config::load().unwrap_or_default();
            config.output.directory = Some(dir.to_path_buf());
            config.save()?;
        }
        self.app_data.output_directory = dir.to_path_buf();
        Ok(())
    }
}

impl TranscodeBackend for FfmpegBackend {
    fn app_data(&self) -> Result<AppData> {
        Ok(self.app_data.clone())
    }

    fn select_video_files(&mut self) -> Result<()> {
        let paths = std::mem::take(&mut self.selection.videos);
        let events = self.events.clone();

        if paths.is_empty() {
            let _ = events.send(BackendEvent::FilesSelected(DialogOutcome::Cancelled));
            return Ok(());
        }

        events.loading(true);
        thread::spawn(move || {
            let mut videos = Vec::new();
            for path in expand_selection(&paths) {
                match probe::probe_video(&path) {
                    Ok(info) => videos.push(info),
                    Err(e) => warn!(path = %path.display(), "skipping unreadable video: {:#}", e),
                }
            }
            let _ = events.send(BackendEvent::FilesSelected(DialogOutcome::Selected(videos)));
            events.loading(false);
        });
        Ok(())
    }

    fn set_output_directory(&mut self) -> Result<()> {
        let outcome = match self.selection.output_directory.take() {
            None => DialogOutcome::Cancelled,
            Some(dir) => match self.apply_output_directory(&dir) {
                Ok(()) => DialogOutcome::Selected(dir),
                Err(e) => DialogOutcome::Error(format!("{:#}", e)),
            },
        };
        let _ = self.events.send(BackendEvent::DirectorySelected(outcome));
        Ok(())
    }

    fn select_watermark_image(&mut self) -> Result<()> {
        let outcome = match self.selection.watermark_image.take() {
            None => DialogOutcome::Cancelled,
            Some(path) if path.is_file() => DialogOutcome::Selected(path),
            Some(path) => DialogOutcome::Error(format!("not a file: {}", path.display())),
        };
        let _ = self.events.send(BackendEvent::WatermarkImageSelected(outcome));
        Ok(())
    }

    fn open_in_viewer(&self, path: &Path) -> Result<()> {
        open_path(path)
    }

    fn dispatch(&mut self, request: DispatchRequest) -> Result<String> {
        let output = derive_output_path(&request.path, &request.output_directory);
        if output == request.path {
            bail!(
                "output would overwrite the source file {}",
                request.path.display()
            );
        }
        fs::create_dir_all(&request.output_directory).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                request.output_directory.display()
            )
        })?;

        let mut cmd = build_transcode_cmd(&request.path, &output, &request.params);
        debug!(id = %request.id, cmd = %format_cmd(&cmd), "spawning ffmpeg");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let child = cmd.spawn().context("Failed to spawn ffmpeg")?;
        let ticket = format!("ffmpeg-{}", child.id());

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_flags.insert(request.id, cancel.clone());

        let run = JobRun {
            id: request.id,
            duration: request.duration,
            output,
            cancel,
            events: self.events.clone(),
        };
        thread::spawn(move || run.watch(child));

        Ok(ticket)
    }

    fn cancel(&mut self, id: JobId) -> Result<()> {
        match self.cancel_flags.remove(&id) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
            None => bail!("no running ffmpeg process for job {}", id),
        }
    }
}

/// State owned by one job's worker thread
struct JobRun {
    id: JobId,
    duration: f64,
    output: PathBuf,
    cancel: Arc<AtomicBool>,
    events: EventSender,
}

impl JobRun {
    fn watch(self, mut child: Child) {
        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = BufReader::new(stderr).read_to_string(&mut text);
                text
            })
        });

        let mut parser = ProgressParser::new();
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if self.cancel.load(Ordering::SeqCst) {
                    let _ = child.kill();
                    break;
                }
                parser.parse_line(&line);
                if parser.block_ready && !parser.is_complete && self.duration > 0.0 {
                    self.events.progress(
                        self.id,
                        parser.progress_pct(self.duration),
                        ProgressPosition::At(format_duration(parser.out_time_s())),
                    );
                }
            }
        }

        let status = child.wait();
        let stderr = stderr_thread
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        if self.cancel.load(Ordering::SeqCst) {
            info!(id = %self.id, "ffmpeg stopped after cancel");
            return;
        }

        match status {
            Ok(status) if status.success() => {
                self.events
                    .progress(self.id, 100.0, ProgressPosition::Completed);
                match probe::probe_video(&self.output) {
                    Ok(metadata) => self.events.success(self.id, metadata),
                    Err(e) => self
                        .events
                        .failure(self.id, format!("output could not be probed: {:#}", e)),
                }
            }
            Ok(status) => self.events.failure(
                self.id,
                format!("ffmpeg exited with {}: {}", status, stderr_tail(&stderr)),
            ),
            Err(e) => self
                .events
                .failure(self.id, format!("failed to wait for ffmpeg: {}", e)),
        }
    }
}

/// Last few non-empty lines of ffmpeg's stderr
pub fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Open a file or directory with the platform's default application
pub fn open_path(path: &Path) -> Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        std::process::Command::new("xdg-open")
    };
    cmd.arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(())
}
