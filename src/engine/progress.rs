// Progress channel: asynchronous events from the backend into the core

use super::core::{JobId, ProgressPosition, VideoMetadata};
use super::dialog::DialogOutcome;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender};
use std::time::Duration;

/// Message from the backend to the core
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Progress update for a dispatched job
    Progress {
        id: JobId,
        percent: f64,
        position: ProgressPosition,
    },

    /// Job finished; carries metadata of the produced file
    Success { id: JobId, metadata: VideoMetadata },

    /// Job failed with a reason
    Failure { id: JobId, reason: String },

    /// Answer to a video-file selection request
    FilesSelected(DialogOutcome<Vec<VideoMetadata>>),

    /// Answer to an output-directory request
    DirectorySelected(DialogOutcome<PathBuf>),

    /// Answer to a watermark-image request
    WatermarkImageSelected(DialogOutcome<PathBuf>),

    /// Process-wide busy indicator
    LoadingStatusChanged(bool),
}

impl BackendEvent {
    /// Job the event is addressed to, if any
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            BackendEvent::Progress { id, .. }
            | BackendEvent::Success { id, .. }
            | BackendEvent::Failure { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Receiving side of job events.
///
/// Each method returns whether the event changed state; events for unknown or finished
/// jobs are dropped and return false.
pub trait EventSink {
    fn on_progress(&mut self, id: JobId, percent: f64, position: ProgressPosition) -> bool;
    fn on_success(&mut self, id: JobId, metadata: VideoMetadata) -> bool;
    fn on_failure(&mut self, id: JobId, reason: String) -> bool;
}

/// Route a job event into a sink. Non-job events are returned untouched.
pub fn deliver<S: EventSink + ?Sized>(
    sink: &mut S,
    event: BackendEvent,
) -> Result<bool, BackendEvent> {
    match event {
        BackendEvent::Progress {
            id,
            percent,
            position,
        } => Ok(sink.on_progress(id, percent, position)),
        BackendEvent::Success { id, metadata } => Ok(sink.on_success(id, metadata)),
        BackendEvent::Failure { id, reason } => Ok(sink.on_failure(id, reason)),
        other => Err(other),
    }
}

/// Cloneable producer handle given to backends and their workers.
///
/// Events from one handle arrive in the order they were sent.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<BackendEvent>,
}

impl EventSender {
    pub fn send(&self, event: BackendEvent) -> Result<(), SendError<BackendEvent>> {
        self.tx.send(event)
    }

    pub fn progress(&self, id: JobId, percent: f64, position: ProgressPosition) {
        let _ = self.send(BackendEvent::Progress {
            id,
            percent,
            position,
        });
    }

    pub fn success(&self, id: JobId, metadata: VideoMetadata) {
        let _ = self.send(BackendEvent::Success { id, metadata });
    }

    pub fn failure(&self, id: JobId, reason: impl Into<String>) {
        let _ = self.send(BackendEvent::Failure {
            id,
            reason: reason.into(),
        });
    }

    pub fn loading(&self, busy: bool) {
        let _ = self.send(BackendEvent::LoadingStatusChanged(busy));
    }
}

pub struct ProgressChannel {
    tx: Sender<BackendEvent>,
    rx: Receiver<BackendEvent>,
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Next queued event without blocking
    pub fn try_next(&self) -> Option<BackendEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Never disconnected while the channel itself holds a sender.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BackendEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Push every queued job event into `sink`, returning the non-job events in arrival order
    pub fn deliver_pending<S: EventSink + ?Sized>(&self, sink: &mut S) -> Vec<BackendEvent> {
        let mut rest = Vec::new();
        while let Some(event) = self.try_next() {
            if let Err(other) = deliver(sink, event) {
                rest.push(other);
            }
        }
        rest
    }
}
