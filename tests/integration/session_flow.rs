// End-to-end flows through a Session with a scripted backend

use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use vidbatch::engine::progress::ProgressChannel;
use vidbatch::engine::session::{Notification, Session};
use vidbatch::engine::{JobId, JobStatus, Progress, ProgressPosition, RegistryError};
use vidbatch::units::{format_byte_size, format_duration};

use crate::common::fixtures::*;

fn session_with(videos: Vec<vidbatch::engine::VideoMetadata>) -> Session<MockBackend> {
    let channel = ProgressChannel::new();
    let backend = MockBackend::new(channel.sender()).with_videos(videos);
    Session::new(backend, channel).unwrap()
}

fn discover(session: &mut Session<MockBackend>) -> Vec<JobId> {
    assert!(session.request_video_files().unwrap());
    session
        .pump()
        .into_iter()
        .find_map(|n| match n {
            Notification::JobsDiscovered(ids) => Some(ids),
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn test_discover_configure_dispatch_complete() {
    let mut session = session_with(vec![video("v1.mp4", 125.0, 2_000_000)]);
    let ids = discover(&mut session);
    assert_eq!(ids.len(), 1);
    let v1 = ids[0];
    assert_eq!(session.registry().status(v1), Some(JobStatus::Discovered));
    assert!(!session.is_busy());

    session.attach_parameters(v1, h264_params()).unwrap();
    assert_eq!(session.dispatch(v1).unwrap(), "ticket-1");
    assert_eq!(session.registry().status(v1), Some(JobStatus::Queued));

    let request = &session.backend().dispatched[0];
    assert_eq!(request.path, PathBuf::from("/videos/v1.mp4"));
    assert_eq!(request.output_directory, PathBuf::from("/out"));
    assert_eq!(request.duration, 125.0);

    let events = session.sender();
    events.progress(v1, 50.0, ProgressPosition::At("00:01:02".into()));
    assert_eq!(
        session.pump(),
        vec![Notification::Progress {
            id: v1,
            percent: 50.0,
            position: "00:01:02".into(),
        }]
    );
    assert_eq!(session.registry().status(v1), Some(JobStatus::InProgress));

    let mut refreshed = video("v1.mp4", 125.0, 2_000_000);
    refreshed.path = PathBuf::from("/out/v1.mp4");
    events.success(v1, refreshed);
    assert_eq!(session.pump(), vec![Notification::Completed(v1)]);

    let job = session.registry().get(v1).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.id, v1);
    assert_eq!(job.metadata.path, PathBuf::from("/out/v1.mp4"));
    assert_eq!(format_duration(job.metadata.duration), "00:02:05");
    assert_eq!(format_byte_size(job.metadata.size), "1.91 MB");
}

#[test]
fn test_busy_backend_blocks_dialogs() {
    let mut session = session_with(vec![video("a.mp4", 10.0, 100)]);
    session.sender().loading(true);
    assert_eq!(session.pump(), vec![Notification::LoadingChanged(true)]);

    assert!(!session.request_video_files().unwrap());
    assert!(!session.request_output_directory().unwrap());
    assert_eq!(session.backend().videos.len(), 1);

    session.sender().loading(false);
    session.pump();
    assert_eq!(discover(&mut session).len(), 1);
}

#[test]
fn test_cancelled_selection_changes_nothing() {
    let mut session = session_with(Vec::new());
    assert!(discover(&mut session).is_empty());
    assert!(session.registry().is_empty());
}

#[test]
fn test_output_directory_applies_to_later_dispatches() {
    let mut session = session_with(vec![video("a.mp4", 10.0, 100)]);
    session.backend_mut().output_directory = Some(PathBuf::from("/srv/encoded"));

    assert!(session.request_output_directory().unwrap());
    assert_eq!(
        session.pump(),
        vec![Notification::OutputDirectoryChanged(PathBuf::from(
            "/srv/encoded"
        ))]
    );

    let id = discover(&mut session)[0];
    session.attach_parameters(id, h264_params()).unwrap();
    session.dispatch(id).unwrap();
    assert_eq!(
        session.backend().dispatched[0].output_directory,
        PathBuf::from("/srv/encoded")
    );
}

#[test]
fn test_watermark_image_selection() {
    let mut session = session_with(Vec::new());
    session.backend_mut().watermark_image = Some(PathBuf::from("/img/logo.png"));

    session.request_watermark_image().unwrap();
    assert_eq!(
        session.pump(),
        vec![Notification::WatermarkImageSelected(PathBuf::from(
            "/img/logo.png"
        ))]
    );

    // Second request: the dialog is dismissed
    session.request_watermark_image().unwrap();
    assert!(session.pump().is_empty());
}

#[test]
fn test_cancel_discards_late_events() {
    let mut session = session_with(vec![video("a.mp4", 10.0, 100)]);
    let id = discover(&mut session)[0];
    session.attach_parameters(id, h264_params()).unwrap();
    session.dispatch(id).unwrap();

    session.cancel(id).unwrap();
    assert_eq!(session.backend().cancelled, vec![id]);

    let events = session.sender();
    events.progress(id, 80.0, ProgressPosition::At("00:00:08".into()));
    events.success(id, video("a.mp4", 10.0, 90));
    assert!(session.pump().is_empty());

    let job = session.registry().get(id).unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
    assert_eq!(job.progress, Progress::Percent(0.0));

    // Finished jobs can be removed
    assert!(session.remove(id).is_ok());
}

#[test]
fn test_backend_rejection_fails_job() {
    let mut session = session_with(vec![video("a.mp4", 10.0, 100)]);
    let id = discover(&mut session)[0];
    session.attach_parameters(id, h264_params()).unwrap();
    session.backend_mut().reject_dispatch = true;

    match session.dispatch(id) {
        Err(RegistryError::DispatchRejected { id: rejected, reason }) => {
            assert_eq!(rejected, id);
            assert!(reason.contains("shutting down"));
        }
        other => panic!("expected DispatchRejected, got {:?}", other),
    }
    assert_eq!(session.registry().status(id), Some(JobStatus::Failed));
}

#[test]
fn test_failure_is_reported_once() {
    let mut session = session_with(vec![video("a.mp4", 10.0, 100)]);
    let id = discover(&mut session)[0];
    session.attach_parameters(id, h264_params()).unwrap();
    session.dispatch(id).unwrap();

    let events = session.sender();
    events.failure(id, "exit status 1");
    events.failure(id, "exit status 1");
    assert_eq!(
        session.pump(),
        vec![Notification::Failed {
            id,
            reason: "exit status 1".into(),
        }]
    );
    assert_eq!(
        session.registry().get(id).unwrap().last_error.as_deref(),
        Some("exit status 1")
    );
}

#[test]
fn test_open_in_viewer_uses_job_path() {
    let mut session = session_with(vec![video("a.mp4", 10.0, 100)]);
    let id = discover(&mut session)[0];
    session.open_in_viewer(id).unwrap();
    assert_eq!(
        *session.backend().opened.borrow(),
        vec![PathBuf::from("/videos/a.mp4")]
    );
    assert!(session.open_in_viewer(JobId::new_v4()).is_err());
}

#[test]
fn test_parallel_workers_interleave() {
    let mut session = session_with(vec![
        video("a.mp4", 10.0, 100),
        video("b.mp4", 20.0, 200),
    ]);
    let ids = discover(&mut session);
    for id in &ids {
        session.attach_parameters(*id, h264_params()).unwrap();
        session.dispatch(*id).unwrap();
    }

    let workers: Vec<_> = ids
        .iter()
        .map(|&id| {
            let events = session.sender();
            thread::spawn(move || {
                for step in 1..=10 {
                    let pct = step as f64 * 10.0;
                    events.progress(id, pct, ProgressPosition::At(format_duration(pct / 10.0)));
                }
                events.progress(id, 100.0, ProgressPosition::Completed);
                events.success(id, video("done.mp4", 1.0, 1));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut last = std::collections::HashMap::new();
    while session.registry().has_active_jobs() {
        for notification in session.wait(Duration::from_secs(1)) {
            if let Notification::Progress { id, percent, .. } = notification {
                let previous = last.insert(id, percent).unwrap_or(0.0);
                assert!(percent >= previous, "per-job order was not preserved");
            }
        }
    }
    for id in ids {
        assert_eq!(session.registry().status(id), Some(JobStatus::Completed));
    }
}
