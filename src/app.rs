use crate::cli::{Cli, Commands, ParamArgs};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use vidbatch::engine::progress::ProgressChannel;
use vidbatch::engine::session::{Notification, Session};
use vidbatch::engine::worker::{self, FfmpegBackend, Selection};
use vidbatch::engine::{self, JobId, JobStatus, Parameter, TranscodeParameters};
use vidbatch::{config, units};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(cli: Cli) {
    if let Err(e) = engine::init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    match cli.command {
        Commands::Transcode {
            paths,
            params,
            output,
        } => handle_transcode(paths, params, output),
        Commands::Probe { file } => handle_probe(file),
        Commands::Options => handle_options(),
        Commands::AppData => handle_app_data(),
        Commands::SetOutput { directory } => handle_set_output(directory),
        Commands::Open { path } => handle_open(path),
        Commands::InitConfig => handle_init_config(),
        Commands::CheckFfmpeg => handle_check_ffmpeg(),
    }
}

/// Config defaults with CLI overrides applied
fn build_parameters(defaults: &config::DefaultsConfig, args: &ParamArgs) -> TranscodeParameters {
    let mut params = defaults.parameters();
    let overrides = [
        (&mut params.video_codec, &args.video_codec),
        (&mut params.audio_codec, &args.audio_codec),
        (&mut params.video_height, &args.height),
        (&mut params.fps, &args.fps),
        (&mut params.video_bitrate, &args.bitrate),
        (&mut params.rotate, &args.rotate),
        (&mut params.watermark_content, &args.watermark),
        (&mut params.watermark_placement, &args.placement),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value.clone();
        }
    }
    if args.gpu {
        params.use_gpu = true;
    }
    if let Some(threads) = args.threads {
        params.cpu_threads = threads;
    }
    params
}

fn handle_transcode(paths: Vec<PathBuf>, args: ParamArgs, output: Option<PathBuf>) {
    match transcode(paths, args, output) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether every job completed
fn transcode(paths: Vec<PathBuf>, args: ParamArgs, output: Option<PathBuf>) -> Result<bool> {
    let config = config::Config::load().unwrap_or_default();
    let mut params = build_parameters(&config.defaults, &args);

    let channel = ProgressChannel::new();
    let selection = Selection {
        videos: paths,
        output_directory: output.clone(),
        watermark_image: args.watermark_image.clone(),
    };
    let backend = FfmpegBackend::new(
        channel.sender(),
        worker::detect_app_data(&config),
        selection,
    )
    .with_persistence(true);
    let mut session = Session::new(backend, channel)?;

    if output.is_some() {
        session.request_output_directory()?;
        if !session
            .pump()
            .iter()
            .any(|n| matches!(n, Notification::OutputDirectoryChanged(_)))
        {
            bail!("Could not use the requested output directory");
        }
    }

    if args.watermark_image.is_some() {
        session.request_watermark_image()?;
        let image = session.pump().into_iter().find_map(|n| match n {
            Notification::WatermarkImageSelected(path) => Some(path),
            _ => None,
        });
        match image {
            Some(path) => params = params.with_watermark_image(&path),
            None => bail!("Watermark image is not a readable file"),
        }
    }

    println!("Probing input files...");
    session.request_video_files()?;
    let discovered = wait_for_discovery(&mut session);
    if discovered.is_empty() {
        bail!("No readable video files found");
    }

    println!(
        "Output directory: {}",
        session.registry().app_data().output_directory.display()
    );
    for id in &discovered {
        let name = job_name(&session, *id);
        if let Err(e) = session.attach_parameters(*id, params.clone()) {
            eprintln!("Skipping {}: {}", name, e);
            continue;
        }
        match session.dispatch(*id) {
            Ok(ticket) => println!("Queued {} ({})", name, ticket),
            Err(e) => eprintln!("Could not start {}: {}", name, e),
        }
    }

    while session.registry().has_active_jobs() {
        for notification in session.wait(POLL_INTERVAL) {
            report(&session, notification);
        }
    }

    let summary = session.registry().summary();
    let count = |status: JobStatus| summary.get(&status).copied().unwrap_or(0);
    println!(
        "Finished: {} completed, {} failed, {} skipped",
        count(JobStatus::Completed),
        count(JobStatus::Failed),
        count(JobStatus::Discovered) + count(JobStatus::Configuring)
    );

    Ok(count(JobStatus::Completed) == discovered.len())
}

fn wait_for_discovery<B: engine::backend::TranscodeBackend>(session: &mut Session<B>) -> Vec<JobId> {
    let mut discovered = Vec::new();
    loop {
        for notification in session.wait(POLL_INTERVAL) {
            match notification {
                Notification::JobsDiscovered(ids) => discovered.extend(ids),
                Notification::LoadingChanged(false) => return discovered,
                _ => {}
            }
        }
    }
}

fn job_name<B: engine::backend::TranscodeBackend>(session: &Session<B>, id: JobId) -> String {
    session
        .registry()
        .get(id)
        .map(|job| job.metadata.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn report<B: engine::backend::TranscodeBackend>(session: &Session<B>, notification: Notification) {
    match notification {
        Notification::Progress {
            id,
            percent,
            position,
        } => println!("[{}] {:5.1}% {}", job_name(session, id), percent, position),
        Notification::Completed(id) => {
            if let Some(job) = session.registry().get(id) {
                println!(
                    "Done: {} ({}, {})",
                    job.metadata.path.display(),
                    units::format_byte_size(job.metadata.size),
                    units::format_duration(job.metadata.duration)
                );
            }
        }
        Notification::Failed { id, reason } => {
            eprintln!("Failed: {}: {}", job_name(session, id), reason)
        }
        _ => {}
    }
}

fn handle_probe(file: PathBuf) {
    match engine::probe::probe_video(&file) {
        Ok(info) => {
            println!("Name: {}", info.name);
            println!("Size: {}", units::format_byte_size(info.size));
            println!("Duration: {}", units::format_duration(info.duration));
            println!(
                "Video: {} {}x{} @ {:.3} fps, {} bps",
                info.video_codec, info.width, info.height, info.fps, info.video_bitrate
            );
            if !info.audio_codec.is_empty() {
                println!("Audio: {}, {} bps", info.audio_codec, info.audio_bitrate);
            }
            println!("Container bitrate: {} bps", info.bitrate);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_options() {
    for param in Parameter::ALL {
        println!("{}: {}", param, engine::allowed_values(param).join(", "));
    }
}

fn handle_app_data() {
    let config = config::Config::load().unwrap_or_default();
    let app_data = worker::detect_app_data(&config);
    match serde_json::to_string_pretty(&app_data) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_set_output(directory: PathBuf) {
    if let Err(e) = set_output(directory) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn set_output(directory: PathBuf) -> Result<()> {
    let config = config::Config::load().unwrap_or_default();
    let channel = ProgressChannel::new();
    let selection = Selection {
        output_directory: Some(directory),
        ..Selection::default()
    };
    let backend = FfmpegBackend::new(
        channel.sender(),
        worker::detect_app_data(&config),
        selection,
    )
    .with_persistence(true);
    let mut session = Session::new(backend, channel)?;

    session.request_output_directory()?;
    let changed = session.pump().into_iter().find_map(|n| match n {
        Notification::OutputDirectoryChanged(dir) => Some(dir),
        _ => None,
    });
    let dir = changed.context("Output directory was not changed")?;
    println!("Output directory set to {}", dir.display());
    Ok(())
}

fn handle_open(path: PathBuf) {
    if let Err(e) = worker::open_path(&path) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn handle_init_config() {
    match config::Config::load() {
        Ok(cfg) => {
            match config::Config::config_path() {
                Ok(path) => println!("Config loaded successfully from {}", path.display()),
                Err(e) => println!("Config loaded, but config path unknown: {:#}", e),
            }
            println!("{:#?}", cfg);
        }
        Err(e) => {
            println!("Config missing or invalid: {:#}", e);
            println!("Creating default config...");

            let cfg = config::Config::default();
            if let Err(err) = cfg.save() {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            }
            match config::Config::config_path() {
                Ok(path) => println!("Default config saved to {}", path.display()),
                Err(e) => println!("Default config saved (path unknown): {:#}", e),
            }
        }
    }
}

fn handle_check_ffmpeg() {
    let checks = [
        ("ffmpeg", engine::hardware::ffmpeg_version()),
        ("ffprobe", engine::hardware::ffprobe_version()),
    ];
    for (tool, result) in checks {
        match result {
            Ok(version) => println!("{} found: {}", tool, version),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
    }
    println!(
        "GPU acceleration: {}",
        if engine::hardware::gpu_supported() {
            "available"
        } else {
            "not available"
        }
    );
}
