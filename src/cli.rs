use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidbatch")]
#[command(about = "Batch video transcoder built on ffmpeg", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcode video files (directories are scanned recursively)
    Transcode {
        /// Video files or directories
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,

        /// Output directory for this run (saved to config)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Probe a video file and print its metadata as JSON
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// List the allowed values of every transcode parameter
    Options,

    /// Show output directory, CPU threads and GPU support
    AppData,

    /// Set and save the default output directory
    SetOutput {
        /// Directory for transcoded files
        directory: PathBuf,
    },

    /// Open a file or directory in the system viewer
    Open {
        path: PathBuf,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,

    /// Check if ffmpeg and ffprobe are installed
    CheckFfmpeg,
}

/// Parameter overrides; unset flags fall back to config defaults
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Target video codec (copy, h264, h265)
    #[arg(long)]
    pub video_codec: Option<String>,

    /// Target audio codec (copy, aac, mp3)
    #[arg(long)]
    pub audio_codec: Option<String>,

    /// Target height in pixels, width follows the aspect ratio
    #[arg(long)]
    pub height: Option<String>,

    /// Target frame rate
    #[arg(long)]
    pub fps: Option<String>,

    /// Target video bitrate in bits per second
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Clockwise rotation in degrees (90, 180, 270)
    #[arg(long)]
    pub rotate: Option<String>,

    /// Text watermark
    #[arg(long)]
    pub watermark: Option<String>,

    /// Image watermark file
    #[arg(long)]
    pub watermark_image: Option<PathBuf>,

    /// Watermark placement or motion (top-right, random, horizontal, diagonal, bounce, spiral)
    #[arg(long)]
    pub placement: Option<String>,

    /// Use GPU encoders
    #[arg(long)]
    pub gpu: bool,

    /// Encoder threads per job
    #[arg(long)]
    pub threads: Option<u32>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
