mod catalog;
mod ffmpeg_cmd;
mod log;
mod registry;
mod scan;
mod types;

pub use catalog::{COPY, OptionSet, Parameter, UnknownParameter, allowed_values};
pub use ffmpeg_cmd::{
    audio_encoder, build_transcode_cmd, derive_output_path, drawtext_filter, escape_drawtext,
    format_cmd, placement_expr, rotation_filter, video_encoder, video_filters,
};
pub use log::{LOG_ENV, init_logging};
pub use registry::{RegistryError, VideoJobRegistry};
pub use scan::{expand_selection, is_video_file, scan};
pub use types::{
    AppData, Job, JobId, JobParams, JobStatus, Progress, ProgressParser, ProgressPosition,
    TranscodeParameters, VideoMetadata,
};
