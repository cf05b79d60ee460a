//! Catalog-driven validation of transcode parameters before they are attached to a job.

use crate::engine::core::{Parameter, TranscodeParameters};
use serde::Serialize;
use std::fmt;

pub const NOT_IN_CATALOG: &str = "value not in catalog";
pub const EXCEEDS_THREADS: &str = "exceeds available threads";
pub const NOT_POSITIVE: &str = "must be a positive integer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Value of an enumerable field
fn field_value(params: &TranscodeParameters, param: Parameter) -> &str {
    match param {
        Parameter::VideoCodec => &params.video_codec,
        Parameter::AudioCodec => &params.audio_codec,
        Parameter::VideoHeight => &params.video_height,
        Parameter::Fps => &params.fps,
        Parameter::VideoBitrate => &params.video_bitrate,
        Parameter::Rotate => &params.rotate,
        Parameter::WatermarkPlacement => &params.watermark_placement,
    }
}

/// Validate every field, collecting all failures.
///
/// Enumerants are compared as strings; nothing is parsed as a number here.
pub fn validate_parameters(
    params: &TranscodeParameters,
    available_threads: u32,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for param in Parameter::ALL {
        if !param.options().contains(field_value(params, param)) {
            errors.push(err(param.field_name(), NOT_IN_CATALOG));
        }
    }

    if params.cpu_threads == 0 {
        errors.push(err("cpu_threads", NOT_POSITIVE));
    } else if params.cpu_threads > available_threads {
        errors.push(err("cpu_threads", EXCEEDS_THREADS));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn err(field: &str, reason: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
