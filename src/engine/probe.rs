// Input probing using ffprobe

use super::core::VideoMetadata;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Default, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

// ffprobe reports numbers inside strings for format and stream fields
#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    filename: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// Probe a media file into fresh metadata (new identifier)
pub fn probe_video(path: &Path) -> Result<VideoMetadata> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .context("Failed to execute ffprobe. Is ffprobe installed and in PATH?")?;

    if !output.status.success() {
        bail!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout), path)
}

/// Build metadata from ffprobe JSON.
///
/// Missing fields stay zero. Duration falls back to the video stream's, and the container
/// bitrate falls back to the video stream bitrate.
pub fn parse_probe_output(json: &str, path: &Path) -> Result<VideoMetadata> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe JSON")?;

    let mut info = VideoMetadata::new(path);
    if let Some(filename) = probe.format.filename.as_deref().filter(|f| !f.is_empty()) {
        info.path = filename.into();
    }
    info.size = parse_num(probe.format.size.as_deref()).unwrap_or(0);
    info.duration = parse_float(probe.format.duration.as_deref()).unwrap_or(0.0);
    info.bitrate = parse_num(probe.format.bit_rate.as_deref()).unwrap_or(0);

    let mut has_video = false;
    for stream in &probe.streams {
        match stream.codec_type.as_deref() {
            Some("video") if !has_video => {
                has_video = true;
                info.video_codec = stream.codec_name.clone().unwrap_or_default();
                info.width = stream.width.unwrap_or(0);
                info.height = stream.height.unwrap_or(0);
                info.fps = stream
                    .avg_frame_rate
                    .as_deref()
                    .and_then(parse_fraction)
                    .unwrap_or(0.0);

                if info.duration == 0.0 {
                    info.duration = parse_float(stream.duration.as_deref()).unwrap_or(0.0);
                }
                if let Some(rate) = parse_num(stream.bit_rate.as_deref()) {
                    info.video_bitrate = rate;
                    if info.bitrate == 0 {
                        info.bitrate = rate;
                    }
                }
            }
            Some("audio") if info.audio_codec.is_empty() => {
                info.audio_codec = stream.codec_name.clone().unwrap_or_default();
                info.audio_bitrate = parse_num(stream.bit_rate.as_deref()).unwrap_or(0);
            }
            _ => {}
        }
    }

    if !has_video {
        bail!("No video stream found in {}", path.display());
    }

    Ok(info)
}

fn parse_num(s: Option<&str>) -> Option<u64> {
    s?.trim().parse().ok()
}

fn parse_float(s: Option<&str>) -> Option<f64> {
    s?.trim().parse().ok()
}

/// Parse a fraction string like "30000/1001" to f64
fn parse_fraction(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let numerator: f64 = num.trim().parse().ok()?;
    let denominator: f64 = den.trim().parse().ok()?;

    if denominator == 0.0 {
        return None;
    }

    Some(numerator / denominator)
}
