use super::catalog::COPY;
use super::types::TranscodeParameters;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Output file for a source: same file name inside the output directory
pub fn derive_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join("output.mp4"),
    }
}

/// ffmpeg encoder for the requested video codec.
///
/// "copy" falls back to H.264 when the stream has to be re-encoded anyway.
pub fn video_encoder(params: &TranscodeParameters) -> &'static str {
    match (params.video_codec.as_str(), params.use_gpu) {
        ("h264", false) => "libx264",
        ("h264", true) => "h264_nvenc",
        ("h265", false) => "libx265",
        ("h265", true) => "hevc_nvenc",
        _ if needs_reencode(params) => {
            if params.use_gpu {
                "h264_nvenc"
            } else {
                "libx264"
            }
        }
        _ => "copy",
    }
}

pub fn audio_encoder(params: &TranscodeParameters) -> &'static str {
    match params.audio_codec.as_str() {
        "aac" => "aac",
        "mp3" => "libmp3lame",
        _ => "copy",
    }
}

/// Filters, frame rate and bitrate changes cannot be applied to a copied stream
fn needs_reencode(params: &TranscodeParameters) -> bool {
    !video_filters(params).is_empty()
        || params.has_image_watermark()
        || params.fps != COPY
        || params.video_bitrate != COPY
}

pub fn rotation_filter(rotate: &str) -> Option<&'static str> {
    match rotate {
        "90" => Some("transpose=1"),
        "180" => Some("transpose=1,transpose=1"),
        "270" => Some("transpose=2"),
        _ => None,
    }
}

/// Position expression for a watermark.
///
/// `fw`/`fh` name the frame size variables and `mw`/`mh` the mark size variables, which
/// differ between drawtext (w, h, tw, th) and overlay (W, H, w, h).
pub fn placement_expr(placement: &str, fw: &str, fh: &str, mw: &str, mh: &str) -> String {
    match placement {
        "random" => format!(
            "x=if(lt(sin(t*0.5)\\,0)\\,20\\,{fw}-{mw}-20):y=if(lt(cos(t*0.3)\\,0)\\,20\\,{fh}-{mh}-20)"
        ),
        "horizontal" => format!("x={fw}/2+({fw}/4)*sin(2*PI*t/8):y={fh}/2"),
        "diagonal" => format!("x={fw}*t/30:y={fh}*t/30"),
        "bounce" => format!("x={fw}/2+({fw}/3)*sin(2*PI*t/10):y={fh}/2+({fh}/3)*cos(2*PI*t/7)"),
        "spiral" => format!(
            "x={fw}/2+({fw}/4)*(sin(2*PI*t/12)+cos(2*PI*t/6)):y={fh}/2+({fh}/4)*(cos(2*PI*t/12)-sin(2*PI*t/6))"
        ),
        _ => format!("x={fw}-{mw}-20:y=20"),
    }
}

/// Escape text for a single-quoted drawtext `text` option
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("'\\\\\\''"),
            '%' => out.push_str("\\%"),
            ':' | ',' | '[' | ']' | '=' | '+' | '~' | '&' | '^' | '!' | ';' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

pub fn drawtext_filter(text: &str, placement: &str) -> String {
    format!(
        "drawtext=text='{}':fontcolor=white:fontsize=24:{}:borderw=2:bordercolor=black",
        escape_drawtext(text),
        placement_expr(placement, "w", "h", "tw", "th")
    )
}

/// Ordered single-input video filter chain: scale, text watermark, rotation
pub fn video_filters(params: &TranscodeParameters) -> Vec<String> {
    let mut filters = Vec::new();

    if params.video_height != COPY {
        // -2 keeps the width even for yuv420p encoders
        filters.push(format!("scale=-2:{}", params.video_height));
    }

    if params.has_text_watermark() {
        filters.push(drawtext_filter(
            &params.watermark_content,
            &params.watermark_placement,
        ));
    }

    if let Some(rotation) = rotation_filter(&params.rotate) {
        filters.push(rotation.to_string());
    }

    filters
}

/// Build the ffmpeg command for one job.
///
/// Progress goes to stdout in `-progress` key=value form; diagnostics stay on stderr.
pub fn build_transcode_cmd(input: &Path, output: &Path, params: &TranscodeParameters) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-y"]);
    cmd.arg("-i").arg(input);
    if params.has_image_watermark() {
        cmd.arg("-i").arg(&params.watermark_image);
    }

    if params.cpu_threads > 0 {
        cmd.arg("-threads").arg(params.cpu_threads.to_string());
    }

    cmd.arg("-c:v").arg(video_encoder(params));
    cmd.arg("-c:a").arg(audio_encoder(params));

    let filters = video_filters(params);
    if params.has_image_watermark() {
        let overlay = format!(
            "overlay={}",
            placement_expr(&params.watermark_placement, "W", "H", "w", "h")
        );
        let graph = if filters.is_empty() {
            format!("[0:v][1:v]{}[vout]", overlay)
        } else {
            format!("[0:v]{}[base];[base][1:v]{}[vout]", filters.join(","), overlay)
        };
        cmd.arg("-filter_complex").arg(graph);
        cmd.args(["-map", "[vout]", "-map", "0:a?"]);
    } else if !filters.is_empty() {
        cmd.arg("-vf").arg(filters.join(","));
    }

    if params.fps != COPY {
        cmd.arg("-r").arg(&params.fps);
    }
    if params.video_bitrate != COPY {
        cmd.arg("-b:v").arg(&params.video_bitrate);
    }

    cmd.args(["-progress", "pipe:1", "-nostats"]);
    cmd.arg(output);
    cmd
}

/// Render a command for display, quoting arguments that contain spaces
pub fn format_cmd(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|arg| {
        let s = arg.to_string_lossy();
        if s.contains(' ') {
            format!("\"{}\"", s)
        } else {
            s.to_string()
        }
    }));
    parts.join(" ")
}
