// Helpers for tests that run the real ffmpeg binaries

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};

/// Generate a small H.264 test clip with a sine-tone audio track
pub fn generate_test_video(output_path: &Path, duration_secs: f32) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .args(["-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={}:size=320x240:rate=30", duration_secs))
        .args(["-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={}", duration_secs))
        .args(["-c:v", "libx264", "-preset", "ultrafast", "-pix_fmt", "yuv420p"])
        .args(["-c:a", "aac", "-shortest"])
        .arg(output_path)
        .output()
        .context("Failed to generate test video")?;

    if !output.status.success() {
        bail!(
            "Failed to generate test video: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

fn tool_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Both ffmpeg and ffprobe are on PATH
pub fn is_ffmpeg_available() -> bool {
    tool_available("ffmpeg") && tool_available("ffprobe")
}
