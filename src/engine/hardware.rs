//! Host capability detection: CPU threads, GPU acceleration, ffmpeg tool availability

use anyhow::{Context, Result, bail};
use std::process::Command;
use std::sync::OnceLock;
use sysinfo::System;

/// `ffmpeg -buildconf` flags that indicate some form of GPU acceleration
const GPU_BUILD_FLAGS: &[&str] = &[
    "--enable-nvenc",
    "--enable-cuda",
    "--enable-cuvid",
    "--enable-libnpp",
    "--enable-amf",
    "--enable-vaapi",
    "--enable-vdpau",
    "--enable-libvda",
    "--enable-opencl",
];

/// Logical CPU threads available for encoding (at least 1)
pub fn cpu_thread_count() -> u32 {
    let mut sys = System::new();
    sys.refresh_cpu();
    let count = sys.cpus().len();
    if count > 0 {
        return count as u32;
    }
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Cache for the output of `ffmpeg -buildconf`.
static FFMPEG_BUILDCONF_CACHE: OnceLock<String> = OnceLock::new();

fn ffmpeg_buildconf_output() -> &'static str {
    FFMPEG_BUILDCONF_CACHE.get_or_init(|| {
        Command::new("ffmpeg")
            .args(["-hide_banner", "-buildconf"])
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| {
                let mut text = String::from_utf8_lossy(&o.stdout).to_string();
                text.push_str(&String::from_utf8_lossy(&o.stderr));
                text
            })
            .unwrap_or_default()
    })
}

/// Whether a buildconf listing enables any GPU acceleration
pub fn buildconf_has_gpu(buildconf: &str) -> bool {
    GPU_BUILD_FLAGS.iter().any(|flag| buildconf.contains(flag))
}

/// Whether the installed ffmpeg was built with GPU acceleration (cached)
pub fn gpu_supported() -> bool {
    buildconf_has_gpu(ffmpeg_buildconf_output())
}

fn tool_version(tool: &str) -> Result<String> {
    let output = Command::new(tool)
        .arg("-version")
        .output()
        .with_context(|| format!("Failed to execute {tool}. Is {tool} installed and in PATH?"))?;

    if !output.status.success() {
        bail!("{} command failed with status: {}", tool, output.status);
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    let first_line = version_output.lines().next().unwrap_or("Unknown version");
    Ok(first_line.to_string())
}

/// Check if ffmpeg is available and return its version line
pub fn ffmpeg_version() -> Result<String> {
    tool_version("ffmpeg")
}

/// Check if ffprobe is available and return its version line
pub fn ffprobe_version() -> Result<String> {
    tool_version("ffprobe")
}
