// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{COPY, TranscodeParameters};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where transcoded files are written (unset: `output/` next to the executable)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Parameter defaults for new jobs; CLI flags override these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_copy")]
    pub video_codec: String,

    #[serde(default = "default_copy")]
    pub audio_codec: String,

    #[serde(default = "default_copy")]
    pub video_height: String,

    #[serde(default = "default_copy")]
    pub fps: String,

    #[serde(default = "default_copy")]
    pub video_bitrate: String,

    #[serde(default = "default_copy")]
    pub rotate: String,

    #[serde(default = "default_placement")]
    pub watermark_placement: String,

    /// Use GPU encoders when ffmpeg supports them
    #[serde(default)]
    pub use_gpu: bool,

    /// Encoder threads per job (unset: 1)
    #[serde(default)]
    pub cpu_threads: Option<u32>,
}

fn default_copy() -> String {
    COPY.to_string()
}

fn default_placement() -> String {
    "top-right".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            video_codec: default_copy(),
            audio_codec: default_copy(),
            video_height: default_copy(),
            fps: default_copy(),
            video_bitrate: default_copy(),
            rotate: default_copy(),
            watermark_placement: default_placement(),
            use_gpu: false,
            cpu_threads: None,
        }
    }
}

impl DefaultsConfig {
    /// Transcode parameters seeded from these defaults
    pub fn parameters(&self) -> TranscodeParameters {
        TranscodeParameters {
            video_codec: self.video_codec.clone(),
            audio_codec: self.audio_codec.clone(),
            video_height: self.video_height.clone(),
            fps: self.fps.clone(),
            video_bitrate: self.video_bitrate.clone(),
            watermark_placement: self.watermark_placement.clone(),
            rotate: self.rotate.clone(),
            use_gpu: self.use_gpu,
            cpu_threads: self.cpu_threads.unwrap_or(1),
            ..TranscodeParameters::default()
        }
    }
}

/// `output/` beside the running executable, or under the working directory
pub fn default_output_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
        .join("output")
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("vidbatch")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("vidbatch")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();

            // Not fatal: the directory may not be writable
            if let Err(e) = config.save() {
                tracing::warn!("Could not create default config file: {:#}", e);
                eprintln!(
                    "Using built-in defaults. Run 'vidbatch init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Create a default config file if it doesn't exist
    pub fn ensure_default() -> Result<()> {
        if !Self::exists() {
            Config::default().save()?;
        }
        Ok(())
    }

    /// Configured output directory, or the default location
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(default_output_directory)
    }
}
