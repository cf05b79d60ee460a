// vidbatch library: job orchestration core plus the ffmpeg backend

pub mod config;
pub mod engine;
pub mod units;
