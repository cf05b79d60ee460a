#![allow(dead_code)]

pub mod ffmpeg_runner;
