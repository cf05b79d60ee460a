// Job orchestration engine - independent of any front end

pub mod backend;
pub mod core;
pub mod dialog;
pub mod hardware;
pub mod probe;
pub mod progress;
pub mod session;
pub mod validate;
pub mod worker;

pub use core::*;
