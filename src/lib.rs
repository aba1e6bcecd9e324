//! gstclip
//!
//! GStreamer demo programs: a live stream viewer that clips to MP4 on demand
//! and a URI audio player. Both link decoder pads as they appear and stop on
//! end-of-stream or error.

pub mod common;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod pipeline;

pub use config::{AppConfig, ClipperConfig, ConfigError, PlayerConfig};
pub use error::{ClipError, ClipResult};
pub use keyboard::{InputEvent, KeyCommand};
pub use pipeline::{AudioPlayer, BusFlow, PadAction, RecordingSwitch, StreamClipper};

/// Main application entry point
pub use common::run;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
