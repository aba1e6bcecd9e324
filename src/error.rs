//! Error handling for the clipper and player pipelines
//!
//! Every setup step that can fail (element creation, pad requests, linking,
//! state changes) maps to one variant so the binaries can report it and exit.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for gstclip
#[derive(Error, Debug)]
pub enum ClipError {
    // Element and pipeline construction
    #[error("{0} element could not be created. {1}")]
    ElementCreationFailed(String, String),

    #[error("Unable to get {element} {template} pad template")]
    PadTemplateMissing { element: String, template: String },

    #[error("Could not request pad from {0}")]
    RequestPadFailed(String),

    #[error("Could not get {pad} pad from {element}")]
    StaticPadMissing { element: String, pad: String },

    #[error("{0} could not be linked")]
    LinkFailed(String),

    #[error("Unable to set the pipeline to the {0} state")]
    StateChangeFailed(String),

    #[error("Pipeline has no bus")]
    BusUnavailable,

    #[error("GStreamer error: {0}")]
    PipelineError(String),

    // Keyboard input
    #[error("Could not read standard input: {0}")]
    Stdin(#[from] std::io::Error),

    // Configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for convenience
pub type ClipResult<T> = std::result::Result<T, ClipError>;

/// Helper trait for converting GStreamer errors to ClipError
pub trait IntoClipError<T> {
    fn into_clip_error(self) -> ClipResult<T>;
}

impl<T> IntoClipError<T> for Result<T, gstreamer::glib::Error> {
    fn into_clip_error(self) -> ClipResult<T> {
        self.map_err(|e| ClipError::PipelineError(e.to_string()))
    }
}

impl<T> IntoClipError<T> for Result<T, gstreamer::glib::BoolError> {
    fn into_clip_error(self) -> ClipResult<T> {
        self.map_err(|e| ClipError::PipelineError(e.message.to_string()))
    }
}

impl From<gstreamer::StateChangeError> for ClipError {
    fn from(_: gstreamer::StateChangeError) -> Self {
        ClipError::StateChangeFailed("requested".to_string())
    }
}
