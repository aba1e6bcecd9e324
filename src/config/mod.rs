//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Stream the clipper opens when nothing else is configured
pub const DEFAULT_CLIPPER_URI: &str = "http://cctvsec.ktict.co.kr/138//JTYQpiZnGi4tnbFrn9n6pIiSJcySItxTBwQWVCrVLclBVzg4Fkof3+g7F4ae9hmVxX5rvfUcP+jTHNPljaZSBMkjpQnnxVKaUQo+7ilJFQ=";

/// Media the audio player streams when nothing else is configured
pub const DEFAULT_PLAYER_URI: &str =
    "https://gstreamer.freedesktop.org/data/media/sintel_trailer-480p.webm";

/// Clipper configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClipperConfig {
    /// URI handed to uridecodebin
    pub uri: String,
    /// Recording file location
    pub output: PathBuf,
    /// Encoder factory for the recording branch
    pub encoder: String,
    /// Muxer factory for the recording branch
    pub muxer: String,
    /// Video sink factory for the display branch
    pub video_sink: String,
    /// Open the valve as soon as the pipeline starts
    pub record_on_start: bool,
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_CLIPPER_URI.to_string(),
            output: PathBuf::from("result.mp4"),
            encoder: "x264enc".to_string(),
            muxer: "mp4mux".to_string(),
            video_sink: "autovideosink".to_string(),
            record_on_start: false,
        }
    }
}

/// Audio player configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// URI handed to uridecodebin
    pub uri: String,
    /// Audio sink factory
    pub audio_sink: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_PLAYER_URI.to_string(),
            audio_sink: "autoaudiosink".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub clipper: ClipperConfig,
    pub player: PlayerConfig,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_toml_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileReadError(path.clone(), e))?;

        let config = Self::from_toml_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// Values are checked by each program for the section it uses, so a bad
    /// `[clipper]` table does not stop the player from loading the same file.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))
    }

    /// Save configuration to TOML file
    pub fn to_toml_file(&self, path: &PathBuf) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(format!("TOML serialize error: {}", e)))?;

        std::fs::write(path, content).map_err(|e| ConfigError::FileWriteError(path.clone(), e))?;

        Ok(())
    }

    /// Load the file if one was given, otherwise start from defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clipper.validate()?;
        self.player.validate()
    }
}

impl ClipperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_uri("clipper.uri", &self.uri)?;

        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "clipper.output must not be empty".to_string(),
            ));
        }

        validate_factory("clipper.encoder", &self.encoder)?;
        validate_factory("clipper.muxer", &self.muxer)?;
        validate_factory("clipper.video_sink", &self.video_sink)
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_uri("player.uri", &self.uri)?;
        validate_factory("player.audio_sink", &self.audio_sink)
    }
}

fn validate_factory(field: &str, factory: &str) -> Result<(), ConfigError> {
    if factory.trim().is_empty() {
        return Err(ConfigError::InvalidValue(format!(
            "{} must name an element factory",
            field
        )));
    }
    Ok(())
}

fn validate_uri(field: &str, uri: &str) -> Result<(), ConfigError> {
    match uri.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            Ok(())
        }
        _ => Err(ConfigError::InvalidValue(format!(
            "{} must be a URI with a scheme, got '{}'",
            field, uri
        ))),
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileReadError(PathBuf, std::io::Error),

    #[error("Failed to write config file {0}: {1}")]
    FileWriteError(PathBuf, std::io::Error),

    #[error("Config parse error: {0}")]
    ParseError(String),

    #[error("Config serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_configs() {
        let clipper = ClipperConfig::default();
        assert_eq!(clipper.uri, DEFAULT_CLIPPER_URI);
        assert_eq!(clipper.output, PathBuf::from("result.mp4"));
        assert_eq!(clipper.encoder, "x264enc");
        assert_eq!(clipper.muxer, "mp4mux");
        assert!(!clipper.record_on_start);

        let player = PlayerConfig::default();
        assert_eq!(player.uri, DEFAULT_PLAYER_URI);
        assert_eq!(player.audio_sink, "autoaudiosink");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.clipper.uri = "not a uri".to_string();
        assert!(config.validate().is_err());
        config.clipper.uri = "://missing-scheme".to_string();
        assert!(config.validate().is_err());
        config.clipper.uri = "rtsp://camera.local/stream".to_string();
        assert!(config.validate().is_ok());

        config.clipper.output = PathBuf::new();
        assert!(config.validate().is_err());
        config.clipper.output = PathBuf::from("clip.mp4");

        config.clipper.encoder = "  ".to_string();
        assert!(config.validate().is_err());
        config.clipper.encoder = "x264enc".to_string();

        config.player.uri = "file://".to_string();
        assert!(config.validate().is_err());
        config.player.uri = "file:///tmp/song.ogg".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_validate_independently() {
        let mut config = AppConfig::default();
        config.clipper.muxer = String::new();

        assert!(config.clipper.validate().is_err());
        assert!(config.player.validate().is_ok());
        assert!(config.validate().is_err());

        config.clipper.muxer = "matroskamux".to_string();
        config.player.audio_sink = " ".to_string();
        assert!(config.clipper.validate().is_ok());
        assert!(config.player.validate().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [clipper]
            output = "clips/out.mp4"
            "#,
        )
        .unwrap();

        assert_eq!(config.clipper.output, PathBuf::from("clips/out.mp4"));
        assert_eq!(config.clipper.uri, DEFAULT_CLIPPER_URI);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::from_toml_str("[clipper\nuri = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));

        let config = AppConfig::from_toml_str("[player]\nuri = \"sintel.webm\"").unwrap();
        assert!(matches!(
            config.player.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(config.clipper.validate().is_ok());
    }

    #[test]
    fn test_config_file_serialization() {
        let mut config = AppConfig::default();
        config.clipper.record_on_start = true;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path().to_path_buf();

        assert!(config.to_toml_file(&temp_path).is_ok());

        let loaded_config = AppConfig::from_toml_file(&temp_path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_load_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());

        let missing = PathBuf::from("does/not/exist.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::FileReadError(_, _))
        ));
    }
}
