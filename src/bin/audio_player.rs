//! Stream the audio of a URI to the default audio output

use anyhow::Context;
use clap::Parser;
use gstclip::{AppConfig, AudioPlayer, ClipError};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play the audio track of a URI")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Media URI
    #[arg(long)]
    uri: Option<String>,
}

/// Attach the setup step that failed to a player construction error
fn setup_context(err: ClipError) -> anyhow::Error {
    match err {
        ClipError::ElementCreationFailed(..) => {
            anyhow::Error::new(err).context("Cannot create all elements")
        }
        ClipError::LinkFailed(_) => anyhow::Error::new(err).context("Cannot link elements"),
        other => other.into(),
    }
}

fn player_main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_ref())?;
    if let Some(uri) = args.uri {
        config.player.uri = uri;
    }
    config.player.validate()?;

    info!("Playing {}", config.player.uri);
    let player = AudioPlayer::new(&config.player).map_err(setup_context)?;
    player.run().context("Playback failed")?;
    Ok(())
}

fn main() {
    gstclip::run(player_main);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_context() {
        let err = setup_context(ClipError::ElementCreationFailed(
            "autoaudiosink".to_string(),
            "Check that the -good plugin set is installed.".to_string(),
        ));
        let message = format!("{:#}", err);
        assert!(message.starts_with("Cannot create all elements: autoaudiosink"));
    }

    #[test]
    fn test_link_failure_context() {
        let err = setup_context(ClipError::LinkFailed(
            "Audio convert, resample and sink".to_string(),
        ));
        let message = format!("{:#}", err);
        assert_eq!(
            message,
            "Cannot link elements: Audio convert, resample and sink could not be linked"
        );
        assert!(!message.contains("create"));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = setup_context(ClipError::BusUnavailable);
        assert_eq!(format!("{:#}", err), "Pipeline has no bus");
    }
}
