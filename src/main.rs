use anyhow::Context;
use clap::Parser;
use gstclip::{AppConfig, StreamClipper};
use std::path::PathBuf;
use tracing::info;

/// View a live stream and clip it to a file with 'r'; quit with 'q'
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stream URI
    #[arg(long)]
    uri: Option<String>,

    /// Recording file location
    #[arg(long)]
    output: Option<PathBuf>,

    /// Encoder element factory
    #[arg(long)]
    encoder: Option<String>,

    /// Muxer element factory
    #[arg(long)]
    muxer: Option<String>,

    /// Start with recording on
    #[arg(long)]
    record: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_ref())?;

        if let Some(uri) = self.uri {
            config.clipper.uri = uri;
        }
        if let Some(output) = self.output {
            config.clipper.output = output;
        }
        if let Some(encoder) = self.encoder {
            config.clipper.encoder = encoder;
        }
        if let Some(muxer) = self.muxer {
            config.clipper.muxer = muxer;
        }
        if self.record {
            config.clipper.record_on_start = true;
        }

        config.clipper.validate()?;
        Ok(config)
    }
}

fn clipper_main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;
    info!("Recording target: {}", config.clipper.output.display());

    let clipper =
        StreamClipper::new(&config.clipper).context("Failed to build clipper pipeline")?;
    clipper.run()?;
    Ok(())
}

fn main() {
    gstclip::run(clipper_main);
}
