//! Plays the audio track of a URI on the default audio output

use super::{bus_flow, link_pads_on_arrival, make_element, BusFlow, PadTarget};
use crate::config::PlayerConfig;
use crate::error::{ClipError, ClipResult, IntoClipError};
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{info, warn};

pub const PIPELINE_NAME: &str = "test-pipeline";

pub struct AudioPlayer {
    pipeline: gst::Pipeline,
}

impl AudioPlayer {
    /// Create `uridecodebin ~> audioconvert ! audioresample ! <sink>`
    ///
    /// The decoder is left unlinked; its raw audio pad is connected once it appears.
    pub fn new(config: &PlayerConfig) -> ClipResult<Self> {
        gst::init().into_clip_error()?;

        let pipeline = gst::Pipeline::builder().name(PIPELINE_NAME).build();

        let source = make_element("uridecodebin", "source")?;
        source.set_property("uri", config.uri.as_str());
        let convert = make_element("audioconvert", "convert")?;
        let resample = make_element("audioresample", "resample")?;
        let sink = make_element(&config.audio_sink, "sink")?;

        pipeline
            .add_many(&[&source, &convert, &resample, &sink])
            .into_clip_error()?;
        gst::Element::link_many(&[&convert, &resample, &sink])
            .map_err(|_| ClipError::LinkFailed("Audio convert, resample and sink".to_string()))?;

        link_pads_on_arrival(
            &source,
            PadTarget {
                element: convert,
                pad_name: "sink",
                media_prefix: "audio/x-raw",
                label: "raw audio",
            },
        );

        Ok(Self { pipeline })
    }

    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    /// Play until end-of-stream or an error
    pub fn run(&self) -> ClipResult<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|_| ClipError::StateChangeFailed("playing".to_string()))?;

        let bus = self.pipeline.bus().ok_or(ClipError::BusUnavailable)?;
        for msg in bus.iter_timed_filtered(
            gst::ClockTime::NONE,
            &[
                gst::MessageType::StateChanged,
                gst::MessageType::Error,
                gst::MessageType::Eos,
            ],
        ) {
            match bus_flow(&msg, &self.pipeline) {
                BusFlow::Quit => break,
                BusFlow::Continue => {}
                BusFlow::Ignored => warn!("Unexpected message received."),
            }
        }

        self.pipeline.set_state(gst::State::Null)?;
        info!("Pipeline stopped");
        Ok(())
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
