//! Live stream viewer that can clip the stream to an MP4 file on demand
//!
//! ```text
//! uridecodebin ~> tee ─┬─ queue ─ videoconvert ─ autovideosink
//!                      └─ queue ─ valve ─ videoconvert ─ x264enc ─ mp4mux ─ filesink
//! ```
//!
//! The valve starts closed (`drop=true`); toggling recording opens it.

use super::{bus_flow, link_pads_on_arrival, make_element, BusFlow, PadTarget};
use crate::config::ClipperConfig;
use crate::error::{ClipError, ClipResult, IntoClipError};
use crate::keyboard::{spawn_stdin_reader, InputEvent, KeyCommand};
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

pub const PIPELINE_NAME: &str = "hls-stream-clipper-pipeline";

/// Gate in front of the recording branch
#[derive(Debug)]
pub struct RecordingSwitch {
    valve: gst::Element,
    recording: AtomicBool,
}

impl RecordingSwitch {
    /// Wrap a valve and close it
    pub fn new(valve: gst::Element) -> Self {
        valve.set_property("drop", true);
        Self {
            valve,
            recording: AtomicBool::new(false),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Open the valve. Returns false if recording was already on.
    pub fn start(&self) -> bool {
        if self
            .recording
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        info!("Starting recording...");
        self.valve.set_property("drop", false);
        true
    }

    /// Close the valve. Returns false if recording was already off.
    pub fn stop(&self) -> bool {
        if self
            .recording
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        info!("Stopping recording...");
        self.valve.set_property("drop", true);
        true
    }

    /// Flip the recording state and return the new one
    pub fn toggle(&self) -> bool {
        if self.is_recording() {
            self.stop();
        } else {
            self.start();
        }
        self.is_recording()
    }
}

/// Ask `main_loop` to quit once it is iterating
///
/// The quit is queued as an idle source so a request that arrives before
/// `run()` starts is not lost.
pub fn request_quit(main_loop: &glib::MainLoop) {
    let main_loop = main_loop.clone();
    glib::idle_add_once(move || main_loop.quit());
}

/// Apply one keyboard event. `Break` means stop reading input.
pub fn handle_input(
    event: InputEvent,
    switch: &RecordingSwitch,
    main_loop: &glib::MainLoop,
) -> glib::ControlFlow {
    match event {
        InputEvent::Command(KeyCommand::ToggleRecording) => {
            switch.toggle();
            glib::ControlFlow::Continue
        }
        InputEvent::Command(KeyCommand::Quit) => {
            info!("Quitting...");
            request_quit(main_loop);
            glib::ControlFlow::Break
        }
        InputEvent::Command(KeyCommand::Empty) => glib::ControlFlow::Continue,
        InputEvent::Command(KeyCommand::Unknown(cmd)) => {
            info!(
                "Unknown command: '{}'. Press 'r' to toggle recording, 'q' to quit.",
                cmd
            );
            glib::ControlFlow::Continue
        }
        InputEvent::Eof => {
            info!("Input channel closed (EOF). Quitting...");
            request_quit(main_loop);
            glib::ControlFlow::Break
        }
        InputEvent::Error(err) => {
            error!("Error reading input: {}", err);
            request_quit(main_loop);
            glib::ControlFlow::Break
        }
    }
}

/// Display pipeline with a switchable recording branch
pub struct StreamClipper {
    pipeline: gst::Pipeline,
    recording: Arc<RecordingSwitch>,
    uri: String,
    record_on_start: bool,
}

impl StreamClipper {
    /// Build and link the whole pipeline
    pub fn new(config: &ClipperConfig) -> ClipResult<Self> {
        gst::init().into_clip_error()?;

        let pipeline = gst::Pipeline::builder().name(PIPELINE_NAME).build();

        let decoder = gst::ElementFactory::make("uridecodebin")
            .name("uri-source-decoder")
            .property("uri", config.uri.as_str())
            .build()
            .map_err(|_| {
                ClipError::ElementCreationFailed(
                    "uridecodebin".to_string(),
                    "Check core GStreamer installation.".to_string(),
                )
            })?;

        let tee = make_element("tee", "video_tee")?;

        // Display branch
        let queue_display = make_element("queue", "video_queue_display")?;
        let convert_display = make_element("videoconvert", "video_convert_display")?;
        let sink_display = make_element(&config.video_sink, "video_sink_display")?;

        // Recording branch
        let queue_record = make_element("queue", "video_queue_record")?;
        let valve = make_element("valve", "video_valve")?;
        let convert_record = make_element("videoconvert", "video_convert_record")?;
        let encoder = make_element(&config.encoder, "video_encoder")?;
        let muxer = make_element(&config.muxer, "muxer")?;
        let location = config.output.to_string_lossy().into_owned();
        let file_sink = gst::ElementFactory::make("filesink")
            .name("file_sink")
            .property("location", location.as_str())
            .build()
            .map_err(|_| {
                ClipError::ElementCreationFailed(
                    "filesink".to_string(),
                    "Check core GStreamer installation.".to_string(),
                )
            })?;

        let recording = Arc::new(RecordingSwitch::new(valve.clone()));

        pipeline
            .add_many(&[
                &decoder,
                &tee,
                &queue_display,
                &convert_display,
                &sink_display,
                &queue_record,
                &valve,
                &convert_record,
                &encoder,
                &muxer,
                &file_sink,
            ])
            .into_clip_error()?;

        link_pads_on_arrival(
            &decoder,
            PadTarget {
                element: tee.clone(),
                pad_name: "sink",
                media_prefix: "video/x-raw",
                label: "raw video",
            },
        );

        let tee_template = tee
            .pad_template("src_%u")
            .ok_or_else(|| ClipError::PadTemplateMissing {
                element: "Tee".to_string(),
                template: "src".to_string(),
            })?;
        Self::link_tee_branch(&tee, &tee_template, &queue_display, "display")?;
        Self::link_tee_branch(&tee, &tee_template, &queue_record, "record")?;

        gst::Element::link_many(&[&queue_display, &convert_display, &sink_display])
            .map_err(|_| ClipError::LinkFailed("Video display elements".to_string()))?;
        gst::Element::link_many(&[&queue_record, &valve, &convert_record, &encoder, &muxer])
            .map_err(|_| {
                ClipError::LinkFailed("Video recording elements (up to muxer)".to_string())
            })?;
        // Element linking requests the muxer's video pad itself; only the src side is static
        muxer.link(&file_sink).map_err(|_| {
            ClipError::LinkFailed(
                "Muxer to filesink (the muxer might need specific pad linking)".to_string(),
            )
        })?;

        Ok(Self {
            pipeline,
            recording,
            uri: config.uri.clone(),
            record_on_start: config.record_on_start,
        })
    }

    fn link_tee_branch(
        tee: &gst::Element,
        template: &gst::PadTemplate,
        queue: &gst::Element,
        branch: &str,
    ) -> ClipResult<()> {
        let tee_pad = tee
            .request_pad(template, None, None)
            .ok_or_else(|| ClipError::RequestPadFailed(tee.name().to_string()))?;
        info!("Obtained request pad {} for {} branch.", tee_pad.name(), branch);

        let queue_pad = queue
            .static_pad("sink")
            .ok_or_else(|| ClipError::StaticPadMissing {
                element: queue.name().to_string(),
                pad: "sink".to_string(),
            })?;

        tee_pad
            .link(&queue_pad)
            .map_err(|_| ClipError::LinkFailed(format!("Video Tee to {} queue", branch)))?;
        Ok(())
    }

    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    pub fn recording(&self) -> Arc<RecordingSwitch> {
        Arc::clone(&self.recording)
    }

    /// Play until end-of-stream, an error, `q` or closed stdin
    pub fn run(&self) -> ClipResult<()> {
        let main_loop = glib::MainLoop::new(None, false);

        let bus = self.pipeline.bus().ok_or(ClipError::BusUnavailable)?;
        let pipeline_weak = self.pipeline.downgrade();
        let bus_loop = main_loop.clone();
        let _bus_watch = bus
            .add_watch(move |_, msg| {
                let Some(pipeline) = pipeline_weak.upgrade() else {
                    return glib::ControlFlow::Break;
                };
                if bus_flow(msg, &pipeline) == BusFlow::Quit {
                    bus_loop.quit();
                }
                glib::ControlFlow::Continue
            })
            .into_clip_error()?;

        let switch = self.recording();
        let input_loop = main_loop.clone();
        spawn_stdin_reader(move |event| handle_input(event, &switch, &input_loop))?;

        info!("Setting pipeline to PLAYING...");
        info!("Using URI source: {}", self.uri);
        println!("Press 'r' to start/stop recording, 'q' to quit.");
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|_| ClipError::StateChangeFailed("playing".to_string()))?;

        if self.record_on_start {
            self.recording.start();
        }

        info!("Running...");
        main_loop.run();

        info!("Stopping pipeline...");
        self.pipeline.set_state(gst::State::Null)?;
        info!("Cleaning up...");
        Ok(())
    }
}

impl Drop for StreamClipper {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
