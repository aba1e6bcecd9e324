//! GStreamer pipeline helpers shared by the clipper and the audio player

pub mod clipper;
pub mod player;

use crate::error::{ClipError, ClipResult};
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, error, info, warn};

pub use clipper::{RecordingSwitch, StreamClipper};
pub use player::AudioPlayer;

const PLUGIN_HINT: &str =
    "Check GStreamer plugin installations (e.g., -base, -good, -ugly).";

/// Create a named element from a factory
pub fn make_element(factory: &str, name: &str) -> ClipResult<gst::Element> {
    gst::ElementFactory::make(factory)
        .name(name)
        .build()
        .map_err(|_| ClipError::ElementCreationFailed(factory.to_string(), PLUGIN_HINT.to_string()))
}

/// Human readable name of a pipeline state, as GStreamer prints it
pub fn state_name(state: gst::State) -> &'static str {
    use gst::glib::translate::IntoGlib;
    // SAFETY: gst_element_state_get_name returns a static, NUL-terminated string.
    unsafe { std::ffi::CStr::from_ptr(gst::ffi::gst_element_state_get_name(state.into_glib())) }
        .to_str()
        .unwrap_or("UNKNOWN")
}

/// What the pad-added handler should do with a new pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAction {
    /// Caps could not be determined
    NoCaps,
    /// Media type does not carry the wanted prefix
    WrongType,
    /// The target sink pad already has a peer
    AlreadyLinked,
    Link,
}

/// Decide how to handle a new pad given its media type and the target state
pub fn classify_pad(media_type: Option<&str>, prefix: &str, sink_linked: bool) -> PadAction {
    match media_type {
        None => PadAction::NoCaps,
        Some(media_type) if !media_type.starts_with(prefix) => PadAction::WrongType,
        Some(_) if sink_linked => PadAction::AlreadyLinked,
        Some(_) => PadAction::Link,
    }
}

/// Media type of a pad: negotiated caps first, queried caps otherwise
pub fn pad_media_type(pad: &gst::Pad) -> Option<String> {
    let caps = pad.current_caps().unwrap_or_else(|| pad.query_caps(None));
    caps.structure(0).map(|s| s.name().to_string())
}

/// Fixed sink pad that dynamically created pads of one media type get linked to
#[derive(Debug, Clone)]
pub struct PadTarget {
    pub element: gst::Element,
    pub pad_name: &'static str,
    pub media_prefix: &'static str,
    /// Short description used in log lines, e.g. "raw video"
    pub label: &'static str,
}

/// Result of handling one pad-added signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadLinkOutcome {
    Linked { media_type: String },
    LinkFailed { media_type: String, reason: String },
    AlreadyLinked,
    Ignored { media_type: String },
    NoCaps,
    SinkMissing,
}

/// Link a freshly added pad to the target if its media type matches
pub fn link_new_pad(src: &gst::Element, new_pad: &gst::Pad, target: &PadTarget) -> PadLinkOutcome {
    info!("Received new pad '{}' from '{}':", new_pad.name(), src.name());

    let Some(sink_pad) = target.element.static_pad(target.pad_name) else {
        error!(
            "Could not get {} pad from {}.",
            target.pad_name,
            target.element.name()
        );
        return PadLinkOutcome::SinkMissing;
    };

    let media_type = pad_media_type(new_pad);
    match classify_pad(media_type.as_deref(), target.media_prefix, sink_pad.is_linked()) {
        PadAction::NoCaps => {
            error!("Could not get caps for new pad {}.", new_pad.name());
            PadLinkOutcome::NoCaps
        }
        PadAction::WrongType => {
            let media_type = media_type.unwrap_or_default();
            info!("Type is '{}', but not {}. Ignoring.", media_type, target.label);
            PadLinkOutcome::Ignored { media_type }
        }
        PadAction::AlreadyLinked => {
            info!(
                "{} sink pad already linked. Ignoring new pad '{}'.",
                target.element.name(),
                new_pad.name()
            );
            PadLinkOutcome::AlreadyLinked
        }
        PadAction::Link => {
            let media_type = media_type.unwrap_or_default();
            match new_pad.link(&sink_pad) {
                Ok(_) => {
                    info!("Link succeeded for {} pad (type '{}').", target.label, media_type);
                    PadLinkOutcome::Linked { media_type }
                }
                Err(err) => {
                    error!(
                        "Type is '{}', but linking {} pad failed: {:?}",
                        media_type, target.label, err
                    );
                    PadLinkOutcome::LinkFailed {
                        media_type,
                        reason: format!("{:?}", err),
                    }
                }
            }
        }
    }
}

/// Route every new pad of `decoder` through [`link_new_pad`]
pub fn link_pads_on_arrival(decoder: &gst::Element, target: PadTarget) {
    decoder.connect_pad_added(move |src, new_pad| {
        link_new_pad(src, new_pad, &target);
    });
}

/// What the controlling loop should do after a bus message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFlow {
    Continue,
    /// Message type this handler does not care about
    Ignored,
    Quit,
}

/// Log a bus message and decide whether the loop keeps running
pub fn bus_flow(msg: &gst::Message, pipeline: &gst::Pipeline) -> BusFlow {
    let src_name = msg
        .src()
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match msg.view() {
        gst::MessageView::Eos(_) => {
            info!("End-of-stream");
            BusFlow::Quit
        }
        gst::MessageView::Error(err) => {
            error!("ERROR from element {}: {}", src_name, err.error());
            error!(
                "Debugging info: {}",
                err.debug().map(|d| d.to_string()).unwrap_or_else(|| "none".to_string())
            );
            BusFlow::Quit
        }
        gst::MessageView::Warning(w) => {
            warn!("WARNING from element {}: {}", src_name, w.error());
            warn!(
                "Debugging info: {}",
                w.debug().map(|d| d.to_string()).unwrap_or_else(|| "none".to_string())
            );
            BusFlow::Continue
        }
        gst::MessageView::StateChanged(state_changed) => {
            if msg.src() == Some(pipeline.upcast_ref::<gst::Object>()) {
                info!(
                    "Pipeline state changed from {} to {}:",
                    state_name(state_changed.old()),
                    state_name(state_changed.current())
                );
            }
            BusFlow::Continue
        }
        _ => {
            debug!("Ignoring bus message {:?} from {}", msg.type_(), src_name);
            BusFlow::Ignored
        }
    }
}
