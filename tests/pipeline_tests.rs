//! Pipeline construction tests
//!
//! These build real GStreamer pipelines without starting them. Each test
//! returns early when a required plugin is not installed.

use gstclip::pipeline::{clipper, player};
use gstclip::{AudioPlayer, ClipError, ClipperConfig, PlayerConfig, StreamClipper};
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::PathBuf;

fn have_factories(factories: &[&str]) -> bool {
    gst::init().unwrap();
    factories
        .iter()
        .all(|factory| gst::ElementFactory::find(factory).is_some())
}

/// Clipper config that only needs core and -base elements
fn lightweight_clipper_config() -> ClipperConfig {
    ClipperConfig {
        uri: "file:///tmp/gstclip-test.webm".to_string(),
        output: PathBuf::from("/tmp/gstclip-test.mp4"),
        encoder: "identity".to_string(),
        muxer: "identity".to_string(),
        video_sink: "fakesink".to_string(),
        record_on_start: false,
    }
}

const CLIPPER_FACTORIES: &[&str] = &[
    "uridecodebin",
    "tee",
    "queue",
    "videoconvert",
    "valve",
    "identity",
    "fakesink",
    "filesink",
];

#[test]
fn test_clipper_builds_both_branches() {
    if !have_factories(CLIPPER_FACTORIES) {
        return;
    }

    let clipper = StreamClipper::new(&lightweight_clipper_config()).unwrap();
    let pipeline = clipper.pipeline();
    assert_eq!(pipeline.name(), clipper::PIPELINE_NAME);

    for name in [
        "uri-source-decoder",
        "video_tee",
        "video_queue_display",
        "video_convert_display",
        "video_sink_display",
        "video_queue_record",
        "video_valve",
        "video_convert_record",
        "video_encoder",
        "muxer",
        "file_sink",
    ] {
        assert!(pipeline.by_name(name).is_some(), "missing element {}", name);
    }

    let tee = pipeline.by_name("video_tee").unwrap();
    let linked_src_pads = tee
        .src_pads()
        .iter()
        .filter(|pad| pad.is_linked())
        .count();
    assert_eq!(linked_src_pads, 2);

    // Filled in later by the pad-added handler
    assert!(!tee.static_pad("sink").unwrap().is_linked());

    let decoder = pipeline.by_name("uri-source-decoder").unwrap();
    assert_eq!(
        decoder.property::<Option<String>>("uri").as_deref(),
        Some("file:///tmp/gstclip-test.webm")
    );

    let file_sink = pipeline.by_name("file_sink").unwrap();
    assert_eq!(
        file_sink.property::<Option<String>>("location").as_deref(),
        Some("/tmp/gstclip-test.mp4")
    );
}

#[test]
fn test_clipper_valve_starts_closed() {
    if !have_factories(CLIPPER_FACTORIES) {
        return;
    }

    let clipper = StreamClipper::new(&lightweight_clipper_config()).unwrap();
    let valve = clipper.pipeline().by_name("video_valve").unwrap();
    let switch = clipper.recording();

    assert!(!switch.is_recording());
    assert!(valve.property::<bool>("drop"));

    switch.toggle();
    assert!(!valve.property::<bool>("drop"));
}

#[test]
fn test_clipper_reports_missing_encoder() {
    if !have_factories(CLIPPER_FACTORIES) {
        return;
    }

    let mut config = lightweight_clipper_config();
    config.encoder = "gstclip-missing-encoder".to_string();

    match StreamClipper::new(&config) {
        Err(ClipError::ElementCreationFailed(factory, _)) => {
            assert_eq!(factory, "gstclip-missing-encoder");
        }
        Err(other) => panic!("Expected ElementCreationFailed, got {:?}", other),
        Ok(_) => panic!("Expected missing encoder to fail"),
    }
}

#[test]
fn test_player_links_static_chain() {
    if !have_factories(&["uridecodebin", "audioconvert", "audioresample", "fakesink"]) {
        return;
    }

    let config = PlayerConfig {
        audio_sink: "fakesink".to_string(),
        ..PlayerConfig::default()
    };
    let player = AudioPlayer::new(&config).unwrap();
    let pipeline = player.pipeline();
    assert_eq!(pipeline.name(), player::PIPELINE_NAME);

    let convert = pipeline.by_name("convert").unwrap();
    assert!(convert.static_pad("src").unwrap().is_linked());
    assert!(!convert.static_pad("sink").unwrap().is_linked());

    let resample = pipeline.by_name("resample").unwrap();
    assert!(resample.static_pad("src").unwrap().is_linked());

    let source = pipeline.by_name("source").unwrap();
    assert_eq!(
        source.property::<Option<String>>("uri").as_deref(),
        Some(gstclip::config::DEFAULT_PLAYER_URI)
    );
}

#[test]
fn test_player_reports_missing_sink() {
    if !have_factories(&["uridecodebin", "audioconvert", "audioresample"]) {
        return;
    }

    let config = PlayerConfig {
        audio_sink: "gstclip-missing-sink".to_string(),
        ..PlayerConfig::default()
    };
    assert!(matches!(
        AudioPlayer::new(&config),
        Err(ClipError::ElementCreationFailed(_, _))
    ));
}
