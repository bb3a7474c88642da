//! # RTSP Zone Player Library
//!
//! Loads a flat `KEY=VALUE` zone file, lists its zones as mutually exclusive
//! options and plays the selected zone's stream through a media engine.
//! The GUI lives in [`app`]; everything it drives is in [`session`].

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "gstreamer")]
pub mod gst_engine;
pub mod playback;
pub mod session;
pub mod watchdog;
pub mod zones;
