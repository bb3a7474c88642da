//! GStreamer implementation of the media engine, built on `playbin`.

use crate::engine::{MediaEngine, MediaPlayer};
use crate::error::PlaybackError;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// Handle to an initialized GStreamer library.
pub struct GstEngine {
    _private: (),
}

impl GstEngine {
    /// Initializes GStreamer. Safe to call more than once.
    pub fn new() -> Result<Self, PlaybackError> {
        gst::init().map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;
        info!("GStreamer {} initialized", gst::version_string());
        Ok(Self { _private: () })
    }
}

/// A stream location ready to be handed to `playbin`.
#[derive(Debug, Clone)]
pub struct GstMedia {
    uri: String,
}

/// A `playbin` pipeline.
pub struct GstPlayer {
    playbin: gst::Element,
}

impl MediaEngine for GstEngine {
    type Media = GstMedia;
    type Player = GstPlayer;

    fn new_media(&self, url: &str) -> Result<GstMedia, PlaybackError> {
        let uri = url.trim();
        if !uri.contains("://") {
            return Err(PlaybackError::InvalidMedia {
                url: url.to_string(),
                reason: "not a URI".to_string(),
            });
        }
        Ok(GstMedia {
            uri: uri.to_string(),
        })
    }

    fn new_player(&self) -> Result<GstPlayer, PlaybackError> {
        let playbin = gst::ElementFactory::make("playbin")
            .name("zone-player")
            .build()
            .map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;
        debug!("Created playbin");
        Ok(GstPlayer { playbin })
    }
}

impl MediaPlayer for GstPlayer {
    type Media = GstMedia;

    fn set_media(&mut self, media: GstMedia) -> Result<(), PlaybackError> {
        // playbin only accepts a new uri in the NULL or READY state.
        self.playbin.set_property("uri", media.uri.as_str());
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.playbin
            .set_state(gst::State::Playing)
            .map(|success| debug!("playbin state change: {:?}", success))
            .map_err(|e| PlaybackError::StartFailed(e.to_string()))
    }

    fn stop(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Null) {
            warn!("Failed to stop playbin: {}", e);
        }
    }
}

impl Drop for GstPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
