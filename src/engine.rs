//! The seam between the player and the native media engine.
//!
//! The engine is a black box: it builds media objects from URLs and players
//! that can be loaded, started and stopped. Transport, buffering and
//! reconnection all happen inside it.

use crate::error::PlaybackError;

/// A media library able to open stream URLs.
pub trait MediaEngine {
    type Media;
    type Player: MediaPlayer<Media = Self::Media>;

    /// Builds a media object for `url`.
    fn new_media(&self, url: &str) -> Result<Self::Media, PlaybackError>;

    /// Builds a player with no media loaded.
    fn new_player(&self) -> Result<Self::Player, PlaybackError>;
}

/// A player handle owned by the engine.
pub trait MediaPlayer {
    type Media;

    fn set_media(&mut self, media: Self::Media) -> Result<(), PlaybackError>;

    /// Starts playback. An error means the engine refused to begin.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn stop(&mut self);
}
