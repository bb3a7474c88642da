//! Owns the single player handle and enforces one live session at a time.

use crate::engine::{MediaEngine, MediaPlayer};
use crate::error::PlaybackError;
use tracing::{debug, info, warn};

/// Wraps a [`MediaEngine`] and at most one player created from it.
pub struct PlaybackDelegate<E: MediaEngine> {
    engine: E,
    player: Option<E::Player>,
    current_url: Option<String>,
}

impl<E: MediaEngine> PlaybackDelegate<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            player: None,
            current_url: None,
        }
    }

    /// Stops whatever is playing, loads `url` and starts it.
    ///
    /// The player is created on first use and reused afterwards.
    pub fn start(&mut self, url: &str) -> Result<(), PlaybackError> {
        if let Some(player) = self.player.as_mut() {
            debug!("Stopping previous stream before switching");
            player.stop();
        }
        self.current_url = None;

        let media = self.engine.new_media(url)?;
        let player = match self.player.take() {
            Some(player) => player,
            None => self.engine.new_player()?,
        };
        let player = self.player.insert(player);

        player.set_media(media)?;
        if let Err(e) = player.play() {
            warn!("Engine refused to play {}: {}", url, e);
            return Err(e);
        }

        info!("Playing {}", url);
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Stops the current session, if any. The player handle is kept for reuse.
    pub fn stop(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        if let Some(url) = self.current_url.take() {
            info!("Stopped {}", url);
        }
    }

    /// URL of the session the engine last accepted, if one is live.
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.current_url.is_some()
    }
}

impl<E: MediaEngine> Drop for PlaybackDelegate<E> {
    fn drop(&mut self) {
        self.stop();
    }
}
