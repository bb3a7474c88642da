//! Error types shared by the loader, the playback delegate and the session.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a zone file into a [`ConfigMap`](crate::config::ConfigMap).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or is not valid UTF-8 text.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A non-blank line has no `=` separator. The whole load is aborted.
    #[error("line {line} has no '=' separator: {content:?}")]
    MalformedLine { line: usize, content: String },
}

/// Failure to start a zone's stream.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The selected zone has no URL under the looked-up key.
    #[error("no stream configured under key {key:?}")]
    UnknownZone { key: String },

    /// The media engine could not be initialized or refused to build a player.
    #[error("media engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine rejected the media object for this URL.
    #[error("cannot open stream {url:?}: {reason}")]
    InvalidMedia { url: String, reason: String },

    /// The engine reported that playback could not begin.
    #[error("playback failed to start: {0}")]
    StartFailed(String),
}
