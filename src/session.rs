//! The session controller.
//!
//! Widgets never touch the configuration or the player directly. They emit
//! [`Command`]s, and [`ZoneSession::handle`] applies them one at a time on
//! the UI thread. The watchdog is advanced with [`ZoneSession::tick`].
//!
//! The watchdog is armed after every successful play call and is never
//! cancelled by the stream becoming healthy, so a working stream still
//! raises the connection warning once its timeout elapses.

use crate::config::ConfigMap;
use crate::engine::MediaEngine;
use crate::error::{ConfigError, PlaybackError};
use crate::playback::PlaybackDelegate;
use crate::watchdog::Watchdog;
use crate::zones::{build_zone_options, ZoneLookup, ZoneOption, ZoneSelection};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Title of the warning dialog.
pub const WARNING_TITLE: &str = "Ошибка";

/// Text shown for every playback or watchdog failure.
pub const CONNECTION_WARNING: &str = "Ошибка при воспроизведении потока RTSP: Нет соединения";

/// Events produced by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The user picked a zone file.
    FileSelected(PathBuf),
    /// A zone radio button changed state.
    ZoneToggled {
        index: usize,
        label: String,
        checked: bool,
    },
    /// The user acknowledged the warning dialog.
    DismissWarning,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    ZoneListed,
    Playing,
    ErrorShown,
}

/// The reason the warning dialog is up.
#[derive(Debug)]
pub enum Warning {
    PlaybackFailed(PlaybackError),
    WatchdogTimeout,
    LoadFailed(ConfigError),
}

impl Warning {
    /// Text shown to the user. Playback failures and timeouts look the same.
    pub fn message(&self) -> String {
        match self {
            Warning::PlaybackFailed(_) | Warning::WatchdogTimeout => CONNECTION_WARNING.to_string(),
            Warning::LoadFailed(e) => format!("Не удалось загрузить файл: {}", e),
        }
    }
}

/// Settings that shape a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub watchdog_timeout: Duration,
    pub lookup: ZoneLookup,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            watchdog_timeout: crate::watchdog::DEFAULT_TIMEOUT,
            lookup: ZoneLookup::default(),
        }
    }
}

/// All mutable state of the window: configuration, options, selection,
/// the playback delegate and the watchdog.
pub struct ZoneSession<E: MediaEngine> {
    config: ConfigMap,
    options: Vec<ZoneOption>,
    selection: ZoneSelection,
    playback: PlaybackDelegate<E>,
    watchdog: Watchdog,
    lookup: ZoneLookup,
    warning: Option<Warning>,
    state: SessionState,
}

impl<E: MediaEngine> ZoneSession<E> {
    pub fn new(engine: E, options: SessionOptions) -> Self {
        Self {
            config: ConfigMap::new(),
            options: Vec::new(),
            selection: ZoneSelection::default(),
            playback: PlaybackDelegate::new(engine),
            watchdog: Watchdog::new(options.watchdog_timeout),
            lookup: options.lookup,
            warning: None,
            state: SessionState::Idle,
        }
    }

    /// Applies one UI command. `now` is the moment the event was observed.
    pub fn handle(&mut self, command: Command, now: Instant) {
        debug!("Handling {:?} in state {:?}", command, self.state);
        match command {
            Command::FileSelected(path) => self.load_file(path),
            Command::ZoneToggled {
                index,
                label,
                checked,
            } => {
                if checked {
                    self.select_zone(index, &label, now);
                } else {
                    debug!("Zone '{}' deselected", label);
                }
            }
            Command::DismissWarning => self.dismiss_warning(),
        }
    }

    /// Advances the watchdog. Returns `true` if it fired during this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.watchdog.fire_if_due(now) {
            warn!(
                "No confirmation of a healthy stream after {:?}",
                self.watchdog.timeout()
            );
            self.report(Warning::WatchdogTimeout);
            true
        } else {
            false
        }
    }

    /// Stops playback and the watchdog. Called when the window closes.
    pub fn shutdown(&mut self) {
        info!("Shutting down zone session");
        if self.watchdog.is_armed() {
            debug!("Cancelling pending watchdog");
        }
        self.watchdog.cancel();
        if self.playback.is_active() {
            self.playback.stop();
        }
        self.state = SessionState::Idle;
    }

    fn load_file(&mut self, path: PathBuf) {
        info!("Loading zone file {}", path.display());
        self.state = SessionState::Loading;

        match ConfigMap::load(&path) {
            Ok(config) => {
                self.config = config;
                self.options = build_zone_options(&self.config);
                self.selection.clear();
                info!(
                    "Station '{}' with {} zone(s)",
                    self.config.station_id(),
                    self.options.len()
                );
                self.state = SessionState::ZoneListed;
            }
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                self.report(Warning::LoadFailed(e));
            }
        }
    }

    fn select_zone(&mut self, index: usize, label: &str, now: Instant) {
        let Some(option) = self.options.get(index).cloned() else {
            warn!("Ignoring toggle for unknown zone index {}", index);
            return;
        };
        self.selection.select(index);
        if option.label != label {
            warn!(
                "Toggle label '{}' does not match option '{}'",
                label, option.label
            );
        }

        match self.start_zone(option) {
            Ok(()) => {
                self.watchdog.arm(now);
                self.state = SessionState::Playing;
            }
            Err(e) => {
                error!("Zone '{}' failed: {}", label, e);
                self.report(Warning::PlaybackFailed(e));
            }
        }
    }

    fn start_zone(&mut self, option: ZoneOption) -> Result<(), PlaybackError> {
        let key = self.lookup.key_for(&option);
        let url = self
            .lookup
            .resolve(&self.config, &option)
            .ok_or(PlaybackError::UnknownZone { key })?
            .to_string();
        info!("Zone '{}' resolved to {}", option.label, url);
        self.playback.start(&url)
    }

    fn report(&mut self, warning: Warning) {
        self.watchdog.cancel();
        if self.warning.is_some() {
            debug!("Warning already visible, replacing it");
        }
        self.warning = Some(warning);
        self.state = SessionState::ErrorShown;
    }

    fn dismiss_warning(&mut self) {
        if self.warning.take().is_some() {
            debug!("Warning acknowledged");
            self.state = SessionState::Idle;
        }
    }

    pub fn station_label(&self) -> String {
        self.config.station_label()
    }

    pub fn options(&self) -> &[ZoneOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.is_selected(index)
    }

    pub fn warning(&self) -> Option<&Warning> {
        self.warning.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn playing_url(&self) -> Option<&str> {
        self.playback.current_url()
    }

    /// Time until the watchdog fires, if it is armed.
    pub fn watchdog_remaining(&self, now: Instant) -> Option<Duration> {
        self.watchdog.remaining(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{EngineCall, RecordingEngine};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn session_with(engine: &RecordingEngine, lookup: ZoneLookup) -> ZoneSession<RecordingEngine> {
        ZoneSession::new(
            engine.clone(),
            SessionOptions {
                lookup,
                ..SessionOptions::default()
            },
        )
    }

    fn load(session: &mut ZoneSession<RecordingEngine>, path: &Path, now: Instant) {
        session.handle(Command::FileSelected(path.to_path_buf()), now);
    }

    fn toggle(session: &mut ZoneSession<RecordingEngine>, index: usize, now: Instant) {
        let label = session.options()[index].label.clone();
        session.handle(
            Command::ZoneToggled {
                index,
                label,
                checked: true,
            },
            now,
        );
    }

    #[test]
    fn loading_lists_zone_and_station() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "AZS=X\nZona1=Y\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::ReconstructedKey);

        load(&mut session, &path, Instant::now());

        assert_eq!(session.state(), SessionState::ZoneListed);
        assert_eq!(session.station_label(), "Номер станции: X");
        let labels: Vec<_> = session.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["Y"]);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn reload_replaces_previous_options() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(&dir, "a.ini", "AZS=1\nZona1=A\nZona2=B\nZona3=C\n");
        let second = write_file(&dir, "b.ini", "AZS=2\nZona1=D\nZona2=\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &first, now);
        toggle(&mut session, 2, now);
        assert_eq!(session.options().len(), 3);

        load(&mut session, &second, now);
        assert_eq!(session.options().len(), 1);
        assert_eq!(session.options()[0].label, "D");
        assert_eq!(session.selected(), None);
        assert_eq!(session.station_label(), "Номер станции: 2");
    }

    #[test]
    fn selection_looks_up_reconstructed_key() {
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::ReconstructedKey);
        session.config.insert("AZS", "7");
        session.config.insert("Zona=Hall", "rtsp://cam/hall");
        session.options = build_zone_options(&session.config);
        assert_eq!(session.options()[0].label, "Hall");

        toggle(&mut session, 0, Instant::now());

        assert_eq!(
            engine.calls(),
            [
                EngineCall::NewMedia("rtsp://cam/hall".into()),
                EngineCall::NewPlayer,
                EngineCall::SetMedia("rtsp://cam/hall".into()),
                EngineCall::Play,
            ]
        );
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.playing_url(), Some("rtsp://cam/hall"));

        session.config.insert("Zona=Yard", "rtsp://cam/yard");
        session.options = build_zone_options(&session.config);
        assert_eq!(session.options()[1].label, "Yard");
        engine.clear();

        toggle(&mut session, 1, Instant::now());

        assert_eq!(
            engine.calls(),
            [
                EngineCall::Stop,
                EngineCall::NewMedia("rtsp://cam/yard".into()),
                EngineCall::SetMedia("rtsp://cam/yard".into()),
                EngineCall::Play,
            ]
        );
        assert_eq!(session.selected(), Some(1));
        assert_eq!(session.playing_url(), Some("rtsp://cam/yard"));
    }

    #[test]
    fn rejected_url_stops_previous_zone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1
Zona2=192.168.1.11:554/stream1
");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &path, now);
        toggle(&mut session, 0, now);
        engine.clear();
        engine.set_fail_media(true);
        toggle(&mut session, 1, now);

        assert_eq!(
            engine.calls(),
            [
                EngineCall::Stop,
                EngineCall::NewMedia("192.168.1.11:554/stream1".into()),
            ]
        );
        assert!(matches!(
            session.warning(),
            Some(Warning::PlaybackFailed(PlaybackError::InvalidMedia { .. }))
        ));
        assert_eq!(session.selected(), Some(1));
        assert_eq!(session.playing_url(), None);
        assert_eq!(session.watchdog_remaining(now), None);
    }

    #[test]
    fn missing_reconstructed_key_shows_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "AZS=X\nZona1=rtsp://cam/1\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::ReconstructedKey);
        let now = Instant::now();

        load(&mut session, &path, now);
        toggle(&mut session, 0, now);

        assert!(matches!(
            session.warning(),
            Some(Warning::PlaybackFailed(PlaybackError::UnknownZone { key })) if key == "Zona=rtsp://cam/1"
        ));
        assert_eq!(session.watchdog_remaining(now), None);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn switching_zone_stops_previous_session_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\nZona2=rtsp://cam/2\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &path, now);
        toggle(&mut session, 0, now);
        engine.clear();
        toggle(&mut session, 1, now);

        assert_eq!(
            engine.calls(),
            [
                EngineCall::Stop,
                EngineCall::NewMedia("rtsp://cam/2".into()),
                EngineCall::SetMedia("rtsp://cam/2".into()),
                EngineCall::Play,
            ]
        );
        assert_eq!(session.selected(), Some(1));
    }

    #[test]
    fn play_failure_shows_warning_without_watchdog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\n");
        let engine = RecordingEngine::default();
        engine.set_fail_play(true);
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &path, now);
        toggle(&mut session, 0, now);

        assert_eq!(session.state(), SessionState::ErrorShown);
        let warning = session.warning().expect("warning shown");
        assert_eq!(warning.message(), CONNECTION_WARNING);
        assert_eq!(session.watchdog_remaining(now), None);
        assert!(!session.tick(now + Duration::from_secs(30)));
    }

    #[test]
    fn successful_play_still_warns_after_ten_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let start = Instant::now();

        load(&mut session, &path, start);
        toggle(&mut session, 0, start);
        assert!(session.warning().is_none());

        assert!(!session.tick(start + Duration::from_millis(9_999)));
        assert!(session.warning().is_none());

        assert!(session.tick(start + Duration::from_secs(10)));
        assert!(matches!(session.warning(), Some(Warning::WatchdogTimeout)));
        assert_eq!(session.warning().unwrap().message(), CONNECTION_WARNING);
        assert_eq!(session.state(), SessionState::ErrorShown);
        // The dialog does not touch the stream.
        assert_eq!(session.playing_url(), Some("rtsp://cam/1"));
    }

    #[test]
    fn reselecting_reschedules_the_watchdog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\nZona2=rtsp://cam/2\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let start = Instant::now();

        load(&mut session, &path, start);
        toggle(&mut session, 0, start);
        toggle(&mut session, 1, start + Duration::from_secs(7));

        assert!(!session.tick(start + Duration::from_secs(10)));
        assert!(session.warning().is_none());
        assert!(session.tick(start + Duration::from_secs(17)));
        assert!(!session.tick(start + Duration::from_secs(27)));
    }

    #[test]
    fn dismissing_warning_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let start = Instant::now();

        load(&mut session, &path, start);
        toggle(&mut session, 0, start);
        session.tick(start + Duration::from_secs(10));
        session.handle(Command::DismissWarning, start + Duration::from_secs(11));

        assert!(session.warning().is_none());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn failed_load_keeps_previous_zones() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "good.ini", "AZS=1\nZona1=rtsp://cam/1\n");
        let bad = write_file(&dir, "bad.ini", "AZS=2\nnot a pair\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &good, now);
        toggle(&mut session, 0, now);
        load(&mut session, &bad, now);

        assert!(matches!(
            session.warning(),
            Some(Warning::LoadFailed(ConfigError::MalformedLine { line: 2, .. }))
        ));
        assert_eq!(session.station_label(), "Номер станции: 1");
        assert_eq!(session.options().len(), 1);
        assert_eq!(session.selected(), Some(0));
        assert_eq!(session.playing_url(), Some("rtsp://cam/1"));
        assert_eq!(session.watchdog_remaining(now), None);
    }

    #[test]
    fn unchecked_toggle_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &path, now);
        session.handle(
            Command::ZoneToggled {
                index: 0,
                label: "rtsp://cam/1".into(),
                checked: false,
            },
            now,
        );

        assert!(engine.calls().is_empty());
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn shutdown_stops_player_and_watchdog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "azs.ini", "Zona1=rtsp://cam/1\n");
        let engine = RecordingEngine::default();
        let mut session = session_with(&engine, ZoneLookup::SourceKey);
        let now = Instant::now();

        load(&mut session, &path, now);
        toggle(&mut session, 0, now);
        engine.clear();
        session.shutdown();

        assert_eq!(engine.calls(), [EngineCall::Stop]);
        assert_eq!(session.watchdog_remaining(now), None);
        assert_eq!(session.playing_url(), None);
    }
}
