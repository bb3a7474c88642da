//! The eframe window.
//!
//! `ZonePlayerApp` only draws widgets and turns clicks into [`Command`]s sent
//! through a channel. The commands are drained once per frame and handed to
//! the [`ZoneSession`], which owns all state.

use crate::engine::MediaEngine;
use crate::session::{Command, SessionOptions, ZoneSession, WARNING_TITLE};
use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Settings for launching the window.
#[derive(Debug, Clone)]
pub struct AppArgs {
    /// Zone file to load right after start-up.
    pub config_file: Option<PathBuf>,
    pub title: String,
    pub session: SessionOptions,
}

struct ZonePlayerApp<E: MediaEngine> {
    session: ZoneSession<E>,
    to_session: Sender<Command>,
    from_ui: Receiver<Command>,
}

impl<E: MediaEngine> ZonePlayerApp<E> {
    fn new(cc: &eframe::CreationContext<'_>, engine: E, args: AppArgs) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let (to_session, from_ui) = crossbeam_channel::unbounded();
        if let Some(path) = args.config_file {
            to_session.send(Command::FileSelected(path)).ok();
        }

        Self {
            session: ZoneSession::new(engine, args.session),
            to_session,
            from_ui,
        }
    }

    /// Opens the native file dialog and queues the chosen file.
    fn pick_file(&self) {
        let picked = rfd::FileDialog::new()
            .set_title("Выбрать файл")
            .add_filter("INI files (*.ini)", &["ini"])
            .pick_file();
        match picked {
            Some(path) => {
                self.to_session.send(Command::FileSelected(path)).ok();
            }
            None => debug!("File dialog cancelled"),
        }
    }

    fn show_zones(&self, ui: &mut egui::Ui) {
        let selected = self.session.selected();
        for (index, option) in self.session.options().iter().enumerate() {
            let checked = self.session.is_selected(index);
            if ui.radio(checked, option.label.as_str()).clicked() && !checked {
                if let Some(previous) = selected {
                    let label = self.session.options()[previous].label.clone();
                    self.to_session
                        .send(Command::ZoneToggled {
                            index: previous,
                            label,
                            checked: false,
                        })
                        .ok();
                }
                self.to_session
                    .send(Command::ZoneToggled {
                        index,
                        label: option.label.clone(),
                        checked: true,
                    })
                    .ok();
            }
        }
    }

    /// Draws the warning window while one is pending.
    fn show_warning_dialog(&self, ctx: &egui::Context) {
        let Some(warning) = self.session.warning() else {
            return;
        };
        let message = warning.message();
        egui::Window::new(WARNING_TITLE)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.to_session.send(Command::DismissWarning).ok();
                    }
                });
            });
    }

    /// Applies every queued command. Returns `true` if there were any.
    fn drain_commands(&mut self) -> bool {
        let mut handled = false;
        loop {
            match self.from_ui.try_recv() {
                Ok(command) => {
                    self.session.handle(command, Instant::now());
                    handled = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Command channel disconnected");
                    break;
                }
            }
        }
        handled
    }
}

impl<E: MediaEngine> eframe::App for ZonePlayerApp<E> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            info!("Window closing, stopping playback");
            self.session.shutdown();
        }

        self.session.tick(Instant::now());

        let modal = self.session.warning().is_some();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(self.session.station_label());
                    ui.label("--------------------");
                    ui.label("Зоны:");
                    if ui.button("Выбрать файл").clicked() {
                        self.pick_file();
                    }
                    self.show_zones(ui);
                });
            });
        });
        self.show_warning_dialog(ctx);

        if self.drain_commands() {
            ctx.request_repaint();
        }

        // Wake up for the watchdog even when nothing else happens.
        if let Some(remaining) = self.session.watchdog_remaining(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }
}

/// Opens the window and runs the event loop until it is closed.
pub fn run_gui<E>(engine: E, args: AppArgs) -> Result<()>
where
    E: MediaEngine + 'static,
    E::Media: 'static,
    E::Player: 'static,
{
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([250.0, 250.0])
            .with_resizable(false)
            .with_always_on_top(),
        ..Default::default()
    };

    let title = args.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(ZonePlayerApp::new(cc, engine, args))),
    )
    .map_err(|e| anyhow!("Failed to run eframe GUI: {}", e))
}
