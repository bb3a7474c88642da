//! Zone player binary.
//!
//! Opens a small always-on-top window where a zone file is picked and one of
//! its zones is played through GStreamer.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rtsp_zone_player::app::{run_gui, AppArgs};
use rtsp_zone_player::gst_engine::GstEngine;
use rtsp_zone_player::session::SessionOptions;
use rtsp_zone_player::zones::ZoneLookup;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// How a selected zone is resolved to its stream URL.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LookupArg {
    /// Look up the key "Zona=<label>".
    ReconstructedKey,
    /// Look up the key the zone was listed from. Needed to play file-defined zones.
    SourceKey,
}

impl From<LookupArg> for ZoneLookup {
    fn from(arg: LookupArg) -> Self {
        match arg {
            LookupArg::ReconstructedKey => ZoneLookup::ReconstructedKey,
            LookupArg::SourceKey => ZoneLookup::SourceKey,
        }
    }
}

/// RTSP zone player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Zone file to load at start-up.
    #[arg(value_name = "CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Seconds after a successful start before the connection warning is shown.
    #[arg(long, default_value_t = 10)]
    watchdog_secs: u64,

    /// How a selected zone is resolved to its stream URL.
    ///
    /// Zones read from a file only resolve with `source-key`; the default
    /// `reconstructed-key` looks up "Zona=<label>", which file keys never match.
    #[arg(long, value_enum, default_value_t = LookupArg::ReconstructedKey)]
    lookup: LookupArg,

    /// Window title.
    #[arg(long, default_value = "AZS01")]
    title: String,
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let engine = GstEngine::new().context("Failed to initialize GStreamer")?;
    info!("Starting zone player with {:?}", args);

    let app_args = AppArgs {
        config_file: args.config_file,
        title: args.title,
        session: SessionOptions {
            watchdog_timeout: Duration::from_secs(args.watchdog_secs),
            lookup: args.lookup.into(),
        },
    };

    // The GUI needs to run on the main thread.
    run_gui(engine, app_args)?;

    Ok(())
}
