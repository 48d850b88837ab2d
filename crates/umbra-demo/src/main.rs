//! Terminal demo for the Umbra module scheduler.
//!
//! Wires the demo modules into an [`Engine`], runs it against the crossterm
//! frontend, and writes runtime settings back to the configuration file.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load `umbra-config.yaml` (created with defaults if missing)
//! 3. Initialize structured logging into the log file
//! 4. Create the engine and register the demo modules
//! 5. Load the startup module chain
//! 6. Enter the terminal and run the frame loop
//! 7. Restore the terminal and save the configuration back

mod credits;
mod demo;
mod error;
mod intro;
mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use umbra_core::config::LogLevel;
use umbra_core::runner;
use umbra_core::{Engine, TextCanvas, UmbraConfig};

use crate::error::AppError;
use crate::terminal::TerminalFrontend;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "umbra-demo", version, about = "Umbra module scheduler demo")]
struct Args {
    /// Configuration file.
    #[arg(long, default_value = "umbra-config.yaml")]
    config: PathBuf,

    /// Log file. The terminal is used for drawing, so logs never go there.
    #[arg(long, default_value = "umbra.log")]
    log_file: PathBuf,

    /// Stop after this many frames (overrides the configuration, 0 = unlimited).
    #[arg(long)]
    max_frames: Option<u64>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, the terminal or the frame
/// loop fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // 1. Arguments.
    let args = Args::parse();

    // 2. Configuration.
    let mut config = UmbraConfig::load_or_create(&args.config)?;

    // 3. Logging.
    init_logging(&args.log_file, config.logging.level)?;
    info!(
        config = %args.config.display(),
        module_chain = config.module_chain.as_deref().unwrap_or(""),
        frame_interval_ms = config.engine.frame_interval_ms,
        "umbra-demo starting"
    );

    // 4. Engine and modules.
    let mut engine = Engine::from_config(&config);
    engine.register_module(intro::NAME, intro::Intro::new())?;
    engine.register_module(demo::NAME, demo::DemoScreen::new())?;
    engine.register_module(credits::NAME, credits::Credits)?;

    // 5. Startup chain.
    if engine.load_startup_chain(&config) == 0 {
        warn!(module = demo::NAME, "Startup chain activated nothing, starting the demo screen");
        engine.activate(demo::NAME);
    }

    // 6. Run.
    let interval = Duration::from_millis(config.engine.frame_interval_ms);
    let max_frames = args.max_frames.unwrap_or(config.engine.max_frames);
    let mut frontend = TerminalFrontend::enter(PathBuf::from("."))?;
    let (width, height) = frontend.size();
    let mut canvas = TextCanvas::new(width, height);
    let outcome = runner::run(&mut engine, &mut frontend, &mut canvas, interval, max_frames).await;

    // 7. Restore the terminal before reporting anything, then save settings.
    frontend.restore()?;
    let result = outcome?;
    runner::log_run_end(&result);

    config.font.font_id = engine.fonts().font_id();
    config.window.full_screen = engine.is_fullscreen();
    config.save(&args.config)?;

    info!(
        end_reason = ?result.end_reason,
        total_frames = result.total_frames,
        "umbra-demo shutdown complete"
    );
    Ok(())
}

/// Send `tracing` output to `path`. `RUST_LOG` overrides the configured level.
fn init_logging(path: &Path, level: LogLevel) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_filter_directive())),
        )
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
