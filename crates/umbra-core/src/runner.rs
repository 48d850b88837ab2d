//! Frame-paced loop driving the engine against a frontend.
//!
//! This module provides [`run`], the top-level async function that:
//!
//! - **Paces frames** with a tokio interval at the configured frame length
//! - **Feeds input** polled from the [`Frontend`] into each frame
//! - **Presents** the rendered canvas and display requests after each frame
//! - **Stops** on shutdown, when nothing is left to run, or after `max_frames`
//!
//! The engine itself is synchronous; the runner only adds the timing and the
//! frontend plumbing around [`Engine::tick`].

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::canvas::{Canvas, TextCanvas};
use crate::engine::{DisplayRequests, Engine, FrameSummary};
use crate::font::Font;
use crate::input::InputEvent;

/// Shortest frame interval the runner accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Errors raised by a frontend.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// Terminal or window I/O failed.
    #[error("frontend I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The input source is gone.
    #[error("frontend input closed")]
    Closed,
}

/// Errors that can occur during the run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The frontend failed.
    #[error("frontend error: {source}")]
    Frontend {
        /// The underlying frontend error.
        #[from]
        source: FrontendError,
    },
}

/// Input source and presentation surface.
pub trait Frontend {
    /// Input events received since the last call. Must not block.
    fn poll_input(&mut self) -> Result<Vec<InputEvent>, FrontendError>;

    /// Show a rendered frame.
    fn present(
        &mut self,
        canvas: &TextCanvas,
        display: &DisplayRequests,
    ) -> Result<(), FrontendError>;

    /// Current surface size in cells, if the frontend tracks one.
    fn surface_size(&self) -> Option<(u16, u16)> {
        None
    }

    /// Rebuild the surface after the active font changed.
    fn reinitialize(&mut self, _font: Option<&Font>) -> Result<(), FrontendError> {
        Ok(())
    }
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// Shutdown was requested by a module or the quit binding.
    ShutdownRequested,
    /// No module is running and no request is pending.
    Idle,
    /// The frame limit was reached.
    MaxFramesReached,
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Summary of the last frame.
    pub final_summary: FrameSummary,
    /// Number of frames run.
    pub total_frames: u64,
}

/// Run the engine until a termination condition is met.
///
/// `max_frames` of 0 means no limit. When shutdown is requested while
/// requests are still queued (the deactivations queued by the quit binding,
/// for instance), one more frame runs to drain them.
///
/// # Errors
///
/// Returns [`RunnerError`] if the frontend fails.
pub async fn run(
    engine: &mut Engine,
    frontend: &mut dyn Frontend,
    canvas: &mut TextCanvas,
    interval: Duration,
    max_frames: u64,
) -> Result<RunResult, RunnerError> {
    let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut total_frames: u64 = 0;
    let mut draining = false;

    info!(
        interval_ms = interval.as_millis(),
        max_frames, "Run starting"
    );

    loop {
        ticker.tick().await;

        let events = frontend.poll_input()?;
        if let Some((width, height)) = frontend.surface_size()
            && (width, height) != canvas.size()
        {
            canvas.resize(width, height);
        }

        let summary = engine.tick(&events, canvas);
        total_frames = total_frames.saturating_add(1);

        let display = engine.take_display_requests();
        if display.reinitialize {
            frontend.reinitialize(engine.fonts().active())?;
        }
        frontend.present(canvas, &display)?;

        let end_reason = if engine.shutdown_requested() {
            if engine.has_pending() && !draining {
                draining = true;
                continue;
            }
            Some(RunEndReason::ShutdownRequested)
        } else if engine.is_idle() {
            Some(RunEndReason::Idle)
        } else if max_frames > 0 && total_frames >= max_frames {
            Some(RunEndReason::MaxFramesReached)
        } else {
            None
        };

        if let Some(end_reason) = end_reason {
            return Ok(RunResult {
                end_reason,
                final_summary: summary,
                total_frames,
            });
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_frames = result.total_frames,
        final_frame = result.final_summary.frame,
        "Run ended"
    );
}
