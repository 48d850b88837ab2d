//! Built-in frame timing overlay.
//!
//! Every engine registers a [`Speedometer`] under [`SPEEDOMETER_NAME`]. It is
//! inactive until toggled (F5 by default). While active it adds up the
//! update and render pass timings reported in [`FrameInfo`] and, once per
//! second, turns them into the share of frame time spent updating, rendering
//! and elsewhere.

use std::time::Duration;

use crate::canvas::{Canvas, Rect};
use crate::clock::FrameInfo;
use crate::input::{MouseAction, MouseButton, MouseEvent};
use crate::module::{EventFlow, Module, ModuleContext, UpdateFlow};

/// Reserved registry name of the speedometer.
pub const SPEEDOMETER_NAME: &str = "umbra_speedometer";

/// Priority of the speedometer. It draws after, and so on top of, every
/// other module.
pub const SPEEDOMETER_PRIORITY: i32 = i32::MAX;

const WINDOW: Duration = Duration::from_secs(1);
const MAXIMISED_WIDTH: u16 = 30;
const MAXIMISED_HEIGHT: u16 = 8;
const MINIMISED_WIDTH: u16 = 9;
const BAR_ROW: u16 = 4;

/// Share of frame time per pass, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeShares {
    /// Update pass.
    pub update: u32,
    /// Render pass.
    pub render: u32,
    /// Everything else (frontend, sleeping).
    pub system: u32,
}

impl TimeShares {
    fn from_totals(update: Duration, render: Duration, window: Duration) -> Self {
        let update = percent(update, window);
        let render = percent(render, window);
        Self {
            update,
            render,
            system: 100_u32.saturating_sub(update).saturating_sub(render),
        }
    }
}

fn percent(part: Duration, whole: Duration) -> u32 {
    part.as_micros()
        .saturating_mul(100)
        .checked_div(whole.as_micros())
        .map_or(0, |share| u32::try_from(share.min(100)).unwrap_or(100))
}

/// The speed-o-meter module.
#[derive(Debug, Clone, Default)]
pub struct Speedometer {
    /// Frame time accumulated in the current window.
    window: Duration,
    update_time: Duration,
    render_time: Duration,
    shares: TimeShares,
    minimised: bool,
    /// Top-left corner, placed at the center of the canvas on first render.
    origin: Option<(u16, u16)>,
}

impl Speedometer {
    /// A fresh, maximised speedometer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares computed at the end of the last complete window.
    pub const fn shares(&self) -> TimeShares {
        self.shares
    }

    /// Whether the overlay is collapsed to its fps line.
    pub const fn is_minimised(&self) -> bool {
        self.minimised
    }

    fn rect(&self) -> Option<Rect> {
        let (x, y) = self.origin?;
        Some(if self.minimised {
            Rect::new(x, y, MINIMISED_WIDTH, 1)
        } else {
            Rect::new(x, y, MAXIMISED_WIDTH, MAXIMISED_HEIGHT)
        })
    }

    /// Screen positions of the minimise and close buttons.
    fn buttons(&self) -> Option<((u16, u16), (u16, u16))> {
        let rect = self.rect()?;
        // Maximised, the buttons sit inside the top-right corner of the border.
        let inset = if self.minimised { 1 } else { 2 };
        let close = rect.x.saturating_add(rect.w).saturating_sub(inset);
        Some(((close.saturating_sub(1), rect.y), (close, rect.y)))
    }

    /// Accumulate one frame's timings, closing the window once a second has
    /// gone by.
    fn accumulate(&mut self, frame: &FrameInfo) {
        self.window = self.window.saturating_add(frame.last_frame_length);
        self.update_time = self.update_time.saturating_add(frame.update_time);
        self.render_time = self.render_time.saturating_add(frame.render_time);
        if self.window >= WINDOW {
            self.shares = TimeShares::from_totals(self.update_time, self.render_time, self.window);
            self.window = Duration::ZERO;
            self.update_time = Duration::ZERO;
            self.render_time = Duration::ZERO;
        }
    }

    fn render_bar(&self, canvas: &mut dyn Canvas, rect: Rect) {
        let bar_len = u32::from(MAXIMISED_WIDTH.saturating_sub(3));
        let segment = |share: u32| -> u16 {
            u16::try_from(bar_len.saturating_mul(share) / 100).unwrap_or(0)
        };
        let row = rect.y.saturating_add(BAR_ROW);
        let mut x = rect.x.saturating_add(2);
        for (share, ch) in [
            (self.shares.update, '#'),
            (self.shares.render, '='),
            (self.shares.system, '.'),
        ] {
            let width = segment(share);
            canvas.fill(Rect::new(x, row, width, 1), ch);
            x = x.saturating_add(width);
        }
    }
}

impl Module for Speedometer {
    fn on_activate(&mut self, _ctx: &mut ModuleContext<'_>) {
        self.window = Duration::ZERO;
        self.update_time = Duration::ZERO;
        self.render_time = Duration::ZERO;
    }

    fn on_mouse(&mut self, ctx: &mut ModuleContext<'_>, mouse: &MouseEvent) -> EventFlow {
        if mouse.action != MouseAction::Press(MouseButton::Left) {
            return EventFlow::Continue;
        }
        let Some((minimise, close)) = self.buttons() else {
            return EventFlow::Continue;
        };
        let at = (mouse.x, mouse.y);
        if at == minimise {
            self.minimised = !self.minimised;
            EventFlow::Consumed
        } else if at == close {
            ctx.deactivate_self();
            EventFlow::Consumed
        } else {
            EventFlow::Continue
        }
    }

    fn update(&mut self, ctx: &mut ModuleContext<'_>) -> UpdateFlow {
        self.accumulate(ctx.frame());
        UpdateFlow::Continue
    }

    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo) {
        if self.origin.is_none() {
            let (width, height) = canvas.size();
            let placed = Rect::centered_in(
                Rect::new(0, 0, width, height),
                MAXIMISED_WIDTH,
                MAXIMISED_HEIGHT,
            );
            self.origin = Some((placed.x, placed.y));
        }
        let (Some(rect), Some((minimise, close))) = (self.rect(), self.buttons()) else {
            return;
        };

        if self.minimised {
            canvas.fill(rect, ' ');
            canvas.print(rect.x, rect.y, &format!("{:4}fps", frame.fps));
            canvas.print(minimise.0, minimise.1, "+");
        } else {
            canvas.draw_frame(rect, Some("Speed-o-meter"));
            let last_ms = frame.last_frame_length.as_millis();
            canvas.print_centered(rect, rect.y.saturating_add(2), &format!("last frame: {last_ms:3} ms"));
            canvas.print_centered(
                rect,
                rect.y.saturating_add(3),
                &format!("frames per second: {:3}", frame.fps),
            );
            self.render_bar(canvas, rect);
            let TimeShares {
                update,
                render,
                system,
            } = self.shares;
            canvas.print_centered(
                rect,
                rect.y.saturating_add(5),
                &format!("Upd {update:2}% Render {render:2}% Sys {system:2}%"),
            );
            canvas.print(minimise.0, minimise.1, "-");
        }
        canvas.print(close.0, close.1, "X");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::canvas::TextCanvas;
    use crate::clock::FrameClock;
    use crate::module::ModuleId;
    use crate::params::Params;
    use crate::queue::{ModuleRef, RequestQueues};

    fn frame_with(last: Duration, update: Duration, render: Duration) -> FrameInfo {
        FrameInfo {
            last_frame_length: last,
            update_time: update,
            render_time: render,
            ..FrameClock::new().begin_frame(Instant::now(), false)
        }
    }

    #[test]
    fn percent_handles_zero_window() {
        assert_eq!(percent(Duration::from_millis(5), Duration::ZERO), 0);
        assert_eq!(percent(Duration::from_millis(250), Duration::from_secs(1)), 25);
        assert_eq!(percent(Duration::from_secs(3), Duration::from_secs(1)), 100);
    }

    #[test]
    fn shares_are_computed_once_per_second() {
        let mut speed = Speedometer::new();
        let frame = frame_with(
            Duration::from_millis(500),
            Duration::from_millis(100),
            Duration::from_millis(50),
        );

        speed.accumulate(&frame);
        assert_eq!(speed.shares(), TimeShares::default());

        speed.accumulate(&frame);
        assert_eq!(
            speed.shares(),
            TimeShares {
                update: 20,
                render: 10,
                system: 70
            }
        );
    }

    #[test]
    fn renders_centered_panel() {
        let mut speed = Speedometer::new();
        let mut canvas = TextCanvas::new(80, 24);
        speed.render(&mut canvas, &frame_with(Duration::from_millis(16), Duration::ZERO, Duration::ZERO));

        assert!(canvas.contains_text("Speed-o-meter"));
        assert!(canvas.contains_text("last frame:  16 ms"));
        assert!(canvas.contains_text("Upd  0% Render  0% Sys  0%"));
    }

    #[test]
    fn buttons_minimise_and_close() {
        let mut speed = Speedometer::new();
        let mut canvas = TextCanvas::new(80, 24);
        let frame = frame_with(Duration::ZERO, Duration::ZERO, Duration::ZERO);
        speed.render(&mut canvas, &frame);

        let (minimise, _close) = speed.buttons().unwrap();
        let params = Params::new();
        let mut queues = RequestQueues::new();
        let id = ModuleId::new(0);
        let mut ctx = ModuleContext::new(id, SPEEDOMETER_NAME, &params, &frame, &mut queues);

        let click = |(x, y): (u16, u16)| MouseEvent {
            x,
            y,
            action: MouseAction::Press(MouseButton::Left),
        };
        assert_eq!(speed.on_mouse(&mut ctx, &click(minimise)), EventFlow::Consumed);
        assert!(speed.is_minimised());

        let (_minimise, close) = speed.buttons().unwrap();
        assert_eq!(speed.on_mouse(&mut ctx, &click(close)), EventFlow::Consumed);
        assert_eq!(queues.pending_deactivations(), &[ModuleRef::Id(id)]);
    }
}
