//! Main demo screen: a bouncing marker, a key reference and the frame status.
//!
//! The marker only moves in `update`, so it visibly freezes under the global
//! pause while the screen keeps rendering.

use umbra_core::canvas::{Canvas, Rect};
use umbra_core::{EventFlow, FrameInfo, KeyCode, KeyPress, Module, ModuleContext, UpdateFlow};

use crate::credits;

/// Registry name.
pub const NAME: &str = "demo";

const HELP: [&str; 8] = [
    "c        show credits",
    "p / r    pause / resume credits",
    "F5       speed-o-meter",
    "Pause    global pause",
    "PgUp/Dn  switch font",
    "PrtScr   screenshot",
    "Alt+Enter  fullscreen",
    "q / Esc  quit",
];

/// The demo screen.
#[derive(Debug, Default)]
pub struct DemoScreen {
    marker: u16,
    backwards: bool,
    /// Track width seen at the last render.
    track: u16,
}

impl DemoScreen {
    /// A new demo screen.
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&mut self) {
        let last = self.track.saturating_sub(1);
        if self.backwards {
            self.marker = self.marker.saturating_sub(1);
            if self.marker == 0 {
                self.backwards = false;
            }
        } else {
            self.marker = self.marker.saturating_add(1).min(last);
            if self.marker >= last {
                self.backwards = true;
            }
        }
    }
}

impl Module for DemoScreen {
    fn on_key(&mut self, ctx: &mut ModuleContext<'_>, key: &KeyPress) -> EventFlow {
        match key.code {
            KeyCode::Char('c') => ctx.activate(credits::NAME),
            KeyCode::Char('p') => ctx.pause(credits::NAME),
            KeyCode::Char('r') => ctx.resume(credits::NAME),
            KeyCode::Char('q') | KeyCode::Esc => {
                ctx.deactivate_self();
                ctx.request_shutdown();
            }
            _ => return EventFlow::Continue,
        }
        EventFlow::Consumed
    }

    fn update(&mut self, _ctx: &mut ModuleContext<'_>) -> UpdateFlow {
        self.advance();
        UpdateFlow::Continue
    }

    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo) {
        let (width, height) = canvas.size();
        let screen = Rect::new(0, 0, width, height);
        canvas.draw_frame(screen, Some("Umbra demo"));

        let mut y: u16 = 2;
        for line in HELP {
            canvas.print(3, y, line);
            y = y.saturating_add(1);
        }

        self.track = width.saturating_sub(6);
        let track_row = y.saturating_add(1);
        canvas.fill(Rect::new(3, track_row, self.track, 1), '.');
        canvas.print(self.marker.saturating_add(3), track_row, "O");

        let status = format!(
            "frame {}  fps {}  {}",
            frame.frame,
            frame.fps,
            if frame.paused { "PAUSED" } else { "running" }
        );
        canvas.print(3, height.saturating_sub(2), &status);
    }
}
