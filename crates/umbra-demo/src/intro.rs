//! Title screen. Types its banner in, then waits for a key or its timeout.

use std::time::{Duration, Instant};

use umbra_core::canvas::{Canvas, Rect};
use umbra_core::{EventFlow, FrameInfo, KeyPress, Module, ModuleContext, UpdateFlow};

/// Registry name.
pub const NAME: &str = "intro";

const DEFAULT_TITLE: &str = "U M B R A";
const SUBTITLE: &str = "cooperative module scheduler";
const HINT: &str = "press any key";

/// Time to reveal one banner character.
const CHAR_DELAY: Duration = Duration::from_millis(80);

/// The intro module.
#[derive(Debug, Default)]
pub struct Intro {
    title: String,
    activated_at: Option<Instant>,
}

impl Intro {
    /// A new intro.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of banner characters visible at `now`.
    fn revealed(&self, now: Instant) -> usize {
        let shown = self.activated_at.map_or(Duration::ZERO, |at| now.saturating_duration_since(at));
        shown
            .as_millis()
            .checked_div(CHAR_DELAY.as_millis())
            .map_or(0, |chars| usize::try_from(chars).unwrap_or(usize::MAX))
    }
}

impl Module for Intro {
    fn on_activate(&mut self, ctx: &mut ModuleContext<'_>) {
        self.title = ctx
            .param("title")
            .as_str()
            .unwrap_or(DEFAULT_TITLE)
            .to_owned();
        self.activated_at = Some(ctx.frame().now);
    }

    fn on_key(&mut self, ctx: &mut ModuleContext<'_>, _key: &KeyPress) -> EventFlow {
        ctx.deactivate_self();
        EventFlow::Consumed
    }

    fn update(&mut self, _ctx: &mut ModuleContext<'_>) -> UpdateFlow {
        UpdateFlow::Continue
    }

    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo) {
        let (width, height) = canvas.size();
        let screen = Rect::new(0, 0, width, height);
        let middle = height / 2;

        let revealed = self.revealed(frame.now);
        let banner: String = self.title.chars().take(revealed).collect();
        canvas.print_centered(screen, middle.saturating_sub(1), &banner);

        if revealed >= self.title.chars().count() {
            canvas.print_centered(screen, middle.saturating_add(1), SUBTITLE);
            canvas.print_centered(screen, height.saturating_sub(2), HINT);
        }
    }
}
