//! Credits panel drawn over the demo screen.

use umbra_core::canvas::{Canvas, Rect};
use umbra_core::{EventFlow, FrameInfo, KeyCode, KeyPress, Module, ModuleContext, UpdateFlow};

/// Registry name.
pub const NAME: &str = "credits";

const WIDTH: u16 = 48;
const HEIGHT: u16 = 11;

const TEXT: [&str; 7] = [
    "Umbra demo",
    "a cooperative module scheduler",
    "",
    "Built with:",
    "tokio, crossterm, tracing, serde",
    "",
    "x to close",
];

/// The credits panel.
#[derive(Debug, Default)]
pub struct Credits;

impl Module for Credits {
    fn on_key(&mut self, ctx: &mut ModuleContext<'_>, key: &KeyPress) -> EventFlow {
        if key.code == KeyCode::Char('x') {
            ctx.deactivate_self();
            return EventFlow::Consumed;
        }
        EventFlow::Continue
    }

    fn update(&mut self, _ctx: &mut ModuleContext<'_>) -> UpdateFlow {
        UpdateFlow::Continue
    }

    fn render(&mut self, canvas: &mut dyn Canvas, _frame: &FrameInfo) {
        let (width, height) = canvas.size();
        let panel = Rect::centered_in(Rect::new(0, 0, width, height), WIDTH, HEIGHT);
        canvas.draw_frame(panel, Some("Credits"));

        let mut y = panel.y.saturating_add(2);
        for line in TEXT {
            canvas.print_centered(panel, y, line);
            y = y.saturating_add(1);
        }
    }
}
