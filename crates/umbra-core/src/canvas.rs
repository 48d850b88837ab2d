//! Rendering surface used by module `render` hooks.
//!
//! The engine never draws anything itself. It hands a [`Canvas`] to each
//! module during the render pass; how the canvas reaches the screen is up to
//! the frontend. [`TextCanvas`] is a plain character grid that frontends can
//! flush to a terminal and tests can inspect.

/// A rectangle in cell coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Width in cells.
    pub w: u16,
    /// Height in cells.
    pub h: u16,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the cell `(x, y)` lies inside the rectangle.
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x.saturating_add(self.w)
            && y < self.y.saturating_add(self.h)
    }

    /// Rectangle of the given size centered inside `bounds`.
    pub const fn centered_in(bounds: Self, w: u16, h: u16) -> Self {
        let x = bounds.x.saturating_add(bounds.w.saturating_sub(w) / 2);
        let y = bounds.y.saturating_add(bounds.h.saturating_sub(h) / 2);
        Self::new(x, y, w, h)
    }
}

/// Drawing operations available to modules.
pub trait Canvas {
    /// Width and height in cells.
    fn size(&self) -> (u16, u16);

    /// Blank the whole surface.
    fn clear(&mut self);

    /// Print `text` starting at `(x, y)`, clipped to the surface.
    fn print(&mut self, x: u16, y: u16, text: &str);

    /// Fill `rect` with `ch`.
    fn fill(&mut self, rect: Rect, ch: char);

    /// Draw a single-line border around `rect` with an optional title on the
    /// top edge. The interior is cleared.
    fn draw_frame(&mut self, rect: Rect, title: Option<&str>) {
        if rect.w < 2 || rect.h < 2 {
            return;
        }
        let right = rect.x.saturating_add(rect.w).saturating_sub(1);
        let bottom = rect.y.saturating_add(rect.h).saturating_sub(1);
        let inner_w = rect.w.saturating_sub(2);

        self.fill(
            Rect::new(rect.x.saturating_add(1), rect.y.saturating_add(1), inner_w, rect.h.saturating_sub(2)),
            ' ',
        );
        let horizontal: String = "─".repeat(usize::from(inner_w));
        self.print(rect.x, rect.y, "┌");
        self.print(rect.x.saturating_add(1), rect.y, &horizontal);
        self.print(right, rect.y, "┐");
        self.print(rect.x, bottom, "└");
        self.print(rect.x.saturating_add(1), bottom, &horizontal);
        self.print(right, bottom, "┘");
        for row in rect.y.saturating_add(1)..bottom {
            self.print(rect.x, row, "│");
            self.print(right, row, "│");
        }
        if let Some(title) = title {
            let title: String = title.chars().take(usize::from(inner_w)).collect();
            let len = u16::try_from(title.chars().count()).unwrap_or(inner_w);
            let x = rect.x.saturating_add(1).saturating_add(inner_w.saturating_sub(len) / 2);
            self.print(x, rect.y, &title);
        }
    }

    /// Print `text` horizontally centered on row `y` within `rect`.
    fn print_centered(&mut self, rect: Rect, y: u16, text: &str) {
        let len = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        let x = rect.x.saturating_add(rect.w.saturating_sub(len) / 2);
        self.print(x, y, text);
    }
}

/// An in-memory grid of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCanvas {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl TextCanvas {
    /// Create a blank canvas.
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width).saturating_mul(usize::from(height));
        Self {
            width,
            height,
            cells: vec![' '; len],
        }
    }

    /// Resize the canvas, discarding its content.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    /// Character at `(x, y)`, or `None` outside the canvas.
    pub fn cell(&self, x: u16, y: u16) -> Option<char> {
        self.index(x, y).and_then(|i| self.cells.get(i).copied())
    }

    /// Row `y` as a string, trailing spaces included.
    pub fn row(&self, y: u16) -> Option<String> {
        if y >= self.height {
            return None;
        }
        let start = usize::from(y).saturating_mul(usize::from(self.width));
        let end = start.saturating_add(usize::from(self.width));
        self.cells.get(start..end).map(|row| row.iter().collect())
    }

    /// All rows joined with newlines, trailing spaces trimmed.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .filter_map(|y| self.row(y))
            .map(|row| row.trim_end().to_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any row contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height)
            .filter_map(|y| self.row(y))
            .any(|row| row.contains(needle))
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        usize::from(y)
            .checked_mul(usize::from(self.width))
            .and_then(|row| row.checked_add(usize::from(x)))
    }
}

impl Canvas for TextCanvas {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn print(&mut self, x: u16, y: u16, text: &str) {
        let mut col = x;
        for ch in text.chars() {
            if let Some(cell) = self.index(col, y).and_then(|i| self.cells.get_mut(i)) {
                *cell = ch;
            }
            col = match col.checked_add(1) {
                Some(next) if next < self.width => next,
                _ => break,
            };
        }
    }

    fn fill(&mut self, rect: Rect, ch: char) {
        for y in rect.y..rect.y.saturating_add(rect.h).min(self.height) {
            for x in rect.x..rect.x.saturating_add(rect.w).min(self.width) {
                if let Some(cell) = self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
                    *cell = ch;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn print_clips_at_the_right_edge() {
        let mut canvas = TextCanvas::new(5, 1);
        canvas.print(3, 0, "abc");
        assert_eq!(canvas.row(0).unwrap(), "   ab");
    }

    #[test]
    fn print_outside_is_ignored() {
        let mut canvas = TextCanvas::new(4, 2);
        canvas.print(0, 5, "zzz");
        assert_eq!(canvas.to_text(), "\n");
    }

    #[test]
    fn frame_has_corners_and_title() {
        let mut canvas = TextCanvas::new(12, 3);
        canvas.draw_frame(Rect::new(0, 0, 12, 3), Some("Hi"));
        assert_eq!(canvas.cell(0, 0), Some('┌'));
        assert_eq!(canvas.cell(11, 2), Some('┘'));
        assert_eq!(canvas.cell(0, 1), Some('│'));
        assert!(canvas.contains_text("Hi"));
    }

    #[test]
    fn rect_contains_and_centering() {
        let rect = Rect::new(2, 2, 3, 3);
        assert!(rect.contains(2, 2));
        assert!(rect.contains(4, 4));
        assert!(!rect.contains(5, 4));

        let centered = Rect::centered_in(Rect::new(0, 0, 80, 24), 30, 8);
        assert_eq!(centered, Rect::new(25, 8, 30, 8));
    }

    #[test]
    fn clear_blanks_everything() {
        let mut canvas = TextCanvas::new(3, 2);
        canvas.fill(Rect::new(0, 0, 3, 2), '#');
        assert!(canvas.contains_text("###"));
        canvas.clear();
        assert!(!canvas.contains_text("#"));
    }
}
