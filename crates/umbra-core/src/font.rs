//! Font registry and the font up/down switching rule.
//!
//! Loading glyphs is the frontend's business. The engine only keeps the list
//! of registered fonts and which one is current, and tells the frontend when
//! the current font changed and the surface has to be re-initialized.

use serde::{Deserialize, Serialize};
use tracing::info;

/// A font image description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    /// Number of glyph columns in the image.
    pub columns: u32,
    /// Number of glyph rows in the image.
    pub rows: u32,
    /// Image file name, relative to the configured font directory.
    pub filename: String,
}

impl Font {
    /// Describe a font image.
    pub fn new(columns: u32, rows: u32, filename: impl Into<String>) -> Self {
        Self {
            columns,
            rows,
            filename: filename.into(),
        }
    }
}

/// Registered fonts and the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontRegistry {
    fonts: Vec<Font>,
    font_id: usize,
    active: Option<usize>,
}

impl FontRegistry {
    /// An empty registry whose selection starts at `font_id`.
    pub const fn new(font_id: usize) -> Self {
        Self {
            fonts: Vec::new(),
            font_id,
            active: None,
        }
    }

    /// Append a font.
    pub fn register(&mut self, font: Font) {
        info!(filename = %font.filename, columns = font.columns, rows = font.rows, "Registered a font");
        self.fonts.push(font);
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no font is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Selected font index.
    pub const fn font_id(&self) -> usize {
        self.font_id
    }

    /// The active font, once one has been activated.
    pub fn active(&self) -> Option<&Font> {
        self.active.and_then(|index| self.fonts.get(index))
    }

    /// Move the selection by `shift` (clamped to -1..=1) and activate it.
    ///
    /// Returns `false`, changing nothing, when no font is registered, when
    /// the target index is out of range, or when a font is already active and
    /// `shift` is zero. Returns `true` when the target font became active.
    pub fn activate_font(&mut self, shift: i32) -> bool {
        if self.fonts.is_empty() {
            return false;
        }
        let shift = shift.clamp(-1, 1);
        let target = match shift {
            -1 => self.font_id.checked_sub(1),
            1 => self.font_id.checked_add(1),
            _ => Some(self.font_id),
        };
        let Some(target) = target.filter(|index| *index < self.fonts.len()) else {
            return false;
        };
        if self.active.is_some() && shift == 0 {
            return false;
        }
        self.active = Some(target);
        self.font_id = target;
        true
    }
}
