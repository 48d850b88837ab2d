//! Crossterm frontend: raw-mode terminal input and full-frame redraws.
//!
//! The terminal is put in raw mode on the alternate screen with mouse
//! capture on, and restored when the frontend is dropped. Terminal events
//! are translated into engine [`InputEvent`]s; anything without an engine
//! counterpart (focus, paste, scroll) is ignored.

use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode as TermKey, KeyEvent,
    KeyEventKind, KeyModifiers, MouseButton as TermButton, MouseEvent as TermMouse,
    MouseEventKind,
};
use crossterm::{cursor, execute, queue, style, terminal};
use tracing::{debug, info, warn};
use umbra_core::canvas::Canvas;
use umbra_core::font::Font;
use umbra_core::input::{MouseAction, MouseButton};
use umbra_core::runner::{Frontend, FrontendError};
use umbra_core::{DisplayRequests, InputEvent, KeyCode, KeyPress, Modifiers, MouseEvent, TextCanvas};

/// Terminal frontend.
pub struct TerminalFrontend {
    out: Stdout,
    size: (u16, u16),
    fullscreen: bool,
    screenshots: u32,
    screenshot_dir: PathBuf,
    restored: bool,
}

impl TerminalFrontend {
    /// Switch the terminal to raw mode on the alternate screen.
    pub fn enter(screenshot_dir: PathBuf) -> Result<Self, FrontendError> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        let size = terminal::size()?;
        info!(width = size.0, height = size.1, "Terminal ready");
        Ok(Self {
            out,
            size,
            fullscreen: false,
            screenshots: 0,
            screenshot_dir,
            restored: false,
        })
    }

    /// Give the terminal back in the state it was found.
    pub fn restore(&mut self) -> Result<(), FrontendError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(
            self.out,
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        debug!("Terminal restored");
        Ok(())
    }

    /// Terminal size in cells.
    pub const fn size(&self) -> (u16, u16) {
        self.size
    }

    fn save_screenshot(&mut self, canvas: &TextCanvas) -> Result<(), FrontendError> {
        self.screenshots = self.screenshots.saturating_add(1);
        let path = self
            .screenshot_dir
            .join(format!("screenshot{:03}.txt", self.screenshots));
        std::fs::write(&path, canvas.to_text())?;
        info!(path = %path.display(), "Screenshot saved");
        Ok(())
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(error = %err, "Failed to restore the terminal");
        }
    }
}

impl Frontend for TerminalFrontend {
    fn poll_input(&mut self) -> Result<Vec<InputEvent>, FrontendError> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => events.extend(map_key(&key).map(InputEvent::Key)),
                Event::Mouse(mouse) => events.extend(map_mouse(&mouse).map(InputEvent::Mouse)),
                Event::Resize(width, height) => {
                    debug!(width, height, "Terminal resized");
                    self.size = (width, height);
                }
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
        Ok(events)
    }

    fn present(
        &mut self,
        canvas: &TextCanvas,
        display: &DisplayRequests,
    ) -> Result<(), FrontendError> {
        if display.fullscreen != self.fullscreen {
            self.fullscreen = display.fullscreen;
            info!(
                fullscreen = self.fullscreen,
                "Display mode toggled; the terminal window keeps its size"
            );
        }
        if display.screenshot {
            self.save_screenshot(canvas)?;
        }

        let (_, height) = canvas.size();
        for y in 0..height {
            let row = canvas.row(y).unwrap_or_default();
            queue!(
                self.out,
                cursor::MoveTo(0, y),
                style::Print(row),
                terminal::Clear(terminal::ClearType::UntilNewLine)
            )?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn surface_size(&self) -> Option<(u16, u16)> {
        Some(self.size)
    }

    fn reinitialize(&mut self, font: Option<&Font>) -> Result<(), FrontendError> {
        info!(
            font = font.map_or("none", |f| f.filename.as_str()),
            "Font switched; glyphs are drawn by the terminal emulator"
        );
        execute!(self.out, terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }
}

/// Translate a terminal key event. Releases and keys the engine does not
/// know are dropped.
pub fn map_key(key: &KeyEvent) -> Option<KeyPress> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let mut modifiers = Modifiers {
        alt: key.modifiers.contains(KeyModifiers::ALT),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    };
    let code = match key.code {
        TermKey::Char(c) if c.is_ascii_uppercase() => {
            modifiers.shift = true;
            KeyCode::Char(c.to_ascii_lowercase())
        }
        TermKey::Char(c) => KeyCode::Char(c),
        TermKey::Enter => KeyCode::Enter,
        TermKey::Esc => KeyCode::Esc,
        TermKey::Backspace => KeyCode::Backspace,
        TermKey::Tab => KeyCode::Tab,
        TermKey::Up => KeyCode::Up,
        TermKey::Down => KeyCode::Down,
        TermKey::Left => KeyCode::Left,
        TermKey::Right => KeyCode::Right,
        TermKey::PageUp => KeyCode::PageUp,
        TermKey::PageDown => KeyCode::PageDown,
        TermKey::Home => KeyCode::Home,
        TermKey::End => KeyCode::End,
        TermKey::PrintScreen => KeyCode::PrintScreen,
        TermKey::Pause => KeyCode::Pause,
        TermKey::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(KeyPress::new(code, modifiers))
}

/// Translate a terminal mouse event. Scrolling is dropped.
pub fn map_mouse(mouse: &TermMouse) -> Option<MouseEvent> {
    let button = |b: TermButton| match b {
        TermButton::Left => MouseButton::Left,
        TermButton::Right => MouseButton::Right,
        TermButton::Middle => MouseButton::Middle,
    };
    let action = match mouse.kind {
        MouseEventKind::Down(b) => MouseAction::Press(button(b)),
        MouseEventKind::Up(b) => MouseAction::Release(button(b)),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => MouseAction::Move,
        MouseEventKind::ScrollDown
        | MouseEventKind::ScrollUp
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => return None,
    };
    Some(MouseEvent {
        x: mouse.column,
        y: mouse.row,
        action,
    })
}
