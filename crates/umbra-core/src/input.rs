//! Input events, key bindings and engine-level global actions.
//!
//! Frontends translate their native events into [`InputEvent`]s. The engine
//! first checks key presses against the [`KeyBindings`]; a match triggers a
//! [`GlobalAction`] and the key is not offered to modules. Everything else is
//! delivered to the running modules in priority order.

use serde::{Deserialize, Serialize};

/// A key, independent of any terminal library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Home.
    Home,
    /// End.
    End,
    /// Print screen.
    PrintScreen,
    /// Pause / Break.
    Pause,
    /// Function key `F1`..`F12`.
    F(u8),
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    /// Alt held.
    pub alt: bool,
    /// Control held.
    pub ctrl: bool,
    /// Shift held.
    pub shift: bool,
}

impl Modifiers {
    /// No modifier.
    pub const NONE: Self = Self {
        alt: false,
        ctrl: false,
        shift: false,
    };

    /// Alt only.
    pub const ALT: Self = Self {
        alt: true,
        ctrl: false,
        shift: false,
    };

    /// Control and shift.
    pub const CTRL_SHIFT: Self = Self {
        alt: false,
        ctrl: true,
        shift: true,
    };
}

/// A key together with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPress {
    /// The key.
    pub code: KeyCode,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// A key press with explicit modifiers.
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key press without modifiers.
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Right button.
    Right,
    /// Middle button.
    Middle,
}

/// What happened with the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseAction {
    /// Button pressed.
    Press(MouseButton),
    /// Button released.
    Release(MouseButton),
    /// Pointer moved, possibly while dragging.
    Move,
}

/// A mouse event in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Action.
    pub action: MouseAction,
}

/// An input event delivered to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Key pressed.
    Key(KeyPress),
    /// Mouse event.
    Mouse(MouseEvent),
}

/// Engine-level actions triggered by reserved key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalAction {
    /// Deactivate every module and signal shutdown.
    Quit,
    /// Toggle fullscreen display mode.
    ToggleFullscreen,
    /// Ask the frontend for a screenshot.
    Screenshot,
    /// Switch to the next font.
    FontUp,
    /// Switch to the previous font.
    FontDown,
    /// Toggle the global pause.
    TogglePause,
    /// Toggle the built-in speedometer.
    ToggleSpeedometer,
}

/// Reserved key bindings, checked before modules see a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: Vec<(KeyPress, GlobalAction)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyPress::new(KeyCode::F(4), Modifiers::ALT), GlobalAction::Quit),
                (
                    KeyPress::new(KeyCode::Char('q'), Modifiers::CTRL_SHIFT),
                    GlobalAction::Quit,
                ),
                (
                    KeyPress::new(KeyCode::Enter, Modifiers::ALT),
                    GlobalAction::ToggleFullscreen,
                ),
                (KeyPress::plain(KeyCode::PrintScreen), GlobalAction::Screenshot),
                (KeyPress::plain(KeyCode::PageUp), GlobalAction::FontUp),
                (KeyPress::plain(KeyCode::PageDown), GlobalAction::FontDown),
                (KeyPress::plain(KeyCode::Pause), GlobalAction::TogglePause),
                (KeyPress::plain(KeyCode::F(5)), GlobalAction::ToggleSpeedometer),
            ],
        }
    }
}

impl KeyBindings {
    /// Bindings with nothing bound.
    pub const fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `key` to `action`, replacing any action already bound to `key`.
    pub fn bind(&mut self, key: KeyPress, action: GlobalAction) {
        self.bindings.retain(|(bound, _)| *bound != key);
        self.bindings.push((key, action));
    }

    /// Remove every binding of `action`.
    pub fn unbind_action(&mut self, action: GlobalAction) {
        self.bindings.retain(|(_, bound)| *bound != action);
    }

    /// The action bound to `key`, if any.
    pub fn action_for(&self, key: &KeyPress) -> Option<GlobalAction> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == key)
            .map(|(_, action)| *action)
    }

    /// Every key bound to `action`.
    pub fn keys_for(&self, action: GlobalAction) -> impl Iterator<Item = &KeyPress> {
        self.bindings
            .iter()
            .filter(move |(_, bound)| *bound == action)
            .map(|(key, _)| key)
    }
}
