//! Keyboard input decoding.
//!
//! A host translates its native key events into [`KeyPress`] values and
//! feeds them to the controller that owns the canvas. Nothing here listens
//! to global events, so several canvases can coexist.

use crate::command::{Command, Direction};
use crate::element::ElementKind;
use crate::navigation::Mode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
}

/// Logical key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Tab,
    Enter,
    Escape,
    Delete,
    Backspace,
    Char(char),
}

impl Key {
    /// Parse a DOM-style key name (`"ArrowLeft"`, `"Tab"`, `"n"`).
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    fn label(&self) -> String {
        match self {
            Self::ArrowLeft => "Left".to_string(),
            Self::ArrowRight => "Right".to_string(),
            Self::ArrowUp => "Up".to_string(),
            Self::ArrowDown => "Down".to_string(),
            Self::Tab => "Tab".to_string(),
            Self::Enter => "Enter".to_string(),
            Self::Escape => "Escape".to_string(),
            Self::Delete => "Delete".to_string(),
            Self::Backspace => "Backspace".to_string(),
            Self::Char(c) => c.to_uppercase().to_string(),
        }
    }

    fn arrow(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::ArrowLeft,
            Direction::Right => Self::ArrowRight,
            Direction::Up => Self::ArrowUp,
            Direction::Down => Self::ArrowDown,
        }
    }
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Normalised key combination used as a lookup key.
///
/// Meta counts as Ctrl, letters are lowercased, and Shift is ignored for
/// symbols since it is usually needed just to type them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    pub const fn new(key: Key, ctrl: bool, shift: bool, alt: bool) -> Self {
        Self {
            key,
            ctrl,
            shift,
            alt,
        }
    }

    const fn plain(key: Key) -> Self {
        Self::new(key, false, false, false)
    }

    const fn for_char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    fn normalized(self) -> Self {
        match self.key {
            Key::Char(c) if c.is_alphabetic() => Self {
                key: Key::Char(c.to_ascii_lowercase()),
                ..self
            },
            Key::Char(_) => Self {
                shift: false,
                ..self
            },
            _ => self,
        }
    }

    /// Format the binding for display (e.g., "Ctrl+Shift+N").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.alt {
            parts.push("Alt".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(self.key.label());
        parts.join("+")
    }
}

impl From<KeyPress> for KeyBinding {
    fn from(press: KeyPress) -> Self {
        Self::new(
            press.key,
            press.modifiers.ctrl || press.modifiers.meta,
            press.modifiers.shift,
            press.modifiers.alt,
        )
        .normalized()
    }
}

/// Per-mode command tables plus a table shared by every mode.
///
/// The table of the active mode is consulted first.
#[derive(Debug, Clone)]
pub struct Keymap {
    global: HashMap<KeyBinding, Command>,
    modes: HashMap<Mode, HashMap<KeyBinding, Command>>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self::empty();

        for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            let arrow = Key::arrow(direction);
            keymap.bind_global(KeyBinding::plain(arrow), Command::Navigate(direction));
            keymap.bind_global(
                KeyBinding::new(arrow, true, false, false),
                Command::MoveSelected(direction),
            );
        }
        keymap.bind_global(KeyBinding::plain(Key::Tab), Command::Next);
        keymap.bind_global(KeyBinding::new(Key::Tab, false, true, false), Command::Previous);
        keymap.bind_global(KeyBinding::for_char('+'), Command::ZoomIn);
        keymap.bind_global(KeyBinding::for_char('='), Command::ZoomIn);
        keymap.bind_global(KeyBinding::for_char('-'), Command::ZoomOut);
        keymap.bind_global(KeyBinding::for_char('0'), Command::ResetZoom);
        keymap.bind_global(KeyBinding::for_char('f'), Command::FocusSelected);
        keymap.bind_global(KeyBinding::new(Key::Char('f'), false, true, false), Command::FitAll);
        keymap.bind_global(
            KeyBinding::new(Key::Backspace, false, false, true),
            Command::FocusPrevious,
        );

        let select = [
            (KeyBinding::plain(Key::Escape), Command::ClearSelection),
            (KeyBinding::for_char('n'), Command::Create(ElementKind::Class)),
            (
                KeyBinding::new(Key::Char('n'), false, true, false),
                Command::CreateConnected(ElementKind::Class),
            ),
            (KeyBinding::for_char('m'), Command::Create(ElementKind::Method)),
            (KeyBinding::for_char('i'), Command::Create(ElementKind::Interface)),
            (KeyBinding::plain(Key::Delete), Command::DeleteSelected),
            (KeyBinding::plain(Key::Backspace), Command::DeleteSelected),
            (KeyBinding::for_char('c'), Command::SetMode(Mode::Create)),
            (KeyBinding::for_char('l'), Command::SetMode(Mode::Connect)),
        ];
        for (binding, command) in select {
            keymap.bind(Mode::Select, binding, command);
        }

        let create = [
            (KeyBinding::plain(Key::Escape), Command::SetMode(Mode::Select)),
            (KeyBinding::for_char('c'), Command::Create(ElementKind::Class)),
            (KeyBinding::for_char('m'), Command::Create(ElementKind::Method)),
            (KeyBinding::for_char('i'), Command::Create(ElementKind::Interface)),
            (KeyBinding::plain(Key::Enter), Command::CreateConnected(ElementKind::Class)),
        ];
        for (binding, command) in create {
            keymap.bind(Mode::Create, binding, command);
        }

        // Connect mode only navigates until target confirmation exists.
        keymap.bind(Mode::Connect, KeyBinding::plain(Key::Escape), Command::SetMode(Mode::Select));

        keymap
    }
}

impl Keymap {
    /// A keymap with no bindings.
    pub fn empty() -> Self {
        Self {
            global: HashMap::new(),
            modes: HashMap::new(),
        }
    }

    /// Bind a combination for one mode, replacing any earlier binding.
    pub fn bind(&mut self, mode: Mode, binding: KeyBinding, command: Command) -> Option<Command> {
        self.modes
            .entry(mode)
            .or_default()
            .insert(binding.normalized(), command)
    }

    /// Bind a combination in every mode.
    pub fn bind_global(&mut self, binding: KeyBinding, command: Command) -> Option<Command> {
        self.global.insert(binding.normalized(), command)
    }

    pub fn unbind(&mut self, mode: Mode, binding: KeyBinding) -> Option<Command> {
        self.modes.get_mut(&mode)?.remove(&binding.normalized())
    }

    /// Resolve a key press in `mode`.
    pub fn resolve(&self, mode: Mode, press: KeyPress) -> Option<&Command> {
        let binding = KeyBinding::from(press);
        self.modes
            .get(&mode)
            .and_then(|table| table.get(&binding))
            .or_else(|| self.global.get(&binding))
    }

    /// Every binding active in `mode`, sorted by their display form.
    pub fn bindings(&self, mode: Mode) -> Vec<(KeyBinding, Command)> {
        let mut merged: HashMap<KeyBinding, Command> = self.global.clone();
        if let Some(table) = self.modes.get(&mode) {
            merged.extend(table.iter().map(|(b, c)| (*b, c.clone())));
        }
        let mut bindings: Vec<_> = merged.into_iter().collect();
        bindings.sort_by_key(|(binding, _)| binding.format());
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_navigate_in_every_mode() {
        let keymap = Keymap::default();
        for mode in [Mode::Select, Mode::Create, Mode::Connect] {
            assert_eq!(
                keymap.resolve(mode, KeyPress::plain(Key::ArrowRight)),
                Some(&Command::Navigate(Direction::Right))
            );
        }
    }

    #[test]
    fn test_modifiers_select_binding() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::Tab, Modifiers::SHIFT)),
            Some(&Command::Previous)
        );
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::ArrowUp, Modifiers::CTRL)),
            Some(&Command::MoveSelected(Direction::Up))
        );
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::ArrowUp, meta)),
            Some(&Command::MoveSelected(Direction::Up))
        );
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::Backspace, Modifiers::ALT)),
            Some(&Command::FocusPrevious)
        );
    }

    #[test]
    fn test_mode_tables_differ() {
        let keymap = Keymap::default();
        let c = KeyPress::plain(Key::Char('c'));
        assert_eq!(keymap.resolve(Mode::Select, c), Some(&Command::SetMode(Mode::Create)));
        assert_eq!(keymap.resolve(Mode::Create, c), Some(&Command::Create(ElementKind::Class)));
        assert_eq!(keymap.resolve(Mode::Connect, c), None);
    }

    #[test]
    fn test_letter_case_and_symbol_shift() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::Char('N'), Modifiers::SHIFT)),
            Some(&Command::CreateConnected(ElementKind::Class))
        );
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::Char('+'), Modifiers::SHIFT)),
            Some(&Command::ZoomIn)
        );
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_name("x"), Some(Key::Char('x')));
        assert_eq!(Key::from_name("PageDown"), None);
        assert_eq!(Key::from_name(""), None);
    }

    #[test]
    fn test_custom_bindings() {
        let mut keymap = Keymap::empty();
        let binding = KeyBinding::new(Key::Char('D'), true, false, false);
        keymap.bind(Mode::Select, binding, Command::DeleteSelected);
        assert_eq!(
            keymap.resolve(Mode::Select, KeyPress::new(Key::Char('d'), Modifiers::CTRL)),
            Some(&Command::DeleteSelected)
        );
        assert_eq!(keymap.unbind(Mode::Select, binding), Some(Command::DeleteSelected));
        assert!(keymap.bindings(Mode::Select).is_empty());
    }

    #[test]
    fn test_binding_format() {
        let binding = KeyBinding::new(Key::Char('n'), true, true, false);
        assert_eq!(binding.format(), "Ctrl+Shift+N");
        assert_eq!(KeyBinding::plain(Key::ArrowLeft).format(), "Left");
    }
}
