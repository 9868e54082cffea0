//! Keyboard → handheld button mapping
//!
//! Screens speak in device buttons (A, B, X, Menu, d-pad). On a terminal each
//! button is reachable through one or more keys:
//! - A: Enter, Space
//! - B: Esc, Backspace, `b`
//! - X: `x`
//! - Menu: `?`, `m`
//! - d-pad: arrows, `h`/`j`/`k`/`l`; shoulder buttons page with PageUp/PageDown

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Handheld buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Menu,
    Up,
    Down,
    Left,
    Right,
    /// Left shoulder: page up
    L1,
    /// Right shoulder: page down
    R1,
    Home,
    End,
}

impl Button {
    /// Name printed in footer hints
    pub fn label(&self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Menu => "Menu",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Left => "Left",
            Button::Right => "Right",
            Button::L1 => "L1",
            Button::R1 => "R1",
            Button::Home => "Home",
            Button::End => "End",
        }
    }

    /// Primary terminal key for this button
    pub fn key_hint(&self) -> &'static str {
        match self {
            Button::A => "Enter",
            Button::B => "Esc",
            Button::X => "x",
            Button::Menu => "?",
            Button::Up => "↑",
            Button::Down => "↓",
            Button::Left => "←",
            Button::Right => "→",
            Button::L1 => "PgUp",
            Button::R1 => "PgDn",
            Button::Home => "Home",
            Button::End => "End",
        }
    }
}

/// Key with modifiers for lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyWithMods {
    code: KeyCode,
    modifiers: KeyModifiers,
}

pub struct KeyBindings {
    bindings: HashMap<KeyWithMods, Button>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        let plain = [
            (KeyCode::Enter, Button::A),
            (KeyCode::Char(' '), Button::A),
            (KeyCode::Esc, Button::B),
            (KeyCode::Backspace, Button::B),
            (KeyCode::Char('b'), Button::B),
            (KeyCode::Char('x'), Button::X),
            (KeyCode::Char('?'), Button::Menu),
            (KeyCode::Char('m'), Button::Menu),
            (KeyCode::Up, Button::Up),
            (KeyCode::Char('k'), Button::Up),
            (KeyCode::Down, Button::Down),
            (KeyCode::Char('j'), Button::Down),
            (KeyCode::Left, Button::Left),
            (KeyCode::Char('h'), Button::Left),
            (KeyCode::Right, Button::Right),
            (KeyCode::Char('l'), Button::Right),
            (KeyCode::PageUp, Button::L1),
            (KeyCode::PageDown, Button::R1),
            (KeyCode::Home, Button::Home),
            (KeyCode::End, Button::End),
        ];

        let mut bindings = HashMap::new();
        for (code, button) in plain {
            bindings.insert(
                KeyWithMods {
                    code,
                    modifiers: KeyModifiers::NONE,
                },
                button,
            );
        }
        // Some terminals report `?` with Shift held
        bindings.insert(
            KeyWithMods {
                code: KeyCode::Char('?'),
                modifiers: KeyModifiers::SHIFT,
            },
            Button::Menu,
        );

        Self { bindings }
    }

    /// Button for a key press, if it is bound.
    pub fn button(&self, key: &KeyEvent) -> Option<Button> {
        self.bindings
            .get(&KeyWithMods {
                code: key.code,
                modifiers: key.modifiers,
            })
            .copied()
    }
}
