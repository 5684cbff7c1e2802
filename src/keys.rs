//! Keyboard surface mapping.
//!
//! The host UI translates raw key events into [`Key`] + [`Modifiers`] and
//! asks the bindings which session action, if any, the press maps to.

use crate::session::SessionAction;

/// Keys the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    S,
    Z,
}

/// Modifier state accompanying a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true };
}

/// Keybinding configuration for the annotation surface.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Key for navigating to the next tile
    pub next_tile: (Key, Modifiers),
    /// Key for navigating to the previous tile
    pub prev_tile: (Key, Modifiers),
    /// Key for saving the current annotation set
    pub save: (Key, Modifiers),
    /// Key for undoing the last point
    pub undo: (Key, Modifiers),
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            next_tile: (Key::ArrowRight, Modifiers::NONE),
            prev_tile: (Key::ArrowLeft, Modifiers::NONE),
            save: (Key::S, Modifiers::CTRL),
            undo: (Key::Z, Modifiers::CTRL),
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session action that corresponds to a key press, if any.
    pub fn action_for_key(&self, key: Key, modifiers: Modifiers) -> Option<SessionAction> {
        let pressed = (key, modifiers);
        if pressed == self.next_tile {
            Some(SessionAction::NextTile)
        } else if pressed == self.prev_tile {
            Some(SessionAction::PrevTile)
        } else if pressed == self.save {
            Some(SessionAction::Save)
        } else if pressed == self.undo {
            Some(SessionAction::Undo)
        } else {
            None
        }
    }
}
