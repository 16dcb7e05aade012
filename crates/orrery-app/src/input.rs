//! Keyboard shortcuts of the viewer.
//!
//! Physical key codes are used so the shortcuts sit in the same place on
//! every keyboard layout.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Something the user asked the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerAction {
    /// Draw triangle edges only (W).
    Wireframe,
    /// Draw filled triangles (F).
    Fill,
    /// Close the window (Escape or Q).
    Quit,
    /// Freeze or resume the simulation clock (Space).
    TogglePause,
    /// Double the time scale (`=` or keypad `+`).
    SpeedUp,
    /// Halve the time scale (`-` or keypad `-`).
    SlowDown,
    /// Re-read the planet shader from disk (R).
    ReloadShaders,
    /// Re-read `config.ron` and apply its live settings (C).
    ReloadConfig,
}

impl ViewerAction {
    /// Action bound to `key`, if any.
    pub fn from_key(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        Some(match code {
            KeyCode::KeyW => Self::Wireframe,
            KeyCode::KeyF => Self::Fill,
            KeyCode::Escape | KeyCode::KeyQ => Self::Quit,
            KeyCode::Space => Self::TogglePause,
            KeyCode::Equal | KeyCode::NumpadAdd => Self::SpeedUp,
            KeyCode::Minus | KeyCode::NumpadSubtract => Self::SlowDown,
            KeyCode::KeyR => Self::ReloadShaders,
            KeyCode::KeyC => Self::ReloadConfig,
            _ => return None,
        })
    }

    /// Action for a winit key event. Only fresh presses trigger; releases and
    /// auto-repeat do not.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        Self::from_key_state(event.physical_key, event.state, event.repeat)
    }

    fn from_key_state(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<Self> {
        if state != ElementState::Pressed || repeat {
            return None;
        }
        Self::from_key(key)
    }
}
