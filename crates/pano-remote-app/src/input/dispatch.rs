use std::collections::HashMap;

use super::keys::code;
use crate::control::bindings::Direction;

/// What a remote key code does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Pulse the binding for this direction. Up/Down are reinterpreted as
    /// ZoomIn/ZoomOut while zoom mode is active.
    Direction(Direction),
    /// Toggle pan/zoom mode; the first time also starts the media.
    ToggleModeAndMaybeStart,
    ExitApplication,
    Unmapped,
}

/// Remote key code → action lookup. Built once, read-only afterwards.
pub struct KeyDispatchTable {
    actions: HashMap<u32, KeyAction>,
}

impl KeyDispatchTable {
    /// The standard TV remote layout.
    pub fn standard() -> Self {
        let actions = HashMap::from([
            (code::LEFT, KeyAction::Direction(Direction::Left)),
            (code::UP, KeyAction::Direction(Direction::Up)),
            (code::RIGHT, KeyAction::Direction(Direction::Right)),
            (code::DOWN, KeyAction::Direction(Direction::Down)),
            (code::ENTER, KeyAction::ToggleModeAndMaybeStart),
            (code::RETURN, KeyAction::ExitApplication),
        ]);
        Self { actions }
    }

    pub fn lookup(&self, key_code: u32) -> KeyAction {
        self.actions
            .get(&key_code)
            .copied()
            .unwrap_or(KeyAction::Unmapped)
    }
}
