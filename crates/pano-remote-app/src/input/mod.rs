pub mod dispatch;
pub mod keys;

use crate::control::VirtualButton;
use crate::control::bindings::{ControlBindings, Direction};
use dispatch::{KeyAction, KeyDispatchTable};

/// Whether Up/Down pan the camera or zoom it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Pan,
    Zoom,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Pan => InputMode::Zoom,
            InputMode::Zoom => InputMode::Pan,
        }
    }

    /// Map a vertical direction onto the binding it drives in this mode.
    fn route(self, direction: Direction) -> Direction {
        match (self, direction) {
            (InputMode::Zoom, Direction::Up) => Direction::ZoomIn,
            (InputMode::Zoom, Direction::Down) => Direction::ZoomOut,
            (_, other) => other,
        }
    }
}

/// Capabilities the controller needs from its host application.
pub trait InputHost {
    /// Kick off media playback. Called at most once per controller.
    fn start_media(&mut self);
    /// Terminate the application.
    fn exit_application(&mut self);
}

/// Result of dispatching a single key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Pulsed(Direction),
    ModeToggled { mode: InputMode, media_started: bool },
    Exit,
    Unmapped,
    /// Key arrived after exit was requested.
    Ignored,
}

/// Turns remote key codes into press/release pulses on virtual buttons.
pub struct RemoteInputController<B> {
    bindings: ControlBindings<B>,
    table: KeyDispatchTable,
    mode: InputMode,
    media_requested: bool,
    exited: bool,
}

impl<B: VirtualButton> RemoteInputController<B> {
    pub fn new(bindings: ControlBindings<B>) -> Self {
        Self {
            bindings,
            table: KeyDispatchTable::standard(),
            mode: InputMode::default(),
            media_requested: false,
            exited: false,
        }
    }

    /// Handle one remote key code. Repeats are not filtered: every
    /// directional key replays a fresh press/release pulse.
    pub fn dispatch(&mut self, key_code: u32, host: &mut impl InputHost) -> Dispatched {
        if self.exited {
            log::debug!("Ignoring key code {} after exit", key_code);
            return Dispatched::Ignored;
        }

        match self.table.lookup(key_code) {
            KeyAction::Direction(direction) => {
                let target = self.mode.route(direction);
                self.bindings.pulse(target);
                Dispatched::Pulsed(target)
            }
            KeyAction::ToggleModeAndMaybeStart => {
                let media_started = !self.media_requested;
                if media_started {
                    log::info!("First confirm press, starting media");
                    self.media_requested = true;
                    host.start_media();
                }
                self.mode = self.mode.toggled();
                log::debug!("Input mode: {:?}", self.mode);
                Dispatched::ModeToggled {
                    mode: self.mode,
                    media_started,
                }
            }
            KeyAction::ExitApplication => {
                log::info!("Exit requested from remote");
                self.exited = true;
                host.exit_application();
                Dispatched::Exit
            }
            KeyAction::Unmapped => {
                log::debug!("Unmapped key code: {}", key_code);
                Dispatched::Unmapped
            }
        }
    }
}
