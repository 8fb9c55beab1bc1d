pub mod bindings;
pub mod dynamics;
pub mod press;

use thiserror::Error;

use self::press::PressControlMethod;

/// View axis a control method drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Yaw.
    X,
    /// Pitch.
    Y,
    /// Vertical field of view.
    Zoom,
}

/// A button-like handle that can be pressed and released programmatically.
pub trait VirtualButton {
    fn press(&mut self);
    fn release(&mut self);
}

/// Per-frame offsets produced by all enabled control methods.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionDelta {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl MotionDelta {
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.zoom == 0.0
    }

    fn add(&mut self, axis: Axis, offset: f64) {
        match axis {
            Axis::X => self.x += offset,
            Axis::Y => self.y += offset,
            Axis::Zoom => self.zoom += offset,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("control method '{0}' is already registered")]
    AlreadyRegistered(String),
}

struct RegisteredMethod {
    name: String,
    method: PressControlMethod,
    enabled: bool,
}

/// Registry of named control methods feeding the view.
#[derive(Default)]
pub struct Controls {
    methods: Vec<RegisteredMethod>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `method` under `name`. `enable` activates it immediately.
    pub fn register_method(
        &mut self,
        name: &str,
        method: PressControlMethod,
        enable: bool,
    ) -> Result<(), ControlError> {
        if self.methods.iter().any(|m| m.name == name) {
            return Err(ControlError::AlreadyRegistered(name.to_string()));
        }
        log::debug!(
            "Registered control method '{}' on {:?} (enabled: {})",
            name,
            method.axis(),
            enable
        );
        self.methods.push(RegisteredMethod {
            name: name.to_string(),
            method,
            enabled: enable,
        });
        Ok(())
    }

    /// Integrate every enabled method over `dt` seconds.
    pub fn step(&mut self, dt: f64) -> MotionDelta {
        let mut delta = MotionDelta::default();
        for entry in self.methods.iter().filter(|m| m.enabled) {
            delta.add(entry.method.axis(), entry.method.step(dt));
        }
        delta
    }
}
