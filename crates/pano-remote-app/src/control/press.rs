use std::cell::RefCell;
use std::rc::Rc;

use super::dynamics::Dynamics;
use super::{Axis, VirtualButton};

struct PressState {
    velocity: f64,
    friction: f64,
    pressed: bool,
    dynamics: Dynamics,
}

/// Press-and-hold control method: while its button is held the bound axis
/// moves at a constant velocity; once released the motion decays under
/// friction.
pub struct PressControlMethod {
    axis: Axis,
    state: Rc<RefCell<PressState>>,
}

/// Handle that drives a [`PressControlMethod`]. Has no visual presence.
#[derive(Clone)]
pub struct PressButton {
    state: Rc<RefCell<PressState>>,
}

impl PressControlMethod {
    /// Create a method bound to `axis` and the button that drives it.
    pub fn new(axis: Axis, velocity: f64, friction: f64) -> (Self, PressButton) {
        let state = Rc::new(RefCell::new(PressState {
            velocity,
            friction,
            pressed: false,
            dynamics: Dynamics::REST,
        }));
        let button = PressButton {
            state: Rc::clone(&state),
        };
        (Self { axis, state }, button)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Advance this method's motion by `dt` seconds, returning the offset
    /// to apply to its axis.
    pub fn step(&self, dt: f64) -> f64 {
        self.state.borrow_mut().dynamics.step(dt)
    }
}

impl VirtualButton for PressButton {
    fn press(&mut self) {
        let mut state = self.state.borrow_mut();
        let velocity = state.velocity;
        state.pressed = true;
        state.dynamics = Dynamics {
            velocity,
            friction: 0.0,
        };
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.pressed {
            return;
        }
        let friction = state.friction;
        state.pressed = false;
        state.dynamics.friction = friction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_starts_constant_motion() {
        let (method, mut button) = PressControlMethod::new(Axis::X, 0.7, 3.0);
        button.press();
        assert!((method.step(1.0) - 0.7).abs() < 1e-9);
        // No friction while held
        assert!((method.step(1.0) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn release_applies_friction() {
        let (method, mut button) = PressControlMethod::new(Axis::Y, -0.7, 3.0);
        button.press();
        button.release();

        let moved = method.step(10.0);
        assert!((moved + 0.7 * 0.7 / 6.0).abs() < 1e-9);
        assert_eq!(method.step(1.0), 0.0);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let (method, mut button) = PressControlMethod::new(Axis::Zoom, 0.7, 3.0);
        button.release();
        assert_eq!(method.step(1.0), 0.0);
    }

    #[test]
    fn second_release_does_not_change_motion() {
        let (method, mut button) = PressControlMethod::new(Axis::X, 0.7, 3.0);
        button.press();
        button.release();
        button.release();
        assert!((method.step(10.0) - 0.7 * 0.7 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_pulse_restarts_impulse() {
        let (method, mut button) = PressControlMethod::new(Axis::X, 0.7, 3.0);
        button.press();
        button.release();
        method.step(0.1);

        // Full stopping distance again, not just what was left
        button.press();
        button.release();
        assert!((method.step(10.0) - 0.7 * 0.7 / 6.0).abs() < 1e-9);
    }
}
