use super::press::{PressButton, PressControlMethod};
use super::{Axis, ControlError, Controls, VirtualButton};

/// Logical direction a remote can steer the camera in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    ZoomIn,
    ZoomOut,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::ZoomIn,
        Direction::ZoomOut,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Y,
            Direction::Left | Direction::Right => Axis::X,
            Direction::ZoomIn | Direction::ZoomOut => Axis::Zoom,
        }
    }

    /// -1 for up/left/zoom-in, +1 otherwise.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up | Direction::Left | Direction::ZoomIn => -1.0,
            Direction::Down | Direction::Right | Direction::ZoomOut => 1.0,
        }
    }

    /// Registry name of this direction's control method.
    pub fn method_name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::ZoomIn => "zoomIn",
            Direction::ZoomOut => "zoomOut",
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
            Direction::ZoomIn => 4,
            Direction::ZoomOut => 5,
        }
    }
}

/// Exactly one virtual button per [`Direction`].
pub struct ControlBindings<B> {
    buttons: [B; 6],
}

impl<B: VirtualButton> ControlBindings<B> {
    /// Build bindings by creating one button per direction, in
    /// [`Direction::ALL`] order.
    pub fn from_fn(mut make: impl FnMut(Direction) -> B) -> Self {
        Self {
            buttons: std::array::from_fn(|i| make(Direction::ALL[i])),
        }
    }

    pub fn button_mut(&mut self, direction: Direction) -> &mut B {
        &mut self.buttons[direction.index()]
    }

    /// Press then release the button bound to `direction`.
    pub fn pulse(&mut self, direction: Direction) {
        let button = self.button_mut(direction);
        button.press();
        button.release();
    }
}

impl ControlBindings<PressButton> {
    /// Create and register a press control method for every direction.
    ///
    /// Each direction moves its axis at `sign * velocity` and decays under
    /// `friction` once released. Methods are enabled on registration.
    pub fn register(
        controls: &mut Controls,
        velocity: f64,
        friction: f64,
    ) -> Result<Self, ControlError> {
        let mut methods = Vec::with_capacity(Direction::ALL.len());
        let bindings = Self::from_fn(|direction| {
            let (method, button) =
                PressControlMethod::new(direction.axis(), direction.sign() * velocity, friction);
            methods.push((direction, method));
            button
        });

        for (direction, method) in methods {
            controls.register_method(direction.method_name(), method, true)?;
        }
        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_have_expected_axis_and_sign() {
        assert_eq!(Direction::Up.axis(), Axis::Y);
        assert_eq!(Direction::Up.sign(), -1.0);
        assert_eq!(Direction::Down.sign(), 1.0);
        assert_eq!(Direction::Left.axis(), Axis::X);
        assert_eq!(Direction::Left.sign(), -1.0);
        assert_eq!(Direction::Right.sign(), 1.0);
        assert_eq!(Direction::ZoomIn.axis(), Axis::Zoom);
        assert_eq!(Direction::ZoomIn.sign(), -1.0);
        assert_eq!(Direction::ZoomOut.sign(), 1.0);
    }

    #[test]
    fn indices_are_unique() {
        let mut seen = [false; 6];
        for d in Direction::ALL {
            assert!(!seen[d.index()]);
            seen[d.index()] = true;
        }
    }

    #[test]
    fn register_enables_every_direction() {
        for d in Direction::ALL {
            let mut controls = Controls::new();
            let mut bindings = ControlBindings::register(&mut controls, 0.7, 3.0).unwrap();
            bindings.pulse(d);
            let delta = controls.step(1.0);
            let moved = match d.axis() {
                Axis::X => delta.x,
                Axis::Y => delta.y,
                Axis::Zoom => delta.zoom,
            };
            assert!((moved - d.sign() * 0.7 * 0.7 / 6.0).abs() < 1e-9, "{d:?}");
        }
    }

    #[test]
    fn register_twice_on_same_controls_fails() {
        let mut controls = Controls::new();
        ControlBindings::register(&mut controls, 0.7, 3.0).unwrap();
        assert!(ControlBindings::register(&mut controls, 0.7, 3.0).is_err());
    }

    #[test]
    fn pulse_moves_bound_axis_in_signed_direction() {
        let mut controls = Controls::new();
        let mut bindings = ControlBindings::register(&mut controls, 0.7, 3.0).unwrap();

        bindings.pulse(Direction::Up);
        let delta = controls.step(1.0);
        assert!(delta.y < 0.0);
        assert_eq!(delta.x, 0.0);
        assert_eq!(delta.zoom, 0.0);

        bindings.pulse(Direction::ZoomOut);
        let delta = controls.step(1.0);
        assert!(delta.zoom > 0.0);
        assert_eq!(delta.y, 0.0);
    }
}
