/// Velocity/friction state for a single view axis.
///
/// Velocity is in axis units per second (radians for yaw, pitch and fov),
/// friction in axis units per second squared. Friction only ever slows the
/// axis down; it never reverses direction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dynamics {
    pub velocity: f64,
    pub friction: f64,
}

impl Dynamics {
    pub const REST: Self = Self {
        velocity: 0.0,
        friction: 0.0,
    };

    /// Integrate over `dt` seconds and return the distance travelled.
    pub fn step(&mut self, dt: f64) -> f64 {
        if dt <= 0.0 || self.velocity == 0.0 {
            return 0.0;
        }

        if self.friction <= 0.0 {
            return self.velocity * dt;
        }

        let speed = self.velocity.abs();
        let sign = self.velocity.signum();
        // Time until friction brings the axis to rest, capped to this frame
        let t = (speed / self.friction).min(dt);
        let distance = speed * t - 0.5 * self.friction * t * t;

        let remaining = speed - self.friction * t;
        self.velocity = if remaining <= f64::EPSILON {
            0.0
        } else {
            sign * remaining
        };

        sign * distance
    }
}
