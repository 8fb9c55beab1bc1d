use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::Mat3;

use crate::control::MotionDelta;

/// Clamp range for the vertical field of view, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VfovLimit {
    pub min: f64,
    pub max: f64,
}

impl VfovLimit {
    pub fn new(min: f64, max: f64) -> Self {
        // Tolerate swapped bounds from hand-edited settings
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn clamp(&self, fov: f64) -> f64 {
        fov.clamp(self.min, self.max)
    }
}

/// Rectilinear camera looking out from the centre of the sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct RectilinearView {
    /// Horizontal angle in (-π, π].
    pub yaw: f64,
    /// Vertical angle in [-π/2, π/2]; negative looks up.
    pub pitch: f64,
    /// Vertical field of view.
    pub fov: f64,
    limit: VfovLimit,
}

impl RectilinearView {
    pub fn new(fov: f64, limit: VfovLimit) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov: limit.clamp(fov),
            limit,
        }
    }

    /// Apply per-frame offsets from the controls, then normalize.
    pub fn apply(&mut self, delta: MotionDelta) {
        if delta.is_zero() {
            return;
        }
        self.yaw = wrap_angle(self.yaw + delta.x);
        self.pitch = (self.pitch + delta.y).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.fov = self.limit.clamp(self.fov + delta.zoom);
    }

    /// Camera-to-world rotation. Camera space looks down -Z with +Y up.
    pub fn rotation(&self) -> Mat3 {
        // Pitch is stored screen-style (positive looks down), so negate it for
        // a right-handed rotation about X.
        Mat3::from_rotation_y(-self.yaw as f32) * Mat3::from_rotation_x(-self.pitch as f32)
    }
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// World-space direction through the centre of the screen.
    fn forward(v: &RectilinearView) -> Vec3 {
        v.rotation() * Vec3::NEG_Z
    }

    fn view() -> RectilinearView {
        RectilinearView::new(FRAC_PI_2, VfovLimit::new(0.5, 2.0))
    }

    #[test]
    fn initial_fov_is_clamped() {
        let v = RectilinearView::new(3.0, VfovLimit::new(0.5, 2.0));
        assert_eq!(v.fov, 2.0);
    }

    #[test]
    fn swapped_limits_are_ordered() {
        let l = VfovLimit::new(2.0, 0.5);
        assert_eq!(l.min, 0.5);
        assert_eq!(l.max, 2.0);
    }

    #[test]
    fn yaw_wraps_around() {
        let mut v = view();
        v.apply(MotionDelta {
            x: PI + 0.5,
            ..Default::default()
        });
        assert!((v.yaw - (-PI + 0.5)).abs() < 1e-9);
        v.apply(MotionDelta {
            x: -TAU,
            ..Default::default()
        });
        assert!((v.yaw - (-PI + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn pitch_is_clamped_to_poles() {
        let mut v = view();
        v.apply(MotionDelta {
            y: 10.0,
            ..Default::default()
        });
        assert_eq!(v.pitch, FRAC_PI_2);
        v.apply(MotionDelta {
            y: -20.0,
            ..Default::default()
        });
        assert_eq!(v.pitch, -FRAC_PI_2);
    }

    #[test]
    fn zoom_respects_limit() {
        let mut v = view();
        v.apply(MotionDelta {
            zoom: -5.0,
            ..Default::default()
        });
        assert_eq!(v.fov, 0.5);
        v.apply(MotionDelta {
            zoom: 5.0,
            ..Default::default()
        });
        assert_eq!(v.fov, 2.0);
    }

    #[test]
    fn rotation_follows_yaw_and_pitch() {
        let mut v = view();
        assert!((forward(&v) - Vec3::NEG_Z).length() < 1e-5);

        v.yaw = FRAC_PI_2;
        assert!((forward(&v) - Vec3::X).length() < 1e-5);

        v.yaw = 0.0;
        v.pitch = -FRAC_PI_2;
        assert!((forward(&v) - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(3.0 * PI).abs() - PI).abs() < 1e-9);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-12);
    }
}
