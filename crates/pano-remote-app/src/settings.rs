use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::media::readiness::GateOptions;
use crate::media::types::VideoConfig;
use crate::pano::view::VfovLimit;

/// Viewer configuration (~/.config/pano-remote/settings.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_velocity")]
    pub velocity: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default = "default_fov_deg")]
    pub initial_fov_deg: f64,
    #[serde(default = "default_min_vfov_deg")]
    pub min_vfov_deg: f64,
    #[serde(default = "default_max_vfov_deg")]
    pub max_vfov_deg: f64,
    #[serde(default)]
    pub continue_after_play_failure: bool,
    #[serde(default)]
    pub fullscreen: bool,
}

/// Bounds for any vertical fov; at 180° the projection degenerates.
const MIN_VFOV_DEG: f64 = 1.0;
const MAX_VFOV_DEG: f64 = 179.0;

fn default_version() -> u32 {
    1
}
fn default_video_path() -> PathBuf {
    PathBuf::from("images/mercedes-f1-1280x640.mp4")
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_velocity() -> f64 {
    0.7
}
fn default_friction() -> f64 {
    3.0
}
fn default_fov_deg() -> f64 {
    90.0
}
fn default_min_vfov_deg() -> f64 {
    30.0
}
fn default_max_vfov_deg() -> f64 {
    120.0
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            video_path: default_video_path(),
            poll_interval_ms: default_poll_interval_ms(),
            velocity: default_velocity(),
            friction: default_friction(),
            initial_fov_deg: default_fov_deg(),
            min_vfov_deg: default_min_vfov_deg(),
            max_vfov_deg: default_max_vfov_deg(),
            continue_after_play_failure: false,
            fullscreen: false,
        }
    }
}

impl ViewerSettings {
    /// Path to the settings file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pano-remote").join("settings.json"))
    }

    /// Load settings, writing a template on first run. Falls back to
    /// defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::info!("No config directory, using default settings");
            return Self::default();
        };
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(&path);
            return settings;
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings: {e}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No settings found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create config dir: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::error!("Failed to write settings: {e}");
                } else {
                    log::info!("Wrote default settings to {}", path.display());
                }
            }
            Err(e) => log::error!("Failed to serialize settings: {e}"),
        }
    }

    pub fn video_config(&self) -> VideoConfig {
        VideoConfig::panorama(&self.video_path)
    }

    pub fn gate_options(&self) -> GateOptions {
        GateOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            continue_after_play_failure: self.continue_after_play_failure,
        }
    }

    /// Pan/zoom speed in radians per second. Non-positive values fall back
    /// to the default.
    pub fn velocity(&self) -> f64 {
        positive_or_default("velocity", self.velocity, default_velocity())
    }

    /// Deceleration after release. Must be positive or a single tap would
    /// never come to rest.
    pub fn friction(&self) -> f64 {
        positive_or_default("friction", self.friction, default_friction())
    }

    pub fn initial_fov(&self) -> f64 {
        vfov_deg("initial_fov_deg", self.initial_fov_deg, default_fov_deg()).to_radians()
    }

    pub fn vfov_limit(&self) -> VfovLimit {
        VfovLimit::new(
            vfov_deg("min_vfov_deg", self.min_vfov_deg, default_min_vfov_deg()).to_radians(),
            vfov_deg("max_vfov_deg", self.max_vfov_deg, default_max_vfov_deg()).to_radians(),
        )
    }
}

fn positive_or_default(name: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("Invalid {name} {value}, using {default}");
        default
    }
}

fn vfov_deg(name: &str, value: f64, default: f64) -> f64 {
    if !value.is_finite() {
        log::warn!("Invalid {name} {value}, using {default}");
        return default;
    }
    let clamped = value.clamp(MIN_VFOV_DEG, MAX_VFOV_DEG);
    if clamped != value {
        log::warn!("{name} {value} out of range, clamped to {clamped}");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::control::Controls;
    use crate::control::bindings::{ControlBindings, Direction};
    use crate::pano::view::RectilinearView;

    #[test]
    fn defaults() {
        let s = ViewerSettings::default();
        assert_eq!(s.poll_interval_ms, 100);
        assert!((s.velocity - 0.7).abs() < 1e-12);
        assert!((s.friction - 3.0).abs() < 1e-12);
        assert!(!s.continue_after_play_failure);
        assert_eq!(
            s.video_path,
            PathBuf::from("images/mercedes-f1-1280x640.mp4")
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: ViewerSettings =
            serde_json::from_str(r#"{"velocity": 1.5, "video_path": "pano.mp4"}"#).unwrap();
        assert!((s.velocity - 1.5).abs() < 1e-12);
        assert_eq!(s.video_path, PathBuf::from("pano.mp4"));
        assert_eq!(s.poll_interval_ms, 100);
        assert!((s.friction - 3.0).abs() < 1e-12);
    }

    #[test]
    fn save_then_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = ViewerSettings::default();
        s.fullscreen = true;
        s.min_vfov_deg = 45.0;
        s.save_to(&path);
        assert_eq!(ViewerSettings::load_from(&path), s);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(ViewerSettings::load_from(&path), ViewerSettings::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(ViewerSettings::load_from(&path), ViewerSettings::default());
    }

    #[test]
    fn non_positive_motion_settings_fall_back() {
        let s: ViewerSettings =
            serde_json::from_str(r#"{"velocity": -1.0, "friction": 0.0}"#).unwrap();
        assert!((s.velocity() - 0.7).abs() < 1e-12);
        assert!((s.friction() - 3.0).abs() < 1e-12);

        let s: ViewerSettings =
            serde_json::from_str(r#"{"velocity": 2.0, "friction": 0.5}"#).unwrap();
        assert!((s.velocity() - 2.0).abs() < 1e-12);
        assert!((s.friction() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_friction_tap_comes_to_rest() {
        let s: ViewerSettings = serde_json::from_str(r#"{"friction": 0.0}"#).unwrap();
        let mut controls = Controls::new();
        let mut bindings =
            ControlBindings::register(&mut controls, s.velocity(), s.friction()).unwrap();
        bindings.pulse(Direction::Right);

        let mut yaw = 0.0;
        for _ in 0..600 {
            yaw += controls.step(1.0 / 60.0).x;
        }
        assert!((yaw - 0.7 * 0.7 / 6.0).abs() < 1e-6);
        assert!(controls.step(1.0).is_zero());
    }

    #[test]
    fn vfov_stays_inside_half_turn() {
        let s: ViewerSettings = serde_json::from_str(
            r#"{"min_vfov_deg": -10, "max_vfov_deg": 200, "initial_fov_deg": 190}"#,
        )
        .unwrap();
        let limit = s.vfov_limit();
        assert!((limit.min - 1f64.to_radians()).abs() < 1e-12);
        assert!((limit.max - 179f64.to_radians()).abs() < 1e-12);

        let view = RectilinearView::new(s.initial_fov(), limit);
        assert!(view.fov < PI);
        assert!((view.fov * 0.5).tan() > 0.0);
    }

    #[test]
    fn derived_options() {
        let mut s = ViewerSettings::default();
        s.poll_interval_ms = 0;
        s.continue_after_play_failure = true;
        let opts = s.gate_options();
        assert_eq!(opts.poll_interval, Duration::from_millis(1));
        assert!(opts.continue_after_play_failure);

        let limit = s.vfov_limit();
        assert!((limit.min - 30f64.to_radians()).abs() < 1e-12);
        assert!((limit.max - 120f64.to_radians()).abs() < 1e-12);
        assert!(s.video_config().looping);
    }
}
