//! Rig configuration
//!
//! Loaded from a TOML file; every field has a default, so a partial file or
//! an empty one is valid.
//!
//! ```toml
//! [controller]
//! multiplier = 10
//! thr_coeff = 5
//! throttle_stable = 50
//!
//! [controller.keys]
//! stabilize = 32
//!
//! [vision]
//! param_path = "params.txt"
//! smoothing_window = 5
//!
//! [vision.circle]
//! min_radius = 10
//! max_radius = 80
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::control::ControllerOptions;
use crate::{Result, RigError};

fn default_smoothing_window() -> usize {
    5
}

fn default_capture_interval() -> u64 {
    33 // ~30 FPS
}

/// Circle search settings as stored in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleSettings {
    pub min_radius: u32,
    pub max_radius: u32,
    pub param1: u32,
    pub param2: u32,
}

impl Default for CircleSettings {
    fn default() -> Self {
        Self {
            min_radius: 0,
            max_radius: 0,
            param1: 100,
            param2: 100,
        }
    }
}

#[cfg(feature = "vision")]
impl From<CircleSettings> for crate::vision::CircleParams {
    fn from(s: CircleSettings) -> Self {
        Self {
            min_radius: s.min_radius,
            max_radius: s.max_radius,
            param1: s.param1,
            param2: s.param2,
        }
    }
}

/// Settings for the detection side of the rig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionSettings {
    /// Color parameter file for the color pipeline
    #[serde(default)]
    pub param_path: Option<PathBuf>,
    /// Frames averaged by the tracker
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// Pause between captured frames in milliseconds
    #[serde(default = "default_capture_interval")]
    pub capture_interval_ms: u64,
    #[serde(default)]
    pub circle: CircleSettings,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            param_path: None,
            smoothing_window: default_smoothing_window(),
            capture_interval_ms: default_capture_interval(),
            circle: CircleSettings::default(),
        }
    }
}

impl VisionSettings {
    /// Pause between grabs for a capture worker
    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms)
    }

    /// Circle detector configured from `[vision.circle]`
    #[cfg(feature = "vision")]
    pub fn circle_detector(&self) -> crate::vision::CircleDetector {
        crate::vision::CircleDetector::new(self.circle.into())
    }

    /// Run `grabber` on a worker paced by `capture_interval_ms`
    #[cfg(feature = "vision")]
    pub fn capture<G: crate::vision::FrameGrabber>(
        &self,
        grabber: G,
    ) -> crate::vision::ThreadedCapture<G> {
        crate::vision::ThreadedCapture::new(grabber).with_interval(self.capture_interval())
    }
}

/// Complete rig configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    #[serde(default)]
    pub controller: ControllerOptions,
    #[serde(default)]
    pub vision: VisionSettings,
}

impl RigConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RigError::from_io(path, e))?;
        let mut config = Self::from_toml(&content)?;

        // relative parameter paths are relative to the config file
        if let (Some(param), Some(dir)) = (config.vision.param_path.as_mut(), path.parent()) {
            if param.is_relative() {
                *param = dir.join(&*param);
            }
        }

        log::info!("Loaded rig config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RigConfig =
            toml::from_str(content).map_err(|e| RigError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        if self.vision.smoothing_window == 0 {
            return Err(RigError::Config(
                "vision.smoothing_window must be positive".to_string(),
            ));
        }
        let circle = &self.vision.circle;
        if circle.max_radius != 0 && circle.max_radius < circle.min_radius {
            return Err(RigError::InvalidRadiusRange {
                min: circle.min_radius,
                max: circle.max_radius,
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RigError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RigConfig::from_toml("").unwrap();
        assert_eq!(config, RigConfig::default());
        assert_eq!(config.controller.multiplier, 10);
        assert_eq!(config.vision.smoothing_window, 5);
        assert_eq!(config.vision.circle.param1, 100);
    }

    #[test]
    fn test_partial_config() {
        let config = RigConfig::from_toml(
            r#"
            [controller]
            thr_coeff = 2

            [vision]
            param_path = "red.txt"

            [vision.circle]
            min_radius = 10
            max_radius = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.controller.thr_coeff, 2);
        assert_eq!(config.controller.yaw_coeff, 10);
        assert_eq!(config.vision.param_path, Some(PathBuf::from("red.txt")));
        assert_eq!(config.vision.circle.max_radius, 80);
        assert_eq!(config.vision.circle.param2, 100);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = RigConfig::from_toml("[controller]\nthrottle_stable = 150\n").unwrap_err();
        assert!(matches!(err, RigError::InvalidOptions(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = RigConfig::from_toml("[controller\nmultiplier = ").unwrap_err();
        assert!(matches!(err, RigError::Config(_)));
    }

    #[test]
    fn test_inverted_circle_range() {
        let err = RigConfig::from_toml("[vision.circle]\nmin_radius = 50\nmax_radius = 5\n")
            .unwrap_err();
        assert!(matches!(err, RigError::InvalidRadiusRange { .. }));
    }

    #[test]
    fn test_round_trip() {
        let mut config = RigConfig::default();
        config.controller.speedup = 40;
        config.vision.param_path = Some(PathBuf::from("p.txt"));
        let text = config.to_toml().unwrap();
        assert_eq!(RigConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_vision_settings_drive_components() {
        let config = RigConfig::from_toml(
            "[vision]\ncapture_interval_ms = 5\n\n[vision.circle]\nmin_radius = 4\nmax_radius = 40\nparam2 = 12\n",
        )
        .unwrap();
        assert_eq!(config.vision.capture_interval(), Duration::from_millis(5));

        #[cfg(feature = "vision")]
        {
            let detector = config.vision.circle_detector();
            let params = detector.params();
            assert_eq!((params.min_radius, params.max_radius), (4, 40));
            assert_eq!((params.param1, params.param2), (100, 12));
        }
    }

    #[cfg(feature = "vision")]
    #[test]
    fn test_capture_paced_from_config() {
        use crate::vision::FrameSource;
        use image::{Rgb, RgbImage};

        let mut settings = VisionSettings::default();
        settings.capture_interval_ms = 1;
        let mut capture = settings.capture(|| -> Result<RgbImage> {
            Ok(RgbImage::from_pixel(2, 2, Rgb([9, 9, 9])))
        });
        capture.start().unwrap();
        let frame = capture.wait_for_frame(Duration::from_secs(5)).unwrap();
        assert_eq!(frame.get_pixel(0, 0)[0], 9);
        capture.stop();
    }

    #[test]
    fn test_missing_file() {
        let err = RigConfig::load("/nonexistent/flight-rig.toml").unwrap_err();
        assert!(matches!(err, RigError::FileNotFound(_)));
    }
}
