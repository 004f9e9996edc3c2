//! Flight Rig
//!
//! Input and target-localization core for a simulated flight-control rig.
//!
//! - [`control`] turns pointer drags and key presses into pitch, roll,
//!   throttle and heading, with a held "stabilize" mode
//! - [`vision`] locates a colored circular target in a camera frame
//!   (enabled by the default `vision` feature)
//!
//! Window display, camera access and parameter files are reached through
//! small traits and helpers so the core stays testable without hardware.

pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod smoothing;

#[cfg(feature = "vision")]
pub mod vision;

// Re-export commonly used types
pub use config::{RigConfig, VisionSettings};
pub use control::{AttitudeController, ControllerOptions, InputEventLoop, KeyCode, PointerEvent};
pub use error::{Result, RigError};
pub use geometry::{Detection, Point};
pub use smoothing::RollingAverage;

#[cfg(feature = "vision")]
pub use vision::{detect_circle, TargetLocator};
