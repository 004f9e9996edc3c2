//! Controller options and key bindings

use serde::{Deserialize, Serialize};

use super::attitude::ATTITUDE_LIMIT;
use super::KeyCode;
use crate::{Result, RigError};

/// Upper bound for the attitude multiplier (sensitivity)
pub const MAX_MULTIPLIER: i32 = 1000;

/// Key codes the controller reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub throttle_up: KeyCode,
    pub throttle_down: KeyCode,
    pub yaw_left: KeyCode,
    pub yaw_right: KeyCode,
    /// Held to converge toward the stable stance
    pub stabilize: KeyCode,
    pub sensitivity_up: KeyCode,
    pub sensitivity_down: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            throttle_up: 'w' as KeyCode,
            throttle_down: 's' as KeyCode,
            yaw_left: 'a' as KeyCode,
            yaw_right: 'd' as KeyCode,
            stabilize: ' ' as KeyCode,
            sensitivity_up: '+' as KeyCode,
            sensitivity_down: '-' as KeyCode,
        }
    }
}

impl KeyBindings {
    fn codes(&self) -> [KeyCode; 7] {
        [
            self.throttle_up,
            self.throttle_down,
            self.yaw_left,
            self.yaw_right,
            self.stabilize,
            self.sensitivity_up,
            self.sensitivity_down,
        ]
    }
}

/// Construction options for the attitude controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Roll-pitch sensitivity
    pub multiplier: i32,
    /// Throttle change per key press
    pub thr_coeff: i32,
    /// Heading change per key press, in degrees
    pub yaw_coeff: i32,
    /// Extra step applied per tick while stabilize is held
    pub speedup: i32,
    /// Throttle for a stable stance (0-100)
    pub throttle_stable: i32,
    /// Pitch for a stable stance, in radians
    pub pitch_stable: f64,
    /// Roll for a stable stance, in radians
    pub roll_stable: f64,
    pub keys: KeyBindings,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            multiplier: 10,
            thr_coeff: 5,
            yaw_coeff: 10,
            speedup: 25,
            throttle_stable: 50,
            pitch_stable: 0.0,
            roll_stable: 0.0,
            keys: KeyBindings::default(),
        }
    }
}

impl ControllerOptions {
    /// Check whether every option lies within its documented range
    pub fn check(&self) -> bool {
        self.validate().is_ok()
    }

    /// Like [`check`](Self::check) but names the first offending field
    pub fn validate(&self) -> Result<()> {
        fn in_range(name: &str, value: i32, lo: i32, hi: i32) -> Result<()> {
            if (lo..=hi).contains(&value) {
                Ok(())
            } else {
                Err(RigError::InvalidOptions(format!(
                    "{} = {} is outside [{}, {}]",
                    name, value, lo, hi
                )))
            }
        }

        in_range("multiplier", self.multiplier, 1, MAX_MULTIPLIER)?;
        in_range("thr_coeff", self.thr_coeff, 1, 100)?;
        in_range("yaw_coeff", self.yaw_coeff, 1, 359)?;
        in_range("speedup", self.speedup, 1, 100)?;
        in_range("throttle_stable", self.throttle_stable, 0, 100)?;

        for (name, value) in [
            ("pitch_stable", self.pitch_stable),
            ("roll_stable", self.roll_stable),
        ] {
            if !value.is_finite() || value.abs() > ATTITUDE_LIMIT {
                return Err(RigError::InvalidOptions(format!(
                    "{} = {} is outside [-{:.4}, {:.4}]",
                    name, value, ATTITUDE_LIMIT, ATTITUDE_LIMIT
                )));
            }
        }

        let codes = self.keys.codes();
        for (i, code) in codes.iter().enumerate() {
            if codes[i + 1..].contains(code) {
                return Err(RigError::InvalidOptions(format!(
                    "key code {} is bound more than once",
                    code
                )));
            }
        }

        Ok(())
    }
}
