//! Attitude and throttle state machine
//!
//! Pointer drags set pitch/roll relative to the point where the button went
//! down, discrete keys step throttle and heading, and the stabilize key pulls
//! pitch, roll and throttle toward fixed setpoints a bounded step at a time.

use serde::{Deserialize, Serialize};

use super::options::{ControllerOptions, MAX_MULTIPLIER};
use super::KeyCode;
use crate::geometry::Point;
use crate::Result;

/// Attitude change per pixel for a multiplier of 1, in radians
pub const ATT_MULT_DEFAULT: f64 = 0.0001;

/// Pitch and roll never leave `[-ATTITUDE_LIMIT, ATTITUDE_LIMIT]`
pub const ATTITUDE_LIMIT: f64 = std::f64::consts::FRAC_PI_2;

/// Decoded pointer input from the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Primary button went down
    Press(Point),
    /// Pointer moved (with or without a button held)
    Move(Point),
    /// Primary button went up
    Release,
    /// Wheel notches; positive raises sensitivity
    Wheel(i32),
}

/// What a recognized key did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    ThrottleUp,
    ThrottleDown,
    YawLeft,
    YawRight,
    Stabilize,
    SensitivityUp,
    SensitivityDown,
}

impl std::fmt::Display for KeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyAction::ThrottleUp => write!(f, "throttle up"),
            KeyAction::ThrottleDown => write!(f, "throttle down"),
            KeyAction::YawLeft => write!(f, "steer left"),
            KeyAction::YawRight => write!(f, "steer right"),
            KeyAction::Stabilize => write!(f, "stabilize"),
            KeyAction::SensitivityUp => write!(f, "sensitivity up"),
            KeyAction::SensitivityDown => write!(f, "sensitivity down"),
        }
    }
}

/// Serializable read-out of the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub pitch: f64,
    pub roll: f64,
    pub throttle: i32,
    pub heading: i32,
    pub multiplier: i32,
    pub dragging: bool,
}

impl ControlSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reference frame of an active drag
#[derive(Debug, Clone, Copy)]
struct Drag {
    anchor: Point,
    last: Point,
    pitch0: f64,
    roll0: f64,
}

/// Mouse/keyboard driven attitude controller
#[derive(Debug, Clone)]
pub struct AttitudeController {
    options: ControllerOptions,
    /// Target pitch in radians, positive nose up
    pitch: f64,
    /// Target roll in radians, positive right wing down
    roll: f64,
    pitch_rate: f64,
    roll_rate: f64,
    /// Attitude change multiplier (sensitivity)
    mult: i32,
    drag: Option<Drag>,
    /// 0-100
    throttle: i32,
    /// Degrees in [0, 360), North 0, East 90
    heading: i32,
}

impl AttitudeController {
    /// Create a controller from validated options
    pub fn new(options: ControllerOptions) -> Result<Self> {
        options.validate()?;

        let mult = options.multiplier;
        Ok(Self {
            pitch: 0.0,
            roll: 0.0,
            pitch_rate: mult as f64 * ATT_MULT_DEFAULT,
            roll_rate: mult as f64 * ATT_MULT_DEFAULT,
            mult,
            drag: None,
            throttle: 0,
            heading: 0,
            options,
        })
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Dispatch a decoded pointer event
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press(p) => self.press(p),
            PointerEvent::Move(p) => self.move_to(p),
            PointerEvent::Release => self.release(),
            PointerEvent::Wheel(notches) => self.change_sensitivity(notches),
        }
    }

    /// Start a drag at `p`
    pub fn press(&mut self, p: Point) {
        self.drag = Some(Drag {
            anchor: p,
            last: p,
            pitch0: self.pitch,
            roll0: self.roll,
        });
        log::debug!("Drag started at {}", p);
    }

    /// Update pitch/roll from the pointer position; ignored unless dragging
    pub fn move_to(&mut self, p: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.last = p;
        let delta = p - drag.anchor;
        // screen y grows downward, so dragging up pitches up
        self.pitch = clamp_attitude(drag.pitch0 - delta.y as f64 * self.pitch_rate);
        self.roll = clamp_attitude(drag.roll0 + delta.x as f64 * self.roll_rate);
    }

    /// End the drag, keeping the last pitch/roll
    pub fn release(&mut self) {
        if self.drag.take().is_some() {
            log::debug!(
                "Drag released at pitch={:.4} roll={:.4}",
                self.pitch,
                self.roll
            );
        }
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current drag anchor, if dragging
    pub fn anchor(&self) -> Option<Point> {
        self.drag.map(|d| d.anchor)
    }

    // =========================================================================
    // Sensitivity
    // =========================================================================

    /// Adjust the multiplier by `diff`, clamped to `[1, MAX_MULTIPLIER]`
    pub fn change_sensitivity(&mut self, diff: i32) {
        let mult = self.mult.saturating_add(diff).clamp(1, MAX_MULTIPLIER);
        if mult == self.mult {
            return;
        }
        self.mult = mult;
        self.pitch_rate = mult as f64 * ATT_MULT_DEFAULT;
        self.roll_rate = mult as f64 * ATT_MULT_DEFAULT;
        self.rebase_drag();
        log::debug!("Multiplier set to {}", mult);
    }

    /// Restart the drag reference from the current values so later moves
    /// only add to what is already held
    fn rebase_drag(&mut self) {
        if let Some(drag) = self.drag.as_mut() {
            drag.anchor = drag.last;
            drag.pitch0 = self.pitch;
            drag.roll0 = self.roll;
        }
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Map a key code to its action under the configured bindings
    pub fn key_action(&self, key: KeyCode) -> Option<KeyAction> {
        let keys = &self.options.keys;
        if key == keys.throttle_up {
            Some(KeyAction::ThrottleUp)
        } else if key == keys.throttle_down {
            Some(KeyAction::ThrottleDown)
        } else if key == keys.yaw_left {
            Some(KeyAction::YawLeft)
        } else if key == keys.yaw_right {
            Some(KeyAction::YawRight)
        } else if key == keys.stabilize {
            Some(KeyAction::Stabilize)
        } else if key == keys.sensitivity_up {
            Some(KeyAction::SensitivityUp)
        } else if key == keys.sensitivity_down {
            Some(KeyAction::SensitivityDown)
        } else {
            None
        }
    }

    /// Apply one key press; unknown keys leave the state untouched
    pub fn apply_key(&mut self, key: KeyCode) -> Option<KeyAction> {
        let action = self.key_action(key)?;
        match action {
            KeyAction::ThrottleUp => self.step_throttle(self.options.thr_coeff),
            KeyAction::ThrottleDown => self.step_throttle(-self.options.thr_coeff),
            KeyAction::YawLeft => self.step_heading(-self.options.yaw_coeff),
            KeyAction::YawRight => self.step_heading(self.options.yaw_coeff),
            KeyAction::Stabilize => self.stabilize_tick(),
            KeyAction::SensitivityUp => self.change_sensitivity(1),
            KeyAction::SensitivityDown => self.change_sensitivity(-1),
        }
        log::debug!(
            "Key {} ({}): throttle={} heading={}",
            key,
            action,
            self.throttle,
            self.heading
        );
        Some(action)
    }

    fn step_throttle(&mut self, diff: i32) {
        self.throttle = (self.throttle + diff).clamp(0, 100);
    }

    fn step_heading(&mut self, diff: i32) {
        self.heading = (self.heading + diff).rem_euclid(360);
    }

    /// One tick of the held stabilize key
    pub fn stabilize_tick(&mut self) {
        let opt = &self.options;
        let throttle_step = opt.thr_coeff + opt.speedup;
        self.throttle = step_toward_i32(self.throttle, opt.throttle_stable, throttle_step);

        let speedup = opt.speedup as f64;
        self.pitch = step_toward(self.pitch, opt.pitch_stable, speedup * self.pitch_rate);
        self.roll = step_toward(self.roll, opt.roll_stable, speedup * self.roll_rate);
        self.rebase_drag();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Attitude change multiplier (sensitivity)
    pub fn get_multiplier(&self) -> i32 {
        self.mult
    }

    /// Target pitch in radians
    pub fn get_pitch(&self) -> f64 {
        self.pitch
    }

    /// Target roll in radians
    pub fn get_roll(&self) -> f64 {
        self.roll
    }

    pub fn get_throttle(&self) -> i32 {
        self.throttle
    }

    pub fn get_heading(&self) -> i32 {
        self.heading
    }

    /// Overwrite throttle and heading, normalizing into their ranges
    pub fn set_throttle_heading(&mut self, throttle: i32, heading: i32) {
        self.throttle = throttle.clamp(0, 100);
        self.heading = heading.rem_euclid(360);
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            pitch: self.pitch,
            roll: self.roll,
            throttle: self.throttle,
            heading: self.heading,
            multiplier: self.mult,
            dragging: self.is_dragging(),
        }
    }
}

fn clamp_attitude(value: f64) -> f64 {
    value.clamp(-ATTITUDE_LIMIT, ATTITUDE_LIMIT)
}

fn step_toward(value: f64, target: f64, step: f64) -> f64 {
    let diff = target - value;
    if diff.abs() <= step {
        target
    } else {
        value + step.copysign(diff)
    }
}

fn step_toward_i32(value: i32, target: i32, step: i32) -> i32 {
    let diff = target - value;
    if diff.abs() <= step {
        target
    } else {
        value + step * diff.signum()
    }
}
