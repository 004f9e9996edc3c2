//! Blocking key loop with asynchronous pointer input
//!
//! Only one loop may be alive at a time: the host window that owns key focus
//! is a single shared resource, so a second construction fails fast.

use image::{Rgb, RgbImage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::attitude::{AttitudeController, ControlSnapshot};
use super::host::WindowHost;
use super::options::{ControllerOptions, KeyBindings};
use super::KeyCode;
use crate::{Result, RigError};

/// Width of the placeholder frame
pub const DEFAULT_IMAGE_WIDTH: u32 = 640;
/// Height of the placeholder frame
pub const DEFAULT_IMAGE_HEIGHT: u32 = 480;

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Controller shared between the key loop and the pointer callback
pub type SharedController = Arc<Mutex<AttitudeController>>;

/// Plain blue frame shown when no image has been supplied
pub fn default_image() -> RgbImage {
    RgbImage::from_pixel(
        DEFAULT_IMAGE_WIDTH,
        DEFAULT_IMAGE_HEIGHT,
        Rgb([0, 0, 255]),
    )
}

fn key_name(code: KeyCode) -> String {
    match code {
        32 => "SPACE".to_string(),
        33..=126 => (code as u8 as char).to_ascii_uppercase().to_string(),
        _ => format!("<{}>", code),
    }
}

/// Usage text for the given bindings
pub fn help(keys: &KeyBindings) -> String {
    let lines = [
        ("Hold left button and drag", "change pitch/roll".to_string()),
        ("Mouse wheel", "change sensitivity".to_string()),
        ("Throttle up", key_name(keys.throttle_up)),
        ("Throttle down", key_name(keys.throttle_down)),
        ("Steer left", key_name(keys.yaw_left)),
        ("Steer right", key_name(keys.yaw_right)),
        ("Hold still (stabilize)", key_name(keys.stabilize)),
        ("Sensitivity up", key_name(keys.sensitivity_up)),
        ("Sensitivity down", key_name(keys.sensitivity_down)),
    ];
    let mut out = String::from("Controls:\n");
    for (what, how) in lines {
        out.push_str(&format!("  {:<26} {}\n", what, how));
    }
    out
}

/// Pumps key events from a window host into an [`AttitudeController`]
pub struct InputEventLoop<H: WindowHost> {
    host: H,
    controller: SharedController,
}

impl<H: WindowHost> InputEventLoop<H> {
    /// Validate options, claim the window and register the pointer callback
    ///
    /// Shows `image`, or [`default_image`] when it is `None` or empty.
    pub fn new(host: H, image: Option<&RgbImage>, options: ControllerOptions) -> Result<Self> {
        let controller = AttitudeController::new(options)?;

        if ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RigError::MultipleControllers);
        }

        let mut this = Self {
            host,
            controller: Arc::new(Mutex::new(controller)),
        };

        let shared = this.controller.clone();
        this.host
            .set_pointer_callback(Box::new(move |event| shared.lock().handle_pointer(event)));

        match image {
            Some(img) if !is_empty(img) => this.host.show(img),
            _ => this.host.show(&default_image()),
        }

        log::info!("Input loop started");
        Ok(this)
    }

    /// Block for exactly one key press, apply it and return its code
    pub fn get_keystroke_once(&mut self) -> KeyCode {
        let key = self.host.wait_key();
        let action = self.controller.lock().apply_key(key);
        if action.is_none() {
            log::debug!("Key {} not bound", key);
        }
        key
    }

    /// Display a new frame; an empty image is rejected without side effects
    pub fn set_image(&mut self, image: &RgbImage) -> bool {
        if is_empty(image) {
            return false;
        }
        self.host.show(image);
        true
    }

    /// Shared handle to the controller
    pub fn controller(&self) -> SharedController {
        self.controller.clone()
    }

    pub fn get_multiplier(&self) -> i32 {
        self.controller.lock().get_multiplier()
    }

    pub fn get_pitch(&self) -> f64 {
        self.controller.lock().get_pitch()
    }

    pub fn get_roll(&self) -> f64 {
        self.controller.lock().get_roll()
    }

    pub fn get_throttle(&self) -> i32 {
        self.controller.lock().get_throttle()
    }

    pub fn get_heading(&self) -> i32 {
        self.controller.lock().get_heading()
    }

    /// Consistent read of all controller values under one lock
    pub fn snapshot(&self) -> ControlSnapshot {
        self.controller.lock().snapshot()
    }
}

impl<H: WindowHost> Drop for InputEventLoop<H> {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::SeqCst);
        log::info!("Input loop stopped");
    }
}

fn is_empty(image: &RgbImage) -> bool {
    image.width() == 0 || image.height() == 0
}
