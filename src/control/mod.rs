//! Mouse and keyboard attitude control
//!
//! - `AttitudeController` - pitch/roll from pointer drags, throttle/heading from keys
//! - `InputEventLoop` - blocking key pump with pointer events delivered by callback
//! - `WindowHost` - the window surface the loop drives
//!
//! # Example
//!
//! ```ignore
//! use flight_rig::control::{ControllerOptions, HeadlessHost, InputEventLoop};
//!
//! let mut input = InputEventLoop::new(HeadlessHost::new(), None, ControllerOptions::default())?;
//! loop {
//!     let key = input.get_keystroke_once();
//!     if key == 'q' as i32 {
//!         break;
//!     }
//!     println!("pitch={:.3} roll={:.3}", input.get_pitch(), input.get_roll());
//! }
//! ```

mod attitude;
mod event_loop;
mod host;
mod options;

/// Host-defined key code
pub type KeyCode = i32;

pub use attitude::{
    AttitudeController, ControlSnapshot, KeyAction, PointerEvent, ATTITUDE_LIMIT,
    ATT_MULT_DEFAULT,
};
pub use event_loop::{default_image, help, InputEventLoop, SharedController};
pub use host::{HeadlessHandle, HeadlessHost, PointerCallback, WindowHost};
pub use options::{ControllerOptions, KeyBindings, MAX_MULTIPLIER};
