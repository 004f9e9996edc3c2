//! Window host abstraction
//!
//! The host owns the on-screen window: it displays frames, blocks for key
//! presses, and delivers pointer events through a callback registered once.
//! [`HeadlessHost`] is an in-memory host for tests and non-graphical runs;
//! its [`HeadlessHandle`] plays the part of the windowing system's event
//! thread.

use image::RgbImage;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

use super::attitude::PointerEvent;
use super::KeyCode;

/// Callback the host invokes for every pointer event
pub type PointerCallback = Box<dyn FnMut(PointerEvent) + Send>;

/// The windowing surface an input loop drives
pub trait WindowHost: Send {
    /// Display a frame in the window
    fn show(&mut self, image: &RgbImage);

    /// Block until one key press arrives and return its code
    fn wait_key(&mut self) -> KeyCode;

    /// Register the pointer callback; replaces any previous one
    fn set_pointer_callback(&mut self, callback: PointerCallback);
}

struct HeadlessInner {
    keys: Mutex<VecDeque<KeyCode>>,
    key_ready: Condvar,
    callback: Mutex<Option<PointerCallback>>,
    shown: Mutex<Option<RgbImage>>,
    show_count: Mutex<usize>,
}

/// In-memory window host
pub struct HeadlessHost {
    inner: Arc<HeadlessInner>,
}

/// Injects input into a [`HeadlessHost`] and inspects what it displayed
#[derive(Clone)]
pub struct HeadlessHandle {
    inner: Arc<HeadlessInner>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HeadlessInner {
                keys: Mutex::new(VecDeque::new()),
                key_ready: Condvar::new(),
                callback: Mutex::new(None),
                shown: Mutex::new(None),
                show_count: Mutex::new(0),
            }),
        }
    }

    /// Get a handle for injecting events from another thread
    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            inner: self.inner.clone(),
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHost for HeadlessHost {
    fn show(&mut self, image: &RgbImage) {
        *self.inner.shown.lock() = Some(image.clone());
        *self.inner.show_count.lock() += 1;
    }

    fn wait_key(&mut self) -> KeyCode {
        let mut keys = self.inner.keys.lock();
        loop {
            if let Some(key) = keys.pop_front() {
                return key;
            }
            self.inner.key_ready.wait(&mut keys);
        }
    }

    fn set_pointer_callback(&mut self, callback: PointerCallback) {
        *self.inner.callback.lock() = Some(callback);
    }
}

impl HeadlessHandle {
    /// Queue a key press and wake a blocked `wait_key`
    pub fn press_key(&self, key: KeyCode) {
        self.inner.keys.lock().push_back(key);
        self.inner.key_ready.notify_one();
    }

    /// Deliver a pointer event; returns false when no callback is registered
    ///
    /// The callback runs to completion before this returns.
    pub fn pointer(&self, event: PointerEvent) -> bool {
        match self.inner.callback.lock().as_mut() {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }

    /// Last frame displayed
    pub fn last_shown(&self) -> Option<RgbImage> {
        self.inner.shown.lock().clone()
    }

    /// Number of frames displayed so far
    pub fn show_count(&self) -> usize {
        *self.inner.show_count.lock()
    }

    /// Keys queued but not yet consumed
    pub fn pending_keys(&self) -> usize {
        self.inner.keys.lock().len()
    }
}
