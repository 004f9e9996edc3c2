//! Frame acquisition
//!
//! A [`FrameGrabber`] produces frames on demand. [`ThreadedCapture`] runs a
//! grabber on its own thread and keeps the most recent frame available, so
//! the control loop can always take the latest frame without waiting for
//! the camera.

use image::RgbImage;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{Result, RigError};

/// Default pause between grabs
pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(33);

/// File extensions picked up by [`DirectoryGrabber`]
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Produces frames on demand
pub trait FrameGrabber: Send + 'static {
    /// Grab the next frame
    fn grab(&mut self) -> Result<RgbImage>;
}

impl<F> FrameGrabber for F
where
    F: FnMut() -> Result<RgbImage> + Send + 'static,
{
    fn grab(&mut self) -> Result<RgbImage> {
        self()
    }
}

/// Latest-frame capability with an explicit lifecycle
pub trait FrameSource {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    /// Most recent frame, without blocking on acquisition
    fn latest_frame(&self) -> Option<Arc<RgbImage>>;
}

/// Runs a [`FrameGrabber`] on a worker thread
pub struct ThreadedCapture<G: FrameGrabber> {
    /// Present while stopped; moved into the worker while running
    grabber: Option<G>,
    worker: Option<JoinHandle<G>>,
    running: Arc<AtomicBool>,
    latest: Arc<RwLock<Option<Arc<RgbImage>>>>,
    frame_count: Arc<AtomicU64>,
    interval: Duration,
}

impl<G: FrameGrabber> ThreadedCapture<G> {
    pub fn new(grabber: G) -> Self {
        Self {
            grabber: Some(grabber),
            worker: None,
            running: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(RwLock::new(None)),
            frame_count: Arc::new(AtomicU64::new(0)),
            interval: DEFAULT_CAPTURE_INTERVAL,
        }
    }

    /// Set the pause between grabs
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Whether the worker is still grabbing
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Frames captured since construction
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout` for the first frame to arrive
    pub fn wait_for_frame(&self, timeout: Duration) -> Option<Arc<RgbImage>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(frame) = self.latest_frame() {
                return Some(frame);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Join a worker that stopped on its own so it can be restarted
    fn reclaim(&mut self) {
        if let Some(handle) = self.worker.take() {
            match handle.join() {
                Ok(grabber) => self.grabber = Some(grabber),
                Err(_) => log::error!("Capture worker panicked"),
            }
        }
    }
}

impl<G: FrameGrabber> FrameSource for ThreadedCapture<G> {
    fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(RigError::AlreadyRunning);
        }
        self.reclaim();
        let mut grabber = self
            .grabber
            .take()
            .ok_or_else(|| RigError::Capture("frame grabber was lost".to_string()))?;

        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let latest = self.latest.clone();
        let frame_count = self.frame_count.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("frame-capture".to_string())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    match grabber.grab() {
                        Ok(frame) => {
                            *latest.write() = Some(Arc::new(frame));
                            frame_count.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => {
                            log::warn!("Capture stopped: {}", e);
                            running.store(false, Ordering::SeqCst);
                            break;
                        }
                    }
                    thread::sleep(interval);
                }
                grabber
            });

        match handle {
            Ok(handle) => {
                self.worker = Some(handle);
                log::info!("Frame capture started");
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(RigError::Io(e))
            }
        }
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if self.worker.is_some() {
            self.reclaim();
            log::info!("Frame capture stopped after {} frames", self.frame_count());
        }
    }

    fn latest_frame(&self) -> Option<Arc<RgbImage>> {
        self.latest.read().clone()
    }
}

impl<G: FrameGrabber> Drop for ThreadedCapture<G> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Replays the image files of a directory in name order
#[derive(Debug)]
pub struct DirectoryGrabber {
    frames: Vec<PathBuf>,
    index: usize,
    loop_playback: bool,
}

impl DirectoryGrabber {
    pub fn open(dir: impl AsRef<Path>, loop_playback: bool) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| RigError::from_io(dir, e))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(RigError::Capture(format!(
                "no image files in {}",
                dir.display()
            )));
        }

        log::info!("Found {} frames in {}", frames.len(), dir.display());
        Ok(Self {
            frames,
            index: 0,
            loop_playback,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameGrabber for DirectoryGrabber {
    fn grab(&mut self) -> Result<RgbImage> {
        if self.index >= self.frames.len() {
            if !self.loop_playback {
                return Err(RigError::Capture("end of frame sequence".to_string()));
            }
            self.index = 0;
        }

        let path = &self.frames[self.index];
        self.index += 1;
        let frame = image::open(path)
            .map_err(|e| RigError::Capture(format!("{}: {}", path.display(), e)))?;
        Ok(frame.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(v: u8) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([v, v, v]))
    }

    #[test]
    fn test_latest_frame_before_start() {
        let capture = ThreadedCapture::new(|| -> Result<RgbImage> { Ok(solid(1)) });
        assert!(capture.latest_frame().is_none());
        assert!(!capture.is_running());
    }

    #[test]
    fn test_latest_frame_advances() {
        let mut n = 0u8;
        let mut capture = ThreadedCapture::new(move || -> Result<RgbImage> {
            n = n.wrapping_add(1);
            Ok(solid(n))
        })
        .with_interval(Duration::from_millis(1));

        capture.start().unwrap();
        assert!(matches!(capture.start(), Err(RigError::AlreadyRunning)));
        let first = capture.wait_for_frame(Duration::from_secs(5)).unwrap();
        assert!(first.get_pixel(0, 0)[0] >= 1);

        let deadline = Instant::now() + Duration::from_secs(5);
        while capture.frame_count() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(capture.frame_count() >= 3);

        capture.stop();
        assert!(!capture.is_running());
        let count = capture.frame_count();
        thread::sleep(Duration::from_millis(10));
        assert_eq!(capture.frame_count(), count);
        assert!(capture.latest_frame().is_some());
    }

    #[test]
    fn test_grab_error_stops_worker() {
        let mut calls = 0;
        let mut capture = ThreadedCapture::new(move || -> Result<RgbImage> {
            calls += 1;
            if calls > 1 {
                Err(RigError::Capture("camera unplugged".to_string()))
            } else {
                Ok(solid(7))
            }
        })
        .with_interval(Duration::from_millis(1));

        capture.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while capture.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!capture.is_running());
        // last good frame stays available
        assert_eq!(capture.latest_frame().unwrap().get_pixel(0, 0)[0], 7);

        // can be restarted after the worker ended
        capture.start().unwrap();
        capture.stop();
    }

    #[test]
    fn test_missing_directory() {
        let err = DirectoryGrabber::open("/nonexistent/flight-rig-frames", false).unwrap_err();
        assert!(matches!(err, RigError::FileNotFound(_)));
    }

    fn frame_dir() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        // written out of order; playback follows file names
        solid(2).save(dir.path().join("frame_b.png")).unwrap();
        solid(1).save(dir.path().join("frame_a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();
        dir
    }

    #[test]
    fn test_directory_plays_once_in_order() {
        let dir = frame_dir();
        let mut grabber = DirectoryGrabber::open(dir.path(), false).unwrap();
        assert_eq!(grabber.len(), 2);

        assert_eq!(grabber.grab().unwrap().get_pixel(0, 0)[0], 1);
        assert_eq!(grabber.grab().unwrap().get_pixel(0, 0)[0], 2);
        assert!(matches!(grabber.grab(), Err(RigError::Capture(_))));
    }

    #[test]
    fn test_directory_loops() {
        let dir = frame_dir();
        let mut grabber = DirectoryGrabber::open(dir.path(), true).unwrap();

        let values: Vec<u8> = (0..3)
            .map(|_| grabber.grab().unwrap().get_pixel(0, 0)[0])
            .collect();
        assert_eq!(values, vec![1, 2, 1]);
    }

    #[test]
    fn test_directory_without_frames() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("readme.md"), "empty").unwrap();
        let err = DirectoryGrabber::open(dir.path(), true).unwrap_err();
        assert!(matches!(err, RigError::Capture(_)));
    }
}
