//! Visual target localization
//!
//! Two independent pipelines locate a circular target in a camera frame:
//!
//! - **Color**: HSV mask around a configured color, then the largest
//!   connected region ([`TargetLocator`])
//! - **Shape**: gradient Hough transform on a grayscale frame
//!   ([`detect_circle`])
//!
//! Callers pick one pipeline per use case; results are not fused.
//!
//! # Example
//!
//! ```ignore
//! use flight_rig::vision::{TargetLocator, ThreadedCapture, DirectoryGrabber, FrameSource};
//!
//! let locator = TargetLocator::open("params.txt")?;
//! let mut capture = ThreadedCapture::new(DirectoryGrabber::open("frames", true)?);
//! capture.start()?;
//! if let Some(frame) = capture.latest_frame() {
//!     if let Some(target) = locator.detect_color(&frame, None)? {
//!         println!("target at {} r={}", target.center, target.radius);
//!     }
//! }
//! ```

pub mod blob;
pub mod capture;
pub mod circle;
pub mod color;
pub mod locator;
pub mod params;
pub mod tracker;

pub use blob::{Blob, BlobSelector};
pub use capture::{DirectoryGrabber, FrameGrabber, FrameSource, ThreadedCapture};
pub use circle::{detect_circle, detect_circle_rgb, CircleDetector, CircleParams};
pub use color::{color_mask, rgb_to_hsv, sample_color, ColorMask, ColorSpec, Hsv};
pub use locator::{annotate, TargetLocator};
pub use params::{format_params, read_params, write_params};
pub use tracker::TargetTracker;

pub use imageproc::region_labelling::Connectivity;
