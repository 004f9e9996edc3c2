//! Smoothed color tracking across frames

use image::{GrayImage, RgbImage};

use super::locator::TargetLocator;
use crate::geometry::{Detection, Point};
use crate::smoothing::RollingAverage;
use crate::Result;

/// Wraps a [`TargetLocator`] and averages hits over the last few frames
///
/// Frames where the target is missing do not feed the averages.
#[derive(Debug, Clone)]
pub struct TargetTracker {
    locator: TargetLocator,
    x: RollingAverage,
    y: RollingAverage,
    radius: RollingAverage,
}

impl TargetTracker {
    pub fn new(locator: TargetLocator, window: usize) -> Result<Self> {
        Ok(Self {
            locator,
            x: RollingAverage::new(window)?,
            y: RollingAverage::new(window)?,
            radius: RollingAverage::new(window)?,
        })
    }

    pub fn locator(&self) -> &TargetLocator {
        &self.locator
    }

    /// Locate the target in `image` and return the smoothed estimate
    ///
    /// Returns `None` when this frame has no detection.
    pub fn track(
        &mut self,
        image: &RgbImage,
        mask_out: Option<&mut GrayImage>,
    ) -> Result<Option<Detection>> {
        let Some(det) = self.locator.detect_color(image, mask_out)? else {
            return Ok(None);
        };

        self.x.add(det.center.x as f64);
        self.y.add(det.center.y as f64);
        self.radius.add(det.radius as f64);
        Ok(self.smoothed())
    }

    /// Average of recent hits, if any
    pub fn smoothed(&self) -> Option<Detection> {
        if self.x.is_empty() {
            return None;
        }
        Some(Detection::new(
            Point::new(self.x.value().round() as i32, self.y.value().round() as i32),
            self.radius.value().round() as u32,
        ))
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.radius.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::color::ColorSpec;
    use image::Rgb;
    use imageproc::drawing::draw_filled_circle_mut;

    fn frame_with_target(x: i32, y: i32) -> RgbImage {
        let mut frame = RgbImage::from_pixel(160, 120, Rgb([0, 0, 0]));
        draw_filled_circle_mut(&mut frame, (x, y), 10, Rgb([20, 220, 20]));
        frame
    }

    fn tracker() -> TargetTracker {
        let spec = ColorSpec::new([20, 220, 20], 5, 40, 40).unwrap();
        TargetTracker::new(TargetLocator::from_spec(spec).unwrap(), 2).unwrap()
    }

    #[test]
    fn test_averages_hits() {
        let mut tracker = tracker();
        tracker.track(&frame_with_target(40, 60), None).unwrap();
        let det = tracker.track(&frame_with_target(60, 60), None).unwrap().unwrap();
        assert_eq!(det.center, Point::new(50, 60));
    }

    #[test]
    fn test_miss_does_not_feed_average() {
        let mut tracker = tracker();
        tracker.track(&frame_with_target(40, 60), None).unwrap();
        let blank = RgbImage::from_pixel(160, 120, Rgb([0, 0, 0]));
        assert!(tracker.track(&blank, None).unwrap().is_none());
        assert_eq!(tracker.smoothed().unwrap().center, Point::new(40, 60));

        tracker.reset();
        assert!(tracker.smoothed().is_none());
    }
}
