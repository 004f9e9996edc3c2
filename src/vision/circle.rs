//! Gradient Hough circle detection
//!
//! Every edge pixel votes for candidate centers along its gradient line, in
//! both directions, for each radius in the search range. The best-supported
//! center wins, then the radius with the most edge pixels at that distance.

use image::{GrayImage, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use serde::{Deserialize, Serialize};

use crate::geometry::{Detection, Point};
use crate::{Result, RigError};

const BLUR_SIGMA: f32 = 1.5;

/// Search parameters; zero radii fall back to the widest sensible range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleParams {
    /// Smallest radius; 0 means 1
    pub min_radius: u32,
    /// Largest radius; 0 means the larger image dimension
    pub max_radius: u32,
    /// Upper Canny threshold, the lower one is half of it
    pub param1: u32,
    /// Minimum center votes for a circle to be reported
    pub param2: u32,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            min_radius: 0,
            max_radius: 0,
            param1: 100,
            param2: 100,
        }
    }
}

/// Finds the single most supported circle in a grayscale image
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleDetector {
    params: CircleParams,
}

impl CircleDetector {
    pub fn new(params: CircleParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CircleParams {
        &self.params
    }

    /// Resolved `[min, max]` search range, or `None` when no radius in the
    /// requested range fits inside the image
    ///
    /// `max` never exceeds the image diagonal.
    fn radius_range(&self, width: u32, height: u32) -> Result<Option<(u32, u32)>> {
        let min = self.params.min_radius.max(1);
        let max = if self.params.max_radius == 0 {
            width.max(height)
        } else {
            self.params.max_radius
        };
        if max < min {
            return Err(RigError::InvalidRadiusRange { min, max });
        }

        let diagonal = (width as f64).hypot(height as f64).ceil() as u32;
        if min > diagonal {
            return Ok(None);
        }
        Ok(Some((min, max.min(diagonal))))
    }

    pub fn detect(&self, image: &GrayImage) -> Result<Option<Detection>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RigError::EmptyImage);
        }
        let Some((min_r, max_r)) = self.radius_range(width, height)? else {
            log::debug!("Radius range lies outside a {}x{} image", width, height);
            return Ok(None);
        };

        let blurred = gaussian_blur_f32(image, BLUR_SIGMA);
        let high = self.params.param1.max(1) as f32;
        let edges = canny(&blurred, high / 2.0, high);
        let gx = horizontal_sobel(&blurred);
        let gy = vertical_sobel(&blurred);

        let mut votes = vec![0u32; width as usize * height as usize];
        let mut edge_points = Vec::new();

        for (x, y, pixel) in edges.enumerate_pixels() {
            if pixel[0] == 0 {
                continue;
            }
            let dx = gx.get_pixel(x, y)[0] as f32;
            let dy = gy.get_pixel(x, y)[0] as f32;
            let magnitude = dx.hypot(dy);
            if magnitude == 0.0 {
                continue;
            }
            edge_points.push((x, y));

            let (ux, uy) = (dx / magnitude, dy / magnitude);
            for sign in [1.0f32, -1.0] {
                for r in min_r..=max_r {
                    let cx = (x as f32 + sign * ux * r as f32).round();
                    let cy = (y as f32 + sign * uy * r as f32).round();
                    // the ray has left the image and will not come back
                    if cx < 0.0 || cy < 0.0 || cx >= width as f32 || cy >= height as f32 {
                        break;
                    }
                    votes[cy as usize * width as usize + cx as usize] += 1;
                }
            }
        }

        let mut best: Option<(usize, u32)> = None;
        for (idx, &count) in votes.iter().enumerate() {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((idx, count));
            }
        }
        let Some((idx, count)) = best else {
            return Ok(None);
        };
        if count < self.params.param2 {
            log::debug!(
                "Best circle center has {} votes, below threshold {}",
                count,
                self.params.param2
            );
            return Ok(None);
        }

        let center = Point::new((idx % width as usize) as i32, (idx / width as usize) as i32);
        let Some(radius) = best_radius(center, &edge_points, min_r, max_r) else {
            return Ok(None);
        };

        log::debug!(
            "Circle at {} r={} with {} center votes",
            center,
            radius,
            count
        );
        Ok(Some(Detection::new(center, radius)))
    }
}

/// Radius in `[min_r, max_r]` shared by the most edge pixels around `center`
fn best_radius(center: Point, edge_points: &[(u32, u32)], min_r: u32, max_r: u32) -> Option<u32> {
    let mut histogram = vec![0u32; (max_r - min_r + 1) as usize];
    for &(x, y) in edge_points {
        let dx = x as f64 - center.x as f64;
        let dy = y as f64 - center.y as f64;
        let d = dx.hypot(dy).round() as u32;
        if (min_r..=max_r).contains(&d) {
            histogram[(d - min_r) as usize] += 1;
        }
    }

    let mut best: Option<(u32, u32)> = None;
    for (offset, &count) in histogram.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((min_r + offset as u32, count));
        }
    }
    best.map(|(r, _)| r)
}

/// Detect at most one circle in a grayscale image
pub fn detect_circle(
    image: &GrayImage,
    min_r: u32,
    max_r: u32,
    param1: u32,
    param2: u32,
) -> Result<Option<Detection>> {
    CircleDetector::new(CircleParams {
        min_radius: min_r,
        max_radius: max_r,
        param1,
        param2,
    })
    .detect(image)
}

/// Same as [`detect_circle`] after converting to grayscale
pub fn detect_circle_rgb(
    image: &RgbImage,
    min_r: u32,
    max_r: u32,
    param1: u32,
    param2: u32,
) -> Result<Option<Detection>> {
    detect_circle(
        &image::imageops::grayscale(image),
        min_r,
        max_r,
        param1,
        param2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};
    use imageproc::drawing::draw_filled_circle_mut;

    fn disk(width: u32, height: u32, center: (i32, i32), radius: i32) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([20]));
        draw_filled_circle_mut(&mut img, center, radius, Luma([230]));
        img
    }

    #[test]
    fn test_finds_disk() {
        let img = disk(120, 100, (60, 48), 20);
        let det = detect_circle(&img, 10, 40, 100, 10).unwrap().unwrap();
        assert!((det.center.x - 60).abs() <= 2, "{:?}", det);
        assert!((det.center.y - 48).abs() <= 2, "{:?}", det);
        assert!((det.radius as i32 - 20).abs() <= 2, "{:?}", det);
    }

    #[test]
    fn test_rgb_entry_point() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]));
        draw_filled_circle_mut(&mut img, (50, 50), 15, Rgb([240, 240, 240]));
        let det = detect_circle_rgb(&img, 8, 30, 100, 10).unwrap().unwrap();
        assert!((det.center.x - 50).abs() <= 2);
        assert!((det.center.y - 50).abs() <= 2);
    }

    #[test]
    fn test_blank_image_has_no_circle() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        assert!(detect_circle(&img, 0, 0, 100, 100).unwrap().is_none());
    }

    #[test]
    fn test_vote_threshold() {
        let img = disk(120, 100, (60, 48), 20);
        assert!(detect_circle(&img, 10, 40, 100, 100_000).unwrap().is_none());
    }

    #[test]
    fn test_empty_image() {
        let err = detect_circle(&GrayImage::new(0, 0), 0, 0, 100, 100).unwrap_err();
        assert!(matches!(err, RigError::EmptyImage));
    }

    #[test]
    fn test_inverted_range() {
        let img = GrayImage::new(10, 10);
        let err = detect_circle(&img, 20, 5, 100, 100).unwrap_err();
        assert!(matches!(err, RigError::InvalidRadiusRange { min: 20, max: 5 }));
    }

    #[test]
    fn test_max_radius_limited_to_diagonal() {
        let img = disk(120, 100, (60, 48), 20);
        let detector = CircleDetector::new(CircleParams {
            min_radius: 0,
            max_radius: u32::MAX,
            param1: 100,
            param2: 10,
        });
        assert_eq!(detector.radius_range(120, 100).unwrap(), Some((1, 157)));

        let huge = detect_circle(&img, 0, 1_000_000_000, 100, 10).unwrap();
        let diagonal = detect_circle(&img, 0, 157, 100, 10).unwrap();
        assert!(huge.is_some());
        assert_eq!(huge, diagonal);
    }

    #[test]
    fn test_min_radius_beyond_image() {
        let img = disk(120, 100, (60, 48), 20);
        assert!(detect_circle(&img, 500, 1000, 100, 10).unwrap().is_none());
    }
}
