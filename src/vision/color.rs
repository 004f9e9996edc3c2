//! HSV color masks
//!
//! Uses the 8-bit HSV convention: hue in `[0, 180)`, saturation and value
//! in `[0, 255]`. Hue is cyclic, so a tolerance window around red (hue near
//! 0) also covers hues just below 180.

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::{Result, RigError};

/// Number of distinct hue values; hue wraps modulo this
pub const HUE_RANGE: i32 = 180;

/// Mask value for a selected pixel
pub const MASK_ON: u8 = 255;

/// An 8-bit HSV triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Convert an RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(rgb: Rgb<u8>) -> Hsv {
    let [r, g, b] = rgb.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let s = if max == 0 {
        0.0
    } else {
        255.0 * delta / max as f32
    };

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let h_deg = if delta == 0.0 {
        0.0
    } else if max as f32 == r {
        60.0 * (g - b) / delta
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h_deg = if h_deg < 0.0 { h_deg + 360.0 } else { h_deg };
    let h = ((h_deg / 2.0).round() as i32).rem_euclid(HUE_RANGE);

    Hsv {
        h: h as u8,
        s: s.round() as u8,
        v: max,
    }
}

/// Target color and tolerances, as read from a parameter file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    /// Target color as RGB
    pub color: [u8; 3],
    pub hue_tol: i32,
    pub sat_tol: i32,
    pub val_tol: i32,
}

impl ColorSpec {
    pub fn new(color: [u8; 3], hue_tol: i32, sat_tol: i32, val_tol: i32) -> Result<Self> {
        check_tolerances(hue_tol, sat_tol, val_tol)?;
        Ok(Self {
            color,
            hue_tol,
            sat_tol,
            val_tol,
        })
    }

    /// Target color converted to HSV
    pub fn target_hsv(&self) -> Hsv {
        rgb_to_hsv(Rgb(self.color))
    }

    /// Take the target color from the pixel under `at`
    ///
    /// Used when tuning: click the target in a live frame, then save the
    /// result with [`write_params`](super::params::write_params).
    pub fn sample(
        image: &RgbImage,
        at: Point,
        hue_tol: i32,
        sat_tol: i32,
        val_tol: i32,
    ) -> Result<Self> {
        let (rgb, hsv) = sample_color(image, at).ok_or_else(|| {
            RigError::InvalidColorSpec(format!(
                "sample point {} is outside the {}x{} image",
                at,
                image.width(),
                image.height()
            ))
        })?;
        log::info!("Sampled RGB {:?} / HSV {:?} at {}", rgb.0, hsv, at);
        Self::new(rgb.0, hue_tol, sat_tol, val_tol)
    }
}

/// RGB and HSV of the pixel under `at`, if it lies inside the image
pub fn sample_color(image: &RgbImage, at: Point) -> Option<(Rgb<u8>, Hsv)> {
    let x = u32::try_from(at.x).ok()?;
    let y = u32::try_from(at.y).ok()?;
    let rgb = *image.get_pixel_checked(x, y)?;
    Some((rgb, rgb_to_hsv(rgb)))
}

fn check_tolerances(hue_tol: i32, sat_tol: i32, val_tol: i32) -> Result<()> {
    if hue_tol < 0 || sat_tol < 0 || val_tol < 0 {
        return Err(RigError::InvalidColorSpec(format!(
            "tolerances must be non-negative, got ({}, {}, {})",
            hue_tol, sat_tol, val_tol
        )));
    }
    Ok(())
}

/// Selects pixels within a tolerance band around a target HSV color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMask {
    target: Hsv,
    hue_tol: i32,
    sat_tol: i32,
    val_tol: i32,
}

impl ColorMask {
    /// Build a mask around an HSV target
    pub fn new(target: Hsv, hue_tol: i32, sat_tol: i32, val_tol: i32) -> Result<Self> {
        check_tolerances(hue_tol, sat_tol, val_tol)?;
        Ok(Self {
            target,
            hue_tol,
            sat_tol,
            val_tol,
        })
    }

    /// Build a mask around an RGB target
    pub fn from_rgb(color: Rgb<u8>, hue_tol: i32, sat_tol: i32, val_tol: i32) -> Result<Self> {
        Self::new(rgb_to_hsv(color), hue_tol, sat_tol, val_tol)
    }

    pub fn from_spec(spec: &ColorSpec) -> Result<Self> {
        Self::new(spec.target_hsv(), spec.hue_tol, spec.sat_tol, spec.val_tol)
    }

    pub fn target(&self) -> Hsv {
        self.target
    }

    /// Whether an HSV value falls inside every channel's window
    pub fn matches(&self, hsv: Hsv) -> bool {
        let dh = (hsv.h as i32 - self.target.h as i32).abs();
        let dh = dh.min(HUE_RANGE - dh);
        dh <= self.hue_tol
            && (hsv.s as i32 - self.target.s as i32).abs() <= self.sat_tol
            && (hsv.v as i32 - self.target.v as i32).abs() <= self.val_tol
    }

    /// Compute the binary mask of `image`
    pub fn apply(&self, image: &RgbImage) -> Result<GrayImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RigError::InvalidColorSpec("image is empty".to_string()));
        }

        let mut mask = GrayImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            if self.matches(rgb_to_hsv(*pixel)) {
                mask.put_pixel(x, y, Luma([MASK_ON]));
            }
        }
        Ok(mask)
    }
}

/// Mask the pixels of `image` close to `color` in HSV space
pub fn color_mask(
    image: &RgbImage,
    color: Rgb<u8>,
    hue_tol: i32,
    sat_tol: i32,
    val_tol: i32,
) -> Result<GrayImage> {
    ColorMask::from_rgb(color, hue_tol, sat_tol, val_tol)?.apply(image)
}

/// Fraction of selected pixels in a mask
pub fn coverage(mask: &GrayImage) -> f64 {
    let total = mask.width() as usize * mask.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let on = mask.pixels().filter(|p| p[0] != 0).count();
    on as f64 / total as f64
}
