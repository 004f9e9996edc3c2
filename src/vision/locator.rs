//! Color target localization
//!
//! A `TargetLocator` reads its color parameters once and then, for every
//! frame, masks the target color and reports the largest matching region.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut};
use imageproc::region_labelling::Connectivity;
use std::path::{Path, PathBuf};

use super::blob::BlobSelector;
use super::color::{ColorMask, ColorSpec};
use super::params::read_params;
use crate::geometry::Detection;
use crate::Result;

/// Finds the biggest region of a configured color
#[derive(Debug, Clone)]
pub struct TargetLocator {
    spec: ColorSpec,
    mask: ColorMask,
    selector: BlobSelector,
    source: Option<PathBuf>,
}

impl TargetLocator {
    /// Load the color parameters from `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let spec = read_params(path)?;
        let mut locator = Self::from_spec(spec)?;
        locator.source = Some(path.to_path_buf());
        log::info!(
            "Loaded color parameters from {}: color={:?} tol=({}, {}, {})",
            path.display(),
            spec.color,
            spec.hue_tol,
            spec.sat_tol,
            spec.val_tol
        );
        Ok(locator)
    }

    pub fn from_spec(spec: ColorSpec) -> Result<Self> {
        Ok(Self {
            mask: ColorMask::from_spec(&spec)?,
            spec,
            selector: BlobSelector::default(),
            source: None,
        })
    }

    /// Use a different pixel connectivity for grouping
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.selector = BlobSelector::new(connectivity);
        self
    }

    pub fn spec(&self) -> &ColorSpec {
        &self.spec
    }

    /// Parameter file this locator was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Locate the target in `image`
    ///
    /// When `mask_out` is given it receives the intermediate color mask for
    /// display; it has no influence on the result.
    pub fn detect_color(
        &self,
        image: &RgbImage,
        mask_out: Option<&mut GrayImage>,
    ) -> Result<Option<Detection>> {
        let mask = self.mask.apply(image)?;
        let detection = self.selector.select(&mask);

        match detection {
            Some(det) => log::debug!("Color target at {} r={}", det.center, det.radius),
            None => log::debug!("Color target not found"),
        }

        if let Some(out) = mask_out {
            *out = mask;
        }
        Ok(detection)
    }
}

/// Draw a detection outline and center cross onto a frame
pub fn annotate(image: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
    let center = (detection.center.x, detection.center.y);
    draw_hollow_circle_mut(image, center, detection.radius as i32, color);
    draw_cross_mut(image, color, center.0, center.1);
}
