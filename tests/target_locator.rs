//! Color target localization from parameter files on disk

#![cfg(feature = "vision")]

use flight_rig::vision::{annotate, TargetLocator, TargetTracker};
use flight_rig::{RigConfig, RigError};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn scene() -> RgbImage {
    let mut frame = RgbImage::from_pixel(320, 240, Rgb([30, 30, 30]));
    draw_filled_circle_mut(&mut frame, (200, 80), 25, Rgb([230, 40, 40]));
    draw_filled_circle_mut(&mut frame, (60, 180), 8, Rgb([230, 40, 40]));
    frame
}

#[test]
fn test_open_and_detect() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "red.txt", "230 40 40\n8 60 60\n");
    let locator = TargetLocator::open(&path).unwrap();
    assert_eq!(locator.source(), Some(path.as_path()));

    let mut mask = GrayImage::new(1, 1);
    let det = locator
        .detect_color(&scene(), Some(&mut mask))
        .unwrap()
        .unwrap();
    assert!((det.center.x - 200).abs() <= 1);
    assert!((det.center.y - 80).abs() <= 1);
    assert!((det.radius as i32 - 25).abs() <= 1);
    assert_eq!(mask.dimensions(), (320, 240));

    let mut frame = scene();
    annotate(&mut frame, &det, Rgb([0, 255, 0]));
    assert_eq!(*frame.get_pixel(det.center.x as u32, det.center.y as u32), Rgb([0, 255, 0]));
}

#[test]
fn test_missing_param_file() {
    let err = TargetLocator::open("/nonexistent/flight-rig/params.txt").unwrap_err();
    assert!(matches!(err, RigError::FileNotFound(_)));
}

#[test]
fn test_malformed_param_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.txt", "230 40 forty 8 60 60");
    let err = TargetLocator::open(&path).unwrap_err();
    assert!(matches!(err, RigError::ParamRead { .. }));
    assert!(err.is_config_error());
}

#[test]
fn test_config_points_at_param_file() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "green.txt", "20 220 20 5 40 40");
    let config_path = write_file(
        &dir,
        "rig.toml",
        "[vision]\nparam_path = \"green.txt\"\nsmoothing_window = 3\n",
    );

    let config = RigConfig::load(&config_path).unwrap();
    let param_path = config.vision.param_path.clone().unwrap();
    assert!(param_path.is_absolute());

    let locator = TargetLocator::open(&param_path).unwrap();
    let mut tracker = TargetTracker::new(locator, config.vision.smoothing_window).unwrap();

    let mut frame = RgbImage::from_pixel(160, 120, Rgb([0, 0, 0]));
    draw_filled_circle_mut(&mut frame, (80, 60), 12, Rgb([20, 220, 20]));
    let det = tracker.track(&frame, None).unwrap().unwrap();
    assert_eq!((det.center.x, det.center.y), (80, 60));
}
