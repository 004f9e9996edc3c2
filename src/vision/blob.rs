//! Connected-region grouping of binary masks
//!
//! Groups are found with an iterative depth-first search: a flat visited
//! array sized to the mask, an explicit coordinate stack, and running
//! coordinate sums per group. No recursion, so large regions are safe.

use image::GrayImage;
use imageproc::region_labelling::Connectivity;

use crate::geometry::{Detection, Point};

const FOUR_NEIGHBOURS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const EIGHT_NEIGHBOURS: [(i64, i64); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Running totals for one connected group of pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blob {
    pub sum_x: i64,
    pub sum_y: i64,
    pub pixel_count: u32,
}

impl Blob {
    fn add(&mut self, x: u32, y: u32) {
        self.sum_x += x as i64;
        self.sum_y += y as i64;
        self.pixel_count += 1;
    }

    /// Mean pixel position, rounded
    pub fn centroid(&self) -> Point {
        let n = self.pixel_count.max(1) as f64;
        Point::new(
            (self.sum_x as f64 / n).round() as i32,
            (self.sum_y as f64 / n).round() as i32,
        )
    }

    /// Radius of a filled disk with the same area
    pub fn radius(&self) -> u32 {
        (self.pixel_count as f64 / std::f64::consts::PI).sqrt().round() as u32
    }

    pub fn to_detection(&self) -> Detection {
        Detection::new(self.centroid(), self.radius())
    }
}

/// Picks the largest connected region of a mask
#[derive(Debug, Clone, Copy)]
pub struct BlobSelector {
    connectivity: Connectivity,
}

impl BlobSelector {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// All groups of set pixels, in row-major order of their first pixel
    pub fn blobs(&self, mask: &GrayImage) -> Vec<Blob> {
        let (width, height) = mask.dimensions();
        let neighbours: &[(i64, i64)] = match self.connectivity {
            Connectivity::Four => &FOUR_NEIGHBOURS,
            Connectivity::Eight => &EIGHT_NEIGHBOURS,
        };

        let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
        let mut visited = vec![false; width as usize * height as usize];
        let mut stack: Vec<(u32, u32)> = Vec::new();
        let mut blobs = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if visited[index(x, y)] || mask.get_pixel(x, y)[0] == 0 {
                    continue;
                }

                let mut blob = Blob::default();
                visited[index(x, y)] = true;
                stack.push((x, y));

                while let Some((px, py)) = stack.pop() {
                    blob.add(px, py);
                    for &(dx, dy) in neighbours {
                        let nx = px as i64 + dx;
                        let ny = py as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        let idx = index(nx, ny);
                        if !visited[idx] && mask.get_pixel(nx, ny)[0] != 0 {
                            visited[idx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }

                blobs.push(blob);
            }
        }

        blobs
    }

    /// Centroid and disk radius of the largest group; ties go to the group
    /// found first in scan order
    pub fn select(&self, mask: &GrayImage) -> Option<Detection> {
        let mut best: Option<Blob> = None;
        for blob in self.blobs(mask) {
            if best.map_or(true, |b| blob.pixel_count > b.pixel_count) {
                best = Some(blob);
            }
        }
        best.map(|b| b.to_detection())
    }
}

impl Default for BlobSelector {
    fn default() -> Self {
        Self::new(Connectivity::Eight)
    }
}
