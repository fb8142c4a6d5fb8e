//! North-up placement of a grid on the map

use serde::{Deserialize, Serialize};

/// Maps pixel (col, row) to map (x, y) for a north-up grid:
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
/// `pixel_height` is negative, so row 0 is the top of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X of the upper-left corner
    pub origin_x: f64,
    /// Y of the upper-left corner
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Square pixels covering an extent, `cols` across.
    ///
    /// Returns the transform and the number of rows needed to cover the
    /// extent's height (at least 1).
    pub fn fit_extent(min_x: f64, min_y: f64, max_x: f64, max_y: f64, cols: usize) -> (Self, usize) {
        let width = (max_x - min_x).max(f64::EPSILON);
        let height = (max_y - min_y).max(0.0);
        let cell = width / cols.max(1) as f64;
        let rows = ((height / cell).ceil() as usize).max(1);
        (Self::new(min_x, max_y, cell, -cell), rows)
    }

    /// Map coordinates of a pixel center.
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Fractional pixel coordinates of a map position; NaN for a degenerate
    /// transform.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        if self.pixel_width.abs() < 1e-12 || self.pixel_height.abs() < 1e-12 {
            return (f64::NAN, f64::NAN);
        }
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
