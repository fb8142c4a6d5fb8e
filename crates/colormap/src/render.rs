//! Raster-to-RGBA rendering using color schemes.

use crate::scheme::{evaluate, ColorScheme, Rgb};
use thiessen_core::raster::{Raster, RasterElement};

/// Parameters for colormap rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below this are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above this are clamped.
    pub max: f64,
    /// Color for nodata pixels (RGBA).
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Params with an explicit value range and transparent nodata.
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: [0, 0, 0, 0],
        }
    }

    pub fn with_nodata_color(mut self, color: [u8; 4]) -> Self {
        self.nodata_color = color;
        self
    }

    /// Color for a value, or `None` for non-finite values.
    pub fn color_of(&self, value: f64) -> Option<Rgb> {
        if !value.is_finite() {
            return None;
        }
        let range = self.max - self.min;
        let t = if range.abs() > f64::EPSILON {
            (value - self.min) / range
        } else {
            0.0
        };
        Some(evaluate(self.scheme, t))
    }
}

/// Convert a raster to an RGBA pixel buffer.
///
/// Returns `rows * cols * 4` bytes in row-major order. Nodata and
/// non-finite pixels get `params.nodata_color`.
pub fn raster_to_rgba<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Vec<u8> {
    let nodata = raster.nodata();
    let mut rgba = Vec::with_capacity(raster.len() * 4);

    for val in raster.data().iter() {
        let color = if val.is_nodata(nodata) {
            None
        } else {
            val.to_f64().and_then(|v| params.color_of(v))
        };
        match color {
            Some(c) => rgba.extend_from_slice(&c.rgba()),
            None => rgba.extend_from_slice(&params.nodata_color),
        }
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_to_rgba_basic() {
        let mut r = Raster::<f64>::new(2, 2);
        r.set(0, 0, 0.0).unwrap();
        r.set(0, 1, 0.5).unwrap();
        r.set(1, 0, 1.0).unwrap();
        r.set(1, 1, f64::NAN).unwrap();
        r.set_nodata(Some(f64::NAN));

        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 1.0);
        let rgba = raster_to_rgba(&r, &params);

        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[128, 128, 128, 255]);
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn nodata_label_uses_nodata_color() {
        let mut r = Raster::<i32>::filled(1, 2, -1);
        r.set(0, 1, 2).unwrap();
        r.set_nodata(Some(-1));

        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 2.0)
            .with_nodata_color([255, 255, 255, 255]);
        let rgba = raster_to_rgba(&r, &params);
        assert_eq!(rgba, vec![255, 255, 255, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn values_above_range_clamp() {
        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 2.0);
        assert_eq!(params.color_of(50.0), Some(Rgb::WHITE));
        assert_eq!(params.color_of(f64::NAN), None);
    }
}
