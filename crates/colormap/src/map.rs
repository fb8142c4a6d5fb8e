//! Territory map rendering.
//!
//! Cells are rasterized as labels onto a north-up canvas fitted to the
//! boundary, labels are mapped to cell values and colored, then the cell
//! edges, boundary outline and point markers are drawn on top.

use std::path::Path;

use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use thiessen_core::{Error, GeoTransform, Raster, Result};

use crate::render::{raster_to_rgba, ColormapParams};
use crate::scheme::{ColorScheme, Rgb};

/// Label of pixels outside every cell
pub const NO_CELL: i32 = -1;

/// Appearance of a territory map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    /// Image width in pixels; height follows the boundary's aspect ratio
    pub width: u32,
    pub scheme: ColorScheme,
    pub background: Rgb,
    pub boundary_color: Rgb,
    pub edge_color: Rgb,
    pub point_color: Rgb,
    pub point_radius: i32,
    /// Margin around the boundary, as a fraction of its larger side
    pub padding: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            scheme: ColorScheme::Viridis,
            background: Rgb::WHITE,
            boundary_color: Rgb::BLACK,
            edge_color: Rgb::new(64, 64, 64),
            point_color: Rgb::new(220, 30, 30),
            point_radius: 3,
            padding: 0.02,
        }
    }
}

/// A cell to paint and the value that colors it.
#[derive(Debug, Clone, Copy)]
pub struct MapCell<'a> {
    pub geometry: &'a MultiPolygon<f64>,
    pub value: f64,
}

/// Everything drawn on one map.
#[derive(Debug, Clone)]
pub struct MapLayers<'a> {
    pub boundary: &'a MultiPolygon<f64>,
    pub cells: Vec<MapCell<'a>>,
    pub points: &'a [Coord<f64>],
}

/// Canvas covering the padded boundary extent, `width` pixels across.
pub fn map_canvas(boundary: &MultiPolygon<f64>, width: u32, padding: f64) -> Result<(GeoTransform, usize)> {
    let rect = boundary
        .bounding_rect()
        .ok_or_else(|| Error::InvalidGeometry("cannot draw an empty boundary".into()))?;
    if width == 0 {
        return Err(Error::InvalidDimensions { width: 0, height: 0 });
    }
    let pad = rect.width().max(rect.height()) * padding.max(0.0);
    Ok(GeoTransform::fit_extent(
        rect.min().x - pad,
        rect.min().y - pad,
        rect.max().x + pad,
        rect.max().y + pad,
        width as usize,
    ))
}

/// Rasterize cells as labels: each pixel whose center lies inside cell `i`
/// gets `i`, all others [`NO_CELL`].
pub fn rasterize_cells(
    cells: &[&MultiPolygon<f64>],
    transform: GeoTransform,
    rows: usize,
    cols: usize,
) -> Result<Raster<i32>> {
    let mut labels = Raster::filled(rows, cols, NO_CELL);
    labels.set_transform(transform);
    labels.set_nodata(Some(NO_CELL));

    for (label, cell) in cells.iter().enumerate() {
        let Some(rect) = cell.bounding_rect() else { continue };
        let (c0, r0) = transform.geo_to_pixel(rect.min().x, rect.max().y);
        let (c1, r1) = transform.geo_to_pixel(rect.max().x, rect.min().y);
        let col_range = pixel_span(c0, c1, cols);
        let row_range = pixel_span(r0, r1, rows);

        for row in row_range.clone() {
            for col in col_range.clone() {
                let (x, y) = transform.pixel_to_geo(col, row);
                if cell.contains(&Point::new(x, y)) {
                    labels.set(row, col, label as i32)?;
                }
            }
        }
    }

    Ok(labels)
}

fn pixel_span(a: f64, b: f64, len: usize) -> std::ops::Range<usize> {
    let lo = a.min(b).floor().max(0.0) as usize;
    let hi = (a.max(b).ceil().max(0.0) as usize).min(len);
    lo.min(hi)..hi
}

/// Replace labels with the value of their cell.
pub fn label_values(labels: &Raster<i32>, values: &[f64]) -> Result<Raster<f64>> {
    let mut out = labels.like(f64::NAN);
    out.set_nodata(Some(f64::NAN));
    for ((row, col), &label) in labels.data().indexed_iter() {
        if label == NO_CELL {
            continue;
        }
        if let Some(&v) = usize::try_from(label).ok().and_then(|i| values.get(i)) {
            out.set(row, col, v)?;
        }
    }
    Ok(out)
}

/// Render a territory map.
///
/// Cell values are colored over `[range.0, range.1]`.
pub fn render_map(layers: &MapLayers<'_>, style: &MapStyle, range: (f64, f64)) -> Result<RgbaImage> {
    let (transform, rows) = map_canvas(layers.boundary, style.width, style.padding)?;
    let cols = style.width as usize;

    let geometries: Vec<&MultiPolygon<f64>> = layers.cells.iter().map(|c| c.geometry).collect();
    let values: Vec<f64> = layers.cells.iter().map(|c| c.value).collect();

    let labels = rasterize_cells(&geometries, transform, rows, cols)?;
    let filled = label_values(&labels, &values)?;

    let params = ColormapParams::with_range(style.scheme, range.0, range.1)
        .with_nodata_color(style.background.rgba());
    let pixels = raster_to_rgba(&filled, &params);

    let mut image = RgbaImage::from_raw(style.width, rows as u32, pixels)
        .ok_or_else(|| Error::Image(format!("buffer does not fit {}x{}", style.width, rows)))?;

    let edge = Rgba(style.edge_color.rgba());
    for geometry in &geometries {
        draw_rings(&mut image, &transform, geometry, edge);
    }
    draw_rings(&mut image, &transform, layers.boundary, Rgba(style.boundary_color.rgba()));

    let marker = Rgba(style.point_color.rgba());
    for p in layers.points {
        let (col, row) = transform.geo_to_pixel(p.x, p.y);
        draw_filled_circle_mut(
            &mut image,
            (col.round() as i32, row.round() as i32),
            style.point_radius,
            marker,
        );
    }

    Ok(image)
}

fn draw_rings(image: &mut RgbaImage, transform: &GeoTransform, geometry: &MultiPolygon<f64>, color: Rgba<u8>) {
    for polygon in geometry {
        draw_ring(image, transform, polygon.exterior(), color);
        for interior in polygon.interiors() {
            draw_ring(image, transform, interior, color);
        }
    }
}

fn draw_ring(image: &mut RgbaImage, transform: &GeoTransform, ring: &LineString<f64>, color: Rgba<u8>) {
    for line in ring.lines() {
        let (c0, r0) = transform.geo_to_pixel(line.start.x, line.start.y);
        let (c1, r1) = transform.geo_to_pixel(line.end.x, line.end.y);
        draw_line_segment_mut(image, (c0 as f32, r0 as f32), (c1 as f32, r1 as f32), color);
    }
}

/// Write an image as PNG, replacing any existing file.
pub fn save_png(image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))
}
