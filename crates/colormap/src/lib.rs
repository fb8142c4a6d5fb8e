//! # Thiessen Colormap
//!
//! Color ramps, raster-to-RGBA conversion and territory map rendering.
//!
//! The main entry point is [`render_map`], which paints cells colored by a
//! value (area in hectares) with the boundary and point markers on top, and
//! [`save_png`] to write the result.
//!
//! ## Usage
//!
//! ```ignore
//! use thiessen_colormap::{render_map, save_png, MapCell, MapLayers, MapStyle};
//!
//! let layers = MapLayers { boundary: &boundary, cells, points: &sites };
//! let image = render_map(&layers, &MapStyle::default(), (0.0, 2.0))?;
//! save_png(&image, "voronoi_2021.png")?;
//! ```

mod map;
mod render;
mod scheme;

pub use map::{
    label_values, map_canvas, rasterize_cells, render_map, save_png, MapCell, MapLayers, MapStyle,
    NO_CELL,
};
pub use render::{raster_to_rgba, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
