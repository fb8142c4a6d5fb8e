//! Error types for thiessen

use thiserror::Error;

/// Errors raised while reading inputs, building territories or writing outputs
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Required column '{name}' not found (columns: {available:?})")]
    MissingColumn {
        name: String,
        available: Vec<String>,
    },

    #[error("Unsupported reprojection: {from} -> {to}")]
    UnsupportedCrs { from: String, to: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Voronoi construction failed: {0}")]
    Voronoi(String),

    #[error("Duplicate site at ({x}, {y}): '{first}' and '{second}'")]
    DuplicateSite {
        x: f64,
        y: f64,
        first: String,
        second: String,
    },

    #[error("Cell assignment anomaly in group {group}: {detail}")]
    AssignmentAnomaly { group: i32, detail: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("{0}")]
    Other(String),
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::GeoJson(e.to_string())
    }
}

/// Result type alias for thiessen operations
pub type Result<T> = std::result::Result<T, Error>;
