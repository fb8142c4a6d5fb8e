//! # Thiessen Core
//!
//! Core types, traits and I/O for yearly Thiessen territory mapping.
//!
//! This crate provides:
//! - `PointRecord`: a located, grouped observation (e.g. an occupied nest box in a year)
//! - `Feature` / `FeatureCollection`: geometry + ordered attributes
//! - `CRS`: Coordinate Reference System handling and boundary reprojection
//! - `Raster<T>` / `GeoTransform`: georeferenced grids used as render canvases
//! - Algorithm trait for a consistent API
//! - I/O for point tables (CSV), boundaries and layer stores (GeoJSON)

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, Feature, FeatureCollection, PointRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection, PointRecord};
    pub use crate::Algorithm;
}

/// A named, parameterized computation.
///
/// Implemented by the tessellation steps so they can be run with default or
/// explicit parameters through one interface.
pub trait Algorithm {
    type Input;
    type Output;
    type Params: Default;
    type Error: std::error::Error;

    fn name(&self) -> &'static str;

    /// One-line summary of what the algorithm computes
    fn description(&self) -> &'static str;

    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
