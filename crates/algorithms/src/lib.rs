//! # Thiessen Algorithms
//!
//! Geometry for yearly territory maps.
//!
//! ## Modules
//!
//! - **vector**: bounding boxes, rectangle and boundary clipping, areas
//! - **kdtree**: nearest-site queries
//! - **voronoi**: Voronoi faces bounded by a rectangular envelope
//! - **territory**: per-group tessellation, face assignment and area metrics

pub mod kdtree;
pub mod territory;
pub mod vector;
pub mod voronoi;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::territory::{
        tessellate_group, CapPolicy, CellMetrics, GroupTessellation, MetricsParams, PointGroup,
        Tessellate, TessellationParams, TerritoryCell,
    };
    pub use crate::vector::{hectares, BoundingBox};
    pub use crate::voronoi::{bounded_voronoi, BoundedVoronoi, VoronoiParams};
    pub use thiessen_core::prelude::*;
}
