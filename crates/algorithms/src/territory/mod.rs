//! Territory mapping
//!
//! One bounded Voronoi cell per occupied location and group, clipped to the
//! study boundary, with area metrics:
//! - tessellate: envelope, Voronoi faces, clipping, attribute reattachment
//! - assign: nearest-centroid labelling with verification
//! - metrics: areas in m² and ha, with an optional cap

mod assign;
mod metrics;
mod tessellate;

pub use assign::{assign_faces, AnomalyKind, Assignment, AssignmentAnomaly};
pub use metrics::{CapPolicy, CellMetrics, MetricsParams, DEFAULT_CAP_HA};
pub use tessellate::{
    group_envelope, tessellate_group, GroupTessellation, PointGroup, Tessellate,
    TessellationParams, DEFAULT_BOUNDARY_BUFFER,
};

use geo::{Area, Coord, MultiPolygon};
use indexmap::IndexMap;
use thiessen_core::AttributeValue;

/// One clipped territory.
#[derive(Debug, Clone, PartialEq)]
pub struct TerritoryCell {
    pub group: i32,
    pub location_id: String,
    /// Position of the site that generated the cell
    pub generator: Coord<f64>,
    /// Cell intersected with the boundary
    pub geometry: MultiPolygon<f64>,
    /// Area of the envelope-bounded face before clipping
    pub face_area_m2: f64,
    /// Attributes of the source point, in source order
    pub attributes: IndexMap<String, AttributeValue>,
}

impl TerritoryCell {
    pub fn metrics(&self, params: &MetricsParams) -> CellMetrics {
        CellMetrics::compute(self.geometry.unsigned_area(), self.face_area_m2, params)
    }
}
