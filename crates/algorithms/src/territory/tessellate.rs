//! Per-group tessellation: Voronoi faces, assignment, clipping

use std::collections::{HashMap, HashSet};

use geo::{Area, BoundingRect, Coord, MultiPolygon};
use thiessen_core::{Algorithm, Error, PointRecord, Result};

use super::assign::{assign_faces, Assignment};
use super::TerritoryCell;
use crate::vector::{clip_to_boundary, BoundingBox};
use crate::voronoi::{bounded_voronoi, DEFAULT_ENVELOPE_MARGIN};

/// Default buffer around the boundary extent
pub const DEFAULT_BOUNDARY_BUFFER: f64 = 1000.0;

/// Parameters for group tessellation
#[derive(Debug, Clone, PartialEq)]
pub struct TessellationParams {
    /// Expansion of the points' extent
    pub envelope_margin: f64,
    /// Expansion of the boundary's extent
    pub boundary_buffer: f64,
    /// Fail on any assignment anomaly instead of repairing it
    pub strict_assignment: bool,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            envelope_margin: DEFAULT_ENVELOPE_MARGIN,
            boundary_buffer: DEFAULT_BOUNDARY_BUFFER,
            strict_assignment: false,
        }
    }
}

/// All points of one group
#[derive(Debug, Clone, PartialEq)]
pub struct PointGroup {
    pub group: i32,
    pub points: Vec<PointRecord>,
}

/// Result of tessellating one group.
#[derive(Debug, Clone)]
pub struct GroupTessellation {
    pub group: i32,
    /// Retained cells in input point order
    pub cells: Vec<TerritoryCell>,
    /// Human-readable assignment anomalies
    pub anomalies: Vec<String>,
    /// Envelope the Voronoi faces were bounded by
    pub envelope: BoundingBox,
    /// Sites used (after deduplication)
    pub sites: usize,
    /// Faces whose intersection with the boundary was empty
    pub dropped_outside: usize,
}

impl GroupTessellation {
    /// Total clipped area in square metres.
    pub fn total_area_m2(&self) -> f64 {
        self.cells.iter().map(|c| c.geometry.unsigned_area()).sum()
    }
}

/// The rectangle Voronoi faces are bounded by: the points' extent grown by
/// `envelope_margin`, united with the boundary's extent grown by
/// `boundary_buffer`.
pub fn group_envelope(
    sites: &[Coord<f64>],
    boundary: &MultiPolygon<f64>,
    params: &TessellationParams,
) -> Option<BoundingBox> {
    let points = BoundingBox::from_coords(sites).map(|bb| bb.expand(params.envelope_margin));
    let outline = boundary
        .bounding_rect()
        .map(|r| BoundingBox::from(r).expand(params.boundary_buffer));
    match (points, outline) {
        (Some(p), Some(o)) => Some(p.union(&o)),
        (p, o) => p.or(o),
    }
}

/// Describe and log each anomaly; in strict mode the first one is an error.
fn report_anomalies(group: i32, assignment: &Assignment, ids: &[&str], strict: bool) -> Result<Vec<String>> {
    let mut anomalies = Vec::with_capacity(assignment.anomalies.len());
    for anomaly in &assignment.anomalies {
        let detail = anomaly.describe(ids);
        if strict {
            return Err(Error::AssignmentAnomaly { group, detail });
        }
        tracing::warn!("Group {}: assignment anomaly: {}", group, detail);
        anomalies.push(detail);
    }
    Ok(anomalies)
}

/// Tessellate one group's points within `boundary`.
///
/// Returns `Ok(None)` (after a warning) when the group has no usable point.
/// Points are deduplicated by location id (first wins) and points without
/// finite coordinates are ignored. Two ids at the same position are an error.
pub fn tessellate_group(
    group: i32,
    points: &[PointRecord],
    boundary: &MultiPolygon<f64>,
    params: &TessellationParams,
) -> Result<Option<GroupTessellation>> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_positions: HashMap<(u64, u64), &str> = HashMap::new();
    let mut usable: Vec<&PointRecord> = Vec::with_capacity(points.len());

    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }
        if !seen_ids.insert(p.location_id.as_str()) {
            continue;
        }
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        if let Some(first) = seen_positions.insert(key, p.location_id.as_str()) {
            return Err(Error::DuplicateSite {
                x: p.x,
                y: p.y,
                first: first.to_string(),
                second: p.location_id.clone(),
            });
        }
        usable.push(p);
    }

    if usable.is_empty() {
        tracing::warn!("Group {}: no usable points, skipped", group);
        return Ok(None);
    }

    let sites: Vec<Coord<f64>> = usable.iter().map(|p| p.coord()).collect();
    let ids: Vec<&str> = usable.iter().map(|p| p.location_id.as_str()).collect();

    let envelope = group_envelope(&sites, boundary, params)
        .ok_or_else(|| Error::Voronoi(format!("group {}: empty envelope", group)))?;

    let faces = bounded_voronoi(&sites, envelope)?;
    let assignment = assign_faces(&faces, &sites);

    let anomalies = report_anomalies(group, &assignment, &ids, params.strict_assignment)?;

    // Faces by site, so output follows input point order
    let mut face_of_site: Vec<Option<usize>> = vec![None; sites.len()];
    for (face, label) in assignment.labels.iter().enumerate() {
        if let Some(site) = *label {
            face_of_site[site] = Some(face);
        }
    }

    let mut cells = Vec::with_capacity(sites.len());
    let mut dropped_outside = 0;
    for (site, face) in face_of_site.into_iter().enumerate() {
        let Some(face) = face else {
            tracing::debug!("Group {}: site '{}' has no face", group, ids[site]);
            continue;
        };
        let Some(geometry) = clip_to_boundary(&faces[face], boundary) else {
            tracing::debug!("Group {}: cell of '{}' lies outside the boundary", group, ids[site]);
            dropped_outside += 1;
            continue;
        };
        let record = usable[site];
        cells.push(TerritoryCell {
            group,
            location_id: record.location_id.clone(),
            generator: sites[site],
            geometry,
            face_area_m2: faces[face].unsigned_area(),
            attributes: record.attributes.clone(),
        });
    }

    tracing::debug!(
        "Group {}: {} sites, {} faces, {} cells, {} outside",
        group,
        sites.len(),
        faces.len(),
        cells.len(),
        dropped_outside
    );

    Ok(Some(GroupTessellation {
        group,
        cells,
        anomalies,
        envelope,
        sites: sites.len(),
        dropped_outside,
    }))
}

/// Group tessellation bound to a study boundary
#[derive(Debug, Clone)]
pub struct Tessellate<'a> {
    pub boundary: &'a MultiPolygon<f64>,
}

impl<'a> Tessellate<'a> {
    pub fn new(boundary: &'a MultiPolygon<f64>) -> Self {
        Self { boundary }
    }
}

impl Algorithm for Tessellate<'_> {
    type Input = PointGroup;
    type Output = Option<GroupTessellation>;
    type Params = TessellationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Tessellate"
    }

    fn description(&self) -> &'static str {
        "Bounded Voronoi territories of one group, clipped to the study boundary"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        tessellate_group(input.group, &input.points, self.boundary, &params)
    }
}
