//! Bounded Voronoi diagrams
//!
//! The Delaunay triangulation comes from `spade`. Four far-away corner sites
//! are inserted first so that every real site is interior to the hull and its
//! Voronoi cell is a closed convex polygon, walked through spade's Voronoi
//! face handles. Cells are then clipped to the requested envelope.

use geo::{Area, Coord, LineString, Polygon};
use spade::{DelaunayTriangulation, Point2, Triangulation};
use thiessen_core::{Algorithm, Error, Result};

use crate::vector::{clip_polygon_to_rect, BoundingBox, ClipRect};

/// Envelope margin used when no envelope is given
pub const DEFAULT_ENVELOPE_MARGIN: f64 = 800.0;

/// Corner sites sit this many envelope half-extents away from the center
const GHOST_FACTOR: f64 = 10.0;

/// Parameters for bounded Voronoi construction
#[derive(Debug, Clone, Default)]
pub struct VoronoiParams {
    /// Rectangle every cell is clipped to. When `None`, the sites' bounding box
    /// expanded by [`DEFAULT_ENVELOPE_MARGIN`].
    pub envelope: Option<BoundingBox>,
}

/// Bounded Voronoi algorithm
#[derive(Debug, Clone, Default)]
pub struct BoundedVoronoi;

impl Algorithm for BoundedVoronoi {
    type Input = Vec<Coord<f64>>;
    type Output = Vec<Polygon<f64>>;
    type Params = VoronoiParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "BoundedVoronoi"
    }

    fn description(&self) -> &'static str {
        "Voronoi tessellation of a point set constrained to a rectangular envelope"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let envelope = match params.envelope {
            Some(env) => env,
            None => BoundingBox::from_coords(&input)
                .ok_or_else(|| Error::Voronoi("no sites".into()))?
                .expand(DEFAULT_ENVELOPE_MARGIN),
        };
        bounded_voronoi(&input, envelope)
    }
}

/// Compute the Voronoi faces of `sites` clipped to `envelope`.
///
/// Faces come back in site order, but carry no label: callers decide which
/// site a face belongs to. Degenerate faces (fewer than three distinct
/// vertices, or no area) are dropped, so the result may be shorter than
/// `sites`.
///
/// Two sites at the same position are an error, as are non-finite coordinates.
pub fn bounded_voronoi(sites: &[Coord<f64>], envelope: BoundingBox) -> Result<Vec<Polygon<f64>>> {
    if sites.is_empty() {
        return Ok(Vec::new());
    }
    if !(envelope.width() > 0.0 && envelope.height() > 0.0) {
        return Err(Error::Voronoi(format!("empty envelope {:?}", envelope)));
    }

    let (cx, cy) = envelope.center();
    let half = envelope.width().max(envelope.height()) / 2.0;
    let reach = half * GHOST_FACTOR;

    let mut triangulation = DelaunayTriangulation::<Point2<f64>>::new();
    for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        triangulation
            .insert(Point2::new(cx + dx * reach, cy + dy * reach))
            .map_err(|e| Error::Voronoi(format!("corner site: {:?}", e)))?;
    }
    let ghosts = triangulation.num_vertices();

    let mut handles = Vec::with_capacity(sites.len());
    for (i, site) in sites.iter().enumerate() {
        let before = triangulation.num_vertices();
        let handle = triangulation
            .insert(Point2::new(site.x, site.y))
            .map_err(|e| Error::Voronoi(format!("site {} at ({}, {}): {:?}", i, site.x, site.y, e)))?;
        if triangulation.num_vertices() == before {
            let other = handle.index().saturating_sub(ghosts);
            return Err(Error::Voronoi(format!(
                "sites {} and {} coincide at ({}, {})",
                other, i, site.x, site.y
            )));
        }
        handles.push(handle);
    }

    let rect = ClipRect::from(envelope);
    let tolerance = half * 1e-12;
    let same = |a: &Coord<f64>, b: &Coord<f64>| {
        (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
    };
    let mut faces = Vec::with_capacity(sites.len());

    for (i, handle) in handles.into_iter().enumerate() {
        // Ghost corners keep every real cell bounded, so no vertex is outer
        let mut ring: Vec<Coord<f64>> = triangulation
            .vertex(handle)
            .as_voronoi_face()
            .adjacent_edges()
            .filter_map(|edge| edge.from().position())
            .map(|p| Coord { x: p.x, y: p.y })
            .collect();
        ring.dedup_by(|a, b| same(a, b));
        if ring.len() > 1 && same(&ring[0], &ring[ring.len() - 1]) {
            ring.pop();
        }

        if ring.len() < 3 {
            tracing::debug!("Site {} has a degenerate cell ({} vertices)", i, ring.len());
            continue;
        }
        ring.push(ring[0]);

        let cell = Polygon::new(LineString::new(ring), vec![]);
        match clip_polygon_to_rect(&cell, rect) {
            Some(face) if face.unsigned_area() > 0.0 => faces.push(face),
            _ => tracing::debug!("Site {} has no cell inside the envelope", i),
        }
    }

    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Intersects};

    fn envelope() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 100.0, 100.0)
    }

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_empty_input() {
        assert!(bounded_voronoi(&[], envelope()).unwrap().is_empty());
    }

    #[test]
    fn test_single_site_fills_envelope() {
        let faces = bounded_voronoi(&[c(30.0, 60.0)], envelope()).unwrap();
        assert_eq!(faces.len(), 1);
        assert!((faces[0].unsigned_area() - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_sites_split_envelope() {
        let faces = bounded_voronoi(&[c(25.0, 50.0), c(75.0, 50.0)], envelope()).unwrap();
        assert_eq!(faces.len(), 2);
        for face in &faces {
            assert!((face.unsigned_area() - 5_000.0).abs() < 1e-6);
        }
        assert!(faces[0].contains(&geo::Point::new(25.0, 50.0)));
        assert!(faces[1].contains(&geo::Point::new(75.0, 50.0)));
    }

    #[test]
    fn test_cocircular_sites() {
        // All four sites share one circumcircle, so every cell corner is the center
        let sites = vec![c(25.0, 25.0), c(75.0, 25.0), c(75.0, 75.0), c(25.0, 75.0)];
        let faces = bounded_voronoi(&sites, envelope()).unwrap();
        assert_eq!(faces.len(), 4);
        for (face, site) in faces.iter().zip(&sites) {
            assert!((face.unsigned_area() - 2_500.0).abs() < 1e-6);
            assert!(face.contains(&geo::Point::new(site.x, site.y)));
        }
    }

    #[test]
    fn test_collinear_sites() {
        let sites: Vec<_> = (0..5).map(|i| c(10.0 + 20.0 * i as f64, 50.0)).collect();
        let faces = bounded_voronoi(&sites, envelope()).unwrap();
        assert_eq!(faces.len(), 5);
        let total: f64 = faces.iter().map(|f| f.unsigned_area()).sum();
        assert!((total - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_faces_partition_envelope() {
        let sites = vec![c(10.0, 10.0), c(80.0, 20.0), c(50.0, 50.0), c(20.0, 90.0), c(90.0, 85.0)];
        let faces = bounded_voronoi(&sites, envelope()).unwrap();
        assert_eq!(faces.len(), sites.len());

        let total: f64 = faces.iter().map(|f| f.unsigned_area()).sum();
        assert!((total - 10_000.0).abs() < 1e-6);

        for (face, site) in faces.iter().zip(&sites) {
            assert!(face.intersects(&geo::Point::new(site.x, site.y)));
        }
    }

    #[test]
    fn test_coincident_sites_fail() {
        let err = bounded_voronoi(&[c(5.0, 5.0), c(5.0, 5.0)], envelope()).unwrap_err();
        assert!(matches!(err, Error::Voronoi(_)));
    }

    #[test]
    fn test_algorithm_default_envelope() {
        let faces = BoundedVoronoi
            .execute_default(vec![c(0.0, 0.0), c(100.0, 0.0)])
            .unwrap();
        assert_eq!(faces.len(), 2);
        let total: f64 = faces.iter().map(|f| f.unsigned_area()).sum();
        // (100 + 1600) x 1600
        assert!((total - 1700.0 * 1600.0).abs() < 1e-3);
    }
}
