//! Clipping operations
//!
//! Convex faces are clipped to a rectangular envelope with Sutherland-Hodgman;
//! clipping to an arbitrary boundary goes through `geo`'s boolean overlay.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use super::spatial::BoundingBox;

/// A clipping rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }
}

impl From<BoundingBox> for ClipRect {
    fn from(bb: BoundingBox) -> Self {
        Self::new(bb.min_x, bb.min_y, bb.max_x, bb.max_y)
    }
}

/// Edge of the clipping rectangle
#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    fn is_inside(&self, p: &Coord<f64>, rect: &ClipRect) -> bool {
        match self {
            Edge::Left => p.x >= rect.min_x,
            Edge::Right => p.x <= rect.max_x,
            Edge::Bottom => p.y >= rect.min_y,
            Edge::Top => p.y <= rect.max_y,
        }
    }

    fn intersect(&self, p: &Coord<f64>, q: &Coord<f64>, rect: &ClipRect) -> Coord<f64> {
        let dx = q.x - p.x;
        let dy = q.y - p.y;

        match self {
            Edge::Left => Coord { x: rect.min_x, y: p.y + (rect.min_x - p.x) / dx * dy },
            Edge::Right => Coord { x: rect.max_x, y: p.y + (rect.max_x - p.x) / dx * dy },
            Edge::Bottom => Coord { x: p.x + (rect.min_y - p.y) / dy * dx, y: rect.min_y },
            Edge::Top => Coord { x: p.x + (rect.max_y - p.y) / dy * dx, y: rect.max_y },
        }
    }
}

/// One Sutherland-Hodgman step against a single edge
fn clip_ring_edge(vertices: &[Coord<f64>], edge: Edge, rect: &ClipRect) -> Vec<Coord<f64>> {
    let n = vertices.len();
    let mut output = Vec::with_capacity(n + 2);

    for i in 0..n {
        let current = &vertices[i];
        let next = &vertices[(i + 1) % n];

        match (edge.is_inside(current, rect), edge.is_inside(next, rect)) {
            (true, true) => output.push(*next),
            (true, false) => output.push(edge.intersect(current, next, rect)),
            (false, true) => {
                output.push(edge.intersect(current, next, rect));
                output.push(*next);
            }
            (false, false) => {}
        }
    }

    output
}

/// Clip an open ring (no repeated closing vertex) to a rectangle.
///
/// Exact for convex rings. Returns an empty vector when nothing remains.
pub fn clip_ring_to_rect(ring: &[Coord<f64>], rect: ClipRect) -> Vec<Coord<f64>> {
    let mut vertices = ring.to_vec();
    for edge in [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top] {
        if vertices.is_empty() {
            break;
        }
        vertices = clip_ring_edge(&vertices, edge, &rect);
    }
    vertices
}

/// Clip a convex polygon to a rectangle.
///
/// Interior rings are ignored. Returns `None` if the polygon lies entirely
/// outside or collapses to fewer than three vertices.
pub fn clip_polygon_to_rect(poly: &Polygon<f64>, rect: ClipRect) -> Option<Polygon<f64>> {
    let mut ring: Vec<Coord<f64>> = poly.exterior().0.clone();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    let mut clipped = clip_ring_to_rect(&ring, rect);
    clipped.dedup();
    if clipped.len() > 1 && clipped.first() == clipped.last() {
        clipped.pop();
    }
    if clipped.len() < 3 {
        return None;
    }

    clipped.push(clipped[0]);
    Some(Polygon::new(LineString::new(clipped), vec![]))
}

/// Intersect a polygon with a (multi)polygon boundary.
///
/// Returns `None` when the intersection has no area.
pub fn clip_to_boundary(poly: &Polygon<f64>, boundary: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let clipped = poly.intersection(boundary);
    let clipped = MultiPolygon::new(
        clipped
            .into_iter()
            .filter(|p| p.unsigned_area() > 0.0)
            .collect(),
    );
    if clipped.0.is_empty() {
        None
    } else {
        Some(clipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_rect() -> ClipRect {
        ClipRect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_clip_polygon_fully_inside() {
        let poly = polygon![(x: 2.0, y: 2.0), (x: 8.0, y: 2.0), (x: 8.0, y: 8.0), (x: 2.0, y: 8.0)];
        let clipped = clip_polygon_to_rect(&poly, unit_rect()).unwrap();
        assert!((clipped.unsigned_area() - 36.0).abs() < 1e-10);
    }

    #[test]
    fn test_clip_polygon_partial() {
        let poly = polygon![(x: -5.0, y: -5.0), (x: 5.0, y: -5.0), (x: 5.0, y: 5.0), (x: -5.0, y: 5.0)];
        let clipped = clip_polygon_to_rect(&poly, unit_rect()).unwrap();

        for coord in clipped.exterior().0.iter() {
            assert!(
                (0.0..=10.0).contains(&coord.x) && (0.0..=10.0).contains(&coord.y),
                "({}, {}) outside",
                coord.x,
                coord.y
            );
        }
        assert!((clipped.unsigned_area() - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_clip_polygon_fully_outside() {
        let poly = polygon![(x: 20.0, y: 20.0), (x: 30.0, y: 20.0), (x: 30.0, y: 30.0)];
        assert!(clip_polygon_to_rect(&poly, unit_rect()).is_none());
    }

    #[test]
    fn test_clip_huge_triangle_to_rect() {
        let poly = polygon![(x: -1000.0, y: -1000.0), (x: 1000.0, y: -1000.0), (x: 0.0, y: 1000.0)];
        let clipped = clip_polygon_to_rect(&poly, unit_rect()).unwrap();
        assert!((clipped.unsigned_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_to_boundary() {
        let boundary = MultiPolygon::new(vec![
            polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
        ]);
        let face = polygon![(x: 5.0, y: -5.0), (x: 20.0, y: -5.0), (x: 20.0, y: 20.0), (x: 5.0, y: 20.0)];
        let clipped = clip_to_boundary(&face, &boundary).unwrap();
        assert!((clipped.unsigned_area() - 50.0).abs() < 1e-9);

        let outside = polygon![(x: 50.0, y: 50.0), (x: 60.0, y: 50.0), (x: 60.0, y: 60.0)];
        assert!(clip_to_boundary(&outside, &boundary).is_none());
    }
}
