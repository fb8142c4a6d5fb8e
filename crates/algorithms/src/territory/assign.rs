//! Face-to-site assignment
//!
//! Faces are labelled with the site nearest to their centroid, then checked:
//! every label must be unique and every face must contain (or touch) its site.
//! Faces that fail either check are relabelled with the site they contain; a
//! face whose site is taken over this way is dropped and reported too.

use geo::{Centroid, Coord, Intersects, Point, Polygon};

use crate::kdtree::KdTree;

/// Candidates examined (nearest first) before falling back to a full scan
const RELABEL_CANDIDATES: usize = 8;

/// What went wrong with a centroid label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    /// Another face already carries the same site
    DuplicateLabel,
    /// The labelled site is not inside the face
    SiteOutsideFace,
    /// The face's site was handed to a relabelled face that contains it
    Displaced,
}

/// One centroid label that failed verification.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentAnomaly {
    pub kind: AnomalyKind,
    /// Index of the face in the input slice
    pub face: usize,
    /// Site picked by the centroid, or the site lost when displaced
    pub nearest: usize,
    /// Site the face was relabelled with; `None` if the face was dropped
    pub resolved: Option<usize>,
}

impl AssignmentAnomaly {
    /// Human-readable description using site ids.
    pub fn describe(&self, ids: &[&str]) -> String {
        let name = |i: usize| ids.get(i).copied().unwrap_or("?");
        let what = match self.kind {
            AnomalyKind::DuplicateLabel => "shares its centroid site with another face",
            AnomalyKind::SiteOutsideFace => "does not contain its centroid site",
            AnomalyKind::Displaced => {
                return format!(
                    "face {} lost site '{}' to a face containing it; dropped",
                    self.face,
                    name(self.nearest)
                )
            }
        };
        match self.resolved {
            Some(site) => format!(
                "face {} {} '{}'; relabelled '{}'",
                self.face,
                what,
                name(self.nearest),
                name(site)
            ),
            None => format!(
                "face {} {} '{}'; no containing site, dropped",
                self.face,
                what,
                name(self.nearest)
            ),
        }
    }
}

/// Labels for every face plus the anomalies found on the way.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    /// `labels[face]` is the site index, or `None` for a dropped face
    pub labels: Vec<Option<usize>>,
    pub anomalies: Vec<AssignmentAnomaly>,
}

/// Label each face with its centroid's nearest site, then verify and repair.
pub fn assign_faces(faces: &[Polygon<f64>], sites: &[Coord<f64>]) -> Assignment {
    let tree = KdTree::build(sites);

    let nearest: Vec<Option<usize>> = faces
        .iter()
        .map(|face| {
            let c = face.centroid()?;
            tree.nearest(c.x(), c.y()).map(|n| n.index)
        })
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; sites.len()];
    let mut suspect: Vec<Option<AnomalyKind>> = vec![None; faces.len()];

    // Uniqueness: first face to claim a site keeps it for now
    for (f, label) in nearest.iter().enumerate() {
        let Some(site) = *label else { continue };
        match owner[site] {
            None => owner[site] = Some(f),
            Some(_) => suspect[f] = Some(AnomalyKind::DuplicateLabel),
        }
    }

    // Containment
    for (f, label) in nearest.iter().enumerate() {
        if suspect[f].is_some() {
            continue;
        }
        let Some(site) = *label else { continue };
        if !contains_site(&faces[f], sites[site]) {
            suspect[f] = Some(AnomalyKind::SiteOutsideFace);
            if owner[site] == Some(f) {
                owner[site] = None;
            }
        }
    }

    let mut labels = nearest.clone();
    let mut anomalies: Vec<AssignmentAnomaly> = Vec::new();
    // Index into `anomalies` for faces already reported
    let mut reported: Vec<Option<usize>> = vec![None; faces.len()];

    for (f, kind) in suspect.into_iter().enumerate() {
        let Some(kind) = kind else { continue };
        let resolved = containing_site(&faces[f], sites, &tree, &owner);
        if let Some(site) = resolved {
            // A displaced owner is itself wrong: the site lies in this face
            if let Some(prev) = owner[site] {
                labels[prev] = None;
                let displaced = AssignmentAnomaly {
                    kind: AnomalyKind::Displaced,
                    face: prev,
                    nearest: site,
                    resolved: None,
                };
                match reported[prev] {
                    Some(a) => anomalies[a] = displaced,
                    None => {
                        reported[prev] = Some(anomalies.len());
                        anomalies.push(displaced);
                    }
                }
            }
            owner[site] = Some(f);
        }
        labels[f] = resolved;
        reported[f] = Some(anomalies.len());
        anomalies.push(AssignmentAnomaly {
            kind,
            face: f,
            nearest: nearest[f].unwrap_or(0),
            resolved,
        });
    }
    anomalies.sort_by_key(|a| a.face);

    Assignment { labels, anomalies }
}

fn contains_site(face: &Polygon<f64>, site: Coord<f64>) -> bool {
    face.intersects(&Point::from(site))
}

/// Site lying in `face`, preferring one that no other face owns.
fn containing_site(
    face: &Polygon<f64>,
    sites: &[Coord<f64>],
    tree: &KdTree,
    owner: &[Option<usize>],
) -> Option<usize> {
    let c = face.centroid()?;
    let candidates = tree.k_nearest(c.x(), c.y(), RELABEL_CANDIDATES);
    let found = candidates
        .iter()
        .map(|n| n.index)
        .find(|&i| owner[i].is_none() && contains_site(face, sites[i]));
    if found.is_some() {
        return found;
    }
    (0..sites.len())
        .find(|&i| owner[i].is_none() && contains_site(face, sites[i]))
        .or_else(|| (0..sites.len()).find(|&i| contains_site(face, sites[i])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn strip(x0: f64, x1: f64) -> Polygon<f64> {
        polygon![(x: x0, y: 0.0), (x: x1, y: 0.0), (x: x1, y: 10.0), (x: x0, y: 10.0)]
    }

    #[test]
    fn test_clean_assignment() {
        let faces = vec![strip(0.0, 5.0), strip(5.0, 10.0)];
        let sites = vec![c(7.5, 5.0), c(2.5, 5.0)];
        let a = assign_faces(&faces, &sites);
        assert_eq!(a.labels, vec![Some(1), Some(0)]);
        assert!(a.anomalies.is_empty());
    }

    #[test]
    fn test_site_outside_face_is_relabelled() {
        // Face 0's centroid (4.5, 5) is nearer site 0 in the thin face 1 than
        // site 1 in its own corner
        let faces = vec![strip(0.0, 9.0), strip(9.0, 9.1)];
        let sites = vec![c(9.05, 5.0), c(0.5, 9.9)];
        let a = assign_faces(&faces, &sites);

        assert_eq!(a.labels, vec![Some(1), Some(0)]);
        assert_eq!(a.anomalies.len(), 2);
        assert_eq!(a.anomalies[0].kind, AnomalyKind::SiteOutsideFace);
        assert_eq!(a.anomalies[0].resolved, Some(1));
        assert_eq!(a.anomalies[1].kind, AnomalyKind::DuplicateLabel);
        assert_eq!(a.anomalies[1].resolved, Some(0));
    }

    #[test]
    fn test_duplicate_label_resolved_by_containment() {
        // Both face centroids are nearest to site 0 at (4, 5)
        let faces = vec![strip(0.0, 6.0), strip(6.0, 7.0)];
        let sites = vec![c(4.0, 5.0), c(6.5, 9.9)];
        let a = assign_faces(&faces, &sites);

        assert_eq!(a.labels, vec![Some(0), Some(1)]);
        assert_eq!(a.anomalies.len(), 1);
        let anomaly = &a.anomalies[0];
        assert_eq!(anomaly.kind, AnomalyKind::DuplicateLabel);
        assert_eq!(anomaly.face, 1);
        assert_eq!(anomaly.resolved, Some(1));
        assert!(anomaly.describe(&["A1", "B2"]).contains("relabelled 'B2'"));
    }

    #[test]
    fn test_face_without_site_is_dropped() {
        let faces = vec![strip(0.0, 5.0), strip(20.0, 25.0)];
        let sites = vec![c(2.5, 5.0)];
        let a = assign_faces(&faces, &sites);
        assert_eq!(a.labels, vec![Some(0), None]);
        assert_eq!(a.anomalies.len(), 1);
        assert_eq!(a.anomalies[0].resolved, None);
    }

    #[test]
    fn test_displaced_owner_is_reported() {
        // Site 0 sits on the shared edge; face 1 takes it over from face 0
        let faces = vec![strip(0.0, 5.0), strip(5.0, 10.0)];
        let sites = vec![c(5.0, 5.0), c(100.0, 100.0)];
        let a = assign_faces(&faces, &sites);

        assert_eq!(a.labels, vec![None, Some(0)]);
        assert_eq!(a.anomalies.len(), 2);
        let displaced = &a.anomalies[0];
        assert_eq!(displaced.kind, AnomalyKind::Displaced);
        assert_eq!(displaced.face, 0);
        assert_eq!(displaced.resolved, None);
        assert!(displaced.describe(&["A1", "B2"]).ends_with("dropped"));
        assert_eq!(a.anomalies[1].kind, AnomalyKind::DuplicateLabel);
        assert_eq!(a.anomalies[1].face, 1);
        assert_eq!(a.anomalies[1].resolved, Some(0));
    }
}
