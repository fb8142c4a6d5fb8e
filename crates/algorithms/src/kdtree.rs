//! 2D k-d tree over Voronoi sites
//!
//! Answers the nearest-site and k-nearest-site queries used to label faces
//! by their centroid.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use std::cmp::Ordering;

use geo::Coord;

/// A 2D k-d tree over site coordinates.
///
/// Results refer to sites by their index in the slice passed to [`KdTree::build`].
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    sites: Vec<Coord<f64>>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `sites`
    site: usize,
    /// Split dimension: 0 = x, 1 = y
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-site query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance_sq: f64,
}

fn dist_sq(a: &Coord<f64>, qx: f64, qy: f64) -> f64 {
    let dx = qx - a.x;
    let dy = qy - a.y;
    dx * dx + dy * dy
}

impl KdTree {
    /// Build a tree with median-of-coordinate splits, O(n log n).
    pub fn build(sites: &[Coord<f64>]) -> Self {
        let mut nodes = Vec::with_capacity(sites.len());
        if !sites.is_empty() {
            let mut indices: Vec<usize> = (0..sites.len()).collect();
            build_recursive(sites, &mut indices, 0, &mut nodes);
        }
        Self { nodes, sites: sites.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Nearest site to (qx, qy). Ties go to the site visited first.
    pub fn nearest(&self, qx: f64, qy: f64) -> Option<Neighbor> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = Neighbor { index: 0, distance_sq: f64::MAX };
        self.nearest_recursive(0, qx, qy, &mut best);
        Some(best)
    }

    /// Up to `k` nearest sites, sorted by ascending distance.
    pub fn k_nearest(&self, qx: f64, qy: f64, k: usize) -> Vec<Neighbor> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }

        // Sorted descending, so the farthest kept site is at the front
        let mut heap: Vec<Neighbor> = Vec::with_capacity(k + 1);
        self.knn_recursive(0, qx, qy, k, &mut heap);
        heap.reverse();
        heap
    }

    fn nearest_recursive(&self, node_idx: usize, qx: f64, qy: f64, best: &mut Neighbor) {
        let node = &self.nodes[node_idx];
        let p = &self.sites[node.site];

        let d = dist_sq(p, qx, qy);
        if d < best.distance_sq {
            *best = Neighbor { index: node.site, distance_sq: d };
        }

        let diff = if node.split_dim == 0 { qx - p.x } else { qy - p.y };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, qx, qy, best);
        }
        if diff * diff < best.distance_sq {
            if let Some(child) = second {
                self.nearest_recursive(child, qx, qy, best);
            }
        }
    }

    fn knn_recursive(&self, node_idx: usize, qx: f64, qy: f64, k: usize, heap: &mut Vec<Neighbor>) {
        let node = &self.nodes[node_idx];
        let p = &self.sites[node.site];
        let d = dist_sq(p, qx, qy);

        if heap.len() < k || d < heap[0].distance_sq {
            if heap.len() >= k {
                heap.remove(0);
            }
            let pos = heap
                .binary_search_by(|held| {
                    held
                        .distance_sq
                        .partial_cmp(&d)
                        .unwrap_or(Ordering::Equal)
                        .reverse()
                })
                .unwrap_or_else(|e| e);
            heap.insert(pos, Neighbor { index: node.site, distance_sq: d });
        }

        let diff = if node.split_dim == 0 { qx - p.x } else { qy - p.y };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, qx, qy, k, heap);
        }

        let threshold = if heap.len() >= k { heap[0].distance_sq } else { f64::MAX };
        if diff * diff < threshold {
            if let Some(child) = second {
                self.knn_recursive(child, qx, qy, k, heap);
            }
        }
    }
}

fn build_recursive(
    sites: &[Coord<f64>],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let n = indices.len();
    let split_dim = (depth % 2) as u8;

    let key = |i: usize| if split_dim == 0 { sites[i].x } else { sites[i].y };
    indices.sort_by(|&a, &b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal));

    let median = n / 2;
    let node_idx = nodes.len();
    nodes.push(KdNode {
        site: indices[median],
        split_dim,
        left: None,
        right: None,
    });

    if median > 0 {
        let left = build_recursive(sites, &mut indices[..median], depth + 1, nodes);
        nodes[node_idx].left = Some(left);
    }
    if median + 1 < n {
        let right = build_recursive(sites, &mut indices[median + 1..], depth + 1, nodes);
        nodes[node_idx].right = Some(right);
    }

    node_idx
}
