//! 2D k-d tree over station coordinates
//!
//! Answers k-nearest-neighbor queries in O(k log n) average time under
//! planar distance. Candidates are ranked by `(squared distance, original
//! index)`, so the result is identical to a stable sort of all stations by
//! distance: equally distant stations come back in reference-set order.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use std::cmp::Ordering;

use aqsense_core::Coordinate;

/// A 2D k-d tree keyed on (latitude, longitude).
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Coordinates in original order; node and result indices refer here
    coords: Vec<Coordinate>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `coords`
    point_idx: usize,
    /// Split dimension: 0 = latitude, 1 = longitude
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-neighbor query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestResult {
    /// Position of the point in the slice the tree was built from
    pub index: usize,
    pub distance_sq: f64,
}

/// Total order used for ranking: distance first, then original position.
#[inline]
fn rank(a: (f64, usize), b: (f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl KdTree {
    /// Build a k-d tree from coordinates.
    ///
    /// Construction is O(n log² n) using a median split per level.
    pub fn build(coords: &[Coordinate]) -> Self {
        let coords = coords.to_vec();
        let mut nodes = Vec::with_capacity(coords.len());

        if !coords.is_empty() {
            let mut indices: Vec<usize> = (0..coords.len()).collect();
            build_recursive(&coords, &mut indices, 0, &mut nodes);
        }

        Self { nodes, coords }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Find the k nearest points to `query`.
    ///
    /// Returns `min(k, len)` results sorted by ascending distance, ties
    /// broken by ascending original index.
    pub fn k_nearest(&self, query: &Coordinate, k: usize) -> Vec<NearestResult> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }

        // Sorted descending by rank; the worst candidate sits at index 0
        let mut heap: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.knn_recursive(0, query, k, &mut heap);

        heap.iter()
            .rev()
            .map(|&(distance_sq, index)| NearestResult { index, distance_sq })
            .collect()
    }

    fn knn_recursive(&self, node_idx: usize, query: &Coordinate, k: usize, heap: &mut Vec<(f64, usize)>) {
        let node = &self.nodes[node_idx];
        let p = &self.coords[node.point_idx];

        let dlat = query.latitude - p.latitude;
        let dlon = query.longitude - p.longitude;
        let candidate = (dlat * dlat + dlon * dlon, node.point_idx);

        if heap.len() < k || rank(candidate, heap[0]) == Ordering::Less {
            if heap.len() >= k {
                heap.remove(0);
            }
            let pos = heap
                .binary_search_by(|probe| rank(*probe, candidate).reverse())
                .unwrap_or_else(|e| e);
            heap.insert(pos, candidate);
        }

        let diff = if node.split_dim == 0 { dlat } else { dlon };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, query, k, heap);
        }

        // `<=` keeps equally distant points with a lower index reachable
        let threshold = if heap.len() >= k { heap[0].0 } else { f64::INFINITY };
        if diff * diff <= threshold {
            if let Some(child) = second {
                self.knn_recursive(child, query, k, heap);
            }
        }
    }
}

fn build_recursive(
    coords: &[Coordinate],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let n = indices.len();
    let split_dim = (depth % 2) as u8;

    let axis = |i: usize| {
        if split_dim == 0 {
            coords[i].latitude
        } else {
            coords[i].longitude
        }
    };
    indices.sort_by(|&a, &b| axis(a).total_cmp(&axis(b)));

    let median = n / 2;
    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx: indices[median],
        split_dim,
        left: None,
        right: None,
    });

    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    if !left.is_empty() {
        let left_idx = build_recursive(coords, left, depth + 1, nodes);
        nodes[node_idx].left = Some(left_idx);
    }

    if !right.is_empty() {
        let right_idx = build_recursive(coords, right, depth + 1, nodes);
        nodes[node_idx].right = Some(right_idx);
    }

    node_idx
}
