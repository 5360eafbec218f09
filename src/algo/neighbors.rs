//! k-nearest-neighbor queries over medial ball centers.
//!
//! Region growing only needs one capability from the spatial side: given a point
//! index, return the indices of its `k` nearest *other* points, ordered by
//! Euclidean distance with ties broken by index. That contract is the
//! [`NeighborQuery`] trait.
//!
//! - [`RTreeNeighbors`]: lazy queries on an R*-tree, the default for real data
//! - [`BruteForceNeighbors`]: exact linear scan, for tiny inputs and as a reference
//! - [`NeighborGraph`]: every neighbor list materialized once (optionally in parallel)
//!
//! Points with non-finite coordinates are left out of every index: they have no
//! neighbors and never appear as a neighbor.
//!
//! # Example
//!
//! ```
//! use marrow::algo::{NeighborQuery, RTreeNeighbors};
//! use nalgebra::Point3;
//!
//! let points: Vec<Point3<f64>> = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
//! let index = RTreeNeighbors::new(&points, 2).unwrap();
//!
//! assert_eq!(index.neighbors(2).as_ref(), &[1, 3]);
//! assert_eq!(index.neighbors(0).as_ref(), &[1, 2]);
//! ```

use std::borrow::Cow;

use nalgebra::Point3;
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::{MatError, Result};

/// Source of candidate edges for region growing.
pub trait NeighborQuery {
    /// Number of points covered by the query structure.
    fn len(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` nearest other points of `index`, nearest first, ties by index.
    fn neighbors(&self, index: usize) -> Cow<'_, [usize]>;
}

type IndexedPoint = GeomWithData<[f64; 3], usize>;

fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(MatError::invalid_param("k", k, "must be at least 1"));
    }
    Ok(())
}

#[inline]
fn to_array(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

#[inline]
fn is_finite(p: &[f64; 3]) -> bool {
    p.iter().all(|c| c.is_finite())
}

#[inline]
fn distance_2(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Order `(squared distance, index)` candidates and keep the first `k`.
fn nearest_first(mut found: Vec<(f64, usize)>, k: usize) -> Vec<usize> {
    found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    found.truncate(k);
    found.into_iter().map(|(_, i)| i).collect()
}

/// k-nearest-neighbor queries backed by an `rstar` R*-tree.
///
/// The tree is bulk loaded once; each query walks the nearest-neighbor iterator
/// until `k` other points are found plus every point tied with the `k`-th
/// distance, so that ties resolve by index exactly like [`BruteForceNeighbors`].
#[derive(Debug, Clone)]
pub struct RTreeNeighbors {
    tree: RTree<IndexedPoint>,
    coords: Vec<[f64; 3]>,
    k: usize,
}

impl RTreeNeighbors {
    /// Index `points` for queries of the `k` nearest neighbors.
    pub fn new(points: &[Point3<f64>], k: usize) -> Result<Self> {
        check_k(k)?;

        let coords: Vec<[f64; 3]> = points.iter().map(to_array).collect();
        let entries: Vec<IndexedPoint> = coords
            .iter()
            .enumerate()
            .filter(|(_, c)| is_finite(c))
            .map(|(i, c)| GeomWithData::new(*c, i))
            .collect();

        let skipped = coords.len() - entries.len();
        if skipped > 0 {
            log::warn!("{} points with non-finite coordinates left out of the neighbor index", skipped);
        }

        Ok(Self {
            tree: RTree::bulk_load(entries),
            coords,
            k,
        })
    }

    /// The neighbor count bound.
    pub fn k(&self) -> usize {
        self.k
    }
}

impl NeighborQuery for RTreeNeighbors {
    fn len(&self) -> usize {
        self.coords.len()
    }

    fn neighbors(&self, index: usize) -> Cow<'_, [usize]> {
        let query = &self.coords[index];
        if !is_finite(query) {
            return Cow::Owned(Vec::new());
        }

        let mut found: Vec<(f64, usize)> = Vec::with_capacity(self.k + 1);
        for (entry, d2) in self.tree.nearest_neighbor_iter_with_distance_2(query) {
            if entry.data == index {
                continue;
            }
            // The iterator is ordered by distance, so the last kept entry is the farthest.
            if let Some(&(farthest, _)) = found.last() {
                if found.len() >= self.k && d2 > farthest {
                    break;
                }
            }
            found.push((d2, entry.data));
        }

        Cow::Owned(nearest_first(found, self.k))
    }
}

/// Exact k-nearest-neighbor queries by linear scan.
#[derive(Debug, Clone)]
pub struct BruteForceNeighbors {
    coords: Vec<[f64; 3]>,
    k: usize,
}

impl BruteForceNeighbors {
    /// Prepare linear-scan queries of the `k` nearest neighbors.
    pub fn new(points: &[Point3<f64>], k: usize) -> Result<Self> {
        check_k(k)?;
        Ok(Self {
            coords: points.iter().map(to_array).collect(),
            k,
        })
    }
}

impl NeighborQuery for BruteForceNeighbors {
    fn len(&self) -> usize {
        self.coords.len()
    }

    fn neighbors(&self, index: usize) -> Cow<'_, [usize]> {
        let query = &self.coords[index];
        if !is_finite(query) {
            return Cow::Owned(Vec::new());
        }

        let found: Vec<(f64, usize)> = self
            .coords
            .iter()
            .enumerate()
            .filter(|&(i, c)| i != index && is_finite(c))
            .map(|(i, c)| (distance_2(query, c), i))
            .collect();

        Cow::Owned(nearest_first(found, self.k))
    }
}

/// Materialized neighbor lists of every point.
///
/// Building the graph up front moves all spatial queries out of the
/// single-threaded growth loop, and allows them to run in parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborGraph {
    adjacency: Vec<Vec<usize>>,
}

impl NeighborGraph {
    /// Query the neighbors of every point of `query`.
    pub fn build<Q: NeighborQuery + Sync>(query: &Q, parallel: bool) -> Self {
        let n = query.len();
        let adjacency: Vec<Vec<usize>> = if parallel {
            (0..n)
                .into_par_iter()
                .map(|i| query.neighbors(i).into_owned())
                .collect()
        } else {
            (0..n).map(|i| query.neighbors(i).into_owned()).collect()
        };

        log::debug!(
            "materialized neighbor graph: {} points, {} directed edges",
            n,
            adjacency.iter().map(Vec::len).sum::<usize>()
        );

        Self { adjacency }
    }

    /// Add every reverse edge, so that `j` lists `i` whenever `i` lists `j`.
    ///
    /// Each list is reordered by distance to `points`, ties by index. Region
    /// growing over the result reaches the same sets from any seed of a
    /// connected component, whatever the input order.
    pub fn symmetric(mut self, points: &[Point3<f64>]) -> Result<Self> {
        if points.len() != self.adjacency.len() {
            return Err(MatError::shape("points", self.adjacency.len(), points.len()));
        }

        let coords: Vec<[f64; 3]> = points.iter().map(to_array).collect();
        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); self.adjacency.len()];
        for (i, list) in self.adjacency.iter().enumerate() {
            for &j in list {
                reverse[j].push(i);
            }
        }

        for (i, (list, extra)) in self.adjacency.iter_mut().zip(reverse).enumerate() {
            list.extend(extra);
            let found: Vec<(f64, usize)> = list
                .iter()
                .map(|&j| (distance_2(&coords[i], &coords[j]), j))
                .collect();
            let len = found.len();
            *list = nearest_first(found, len);
            list.dedup();
        }

        Ok(self)
    }

    /// Number of neighbors of point `i`.
    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Undirected candidate edges `(a, b)` with `a < b`, sorted and without duplicates.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, list)| list.iter().map(move |&j| (i.min(j), i.max(j))))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

impl NeighborQuery for NeighborGraph {
    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, index: usize) -> Cow<'_, [usize]> {
        Cow::Borrowed(&self.adjacency[index])
    }
}
