//! Region growing over a neighbor graph.
//!
//! The grower scans medial points in index order. Every point that is not yet
//! part of a region seeds a new one; the region then grows breadth first over
//! the neighbor graph. A candidate is tested against the point whose expansion
//! put it into the frontier (its *admitter*), not against the seed, so regions
//! follow gradual changes of the descriptors instead of staying globally
//! homogeneous.
//!
//! Growth follows the neighbor lists exactly as given. Pass a
//! [`NeighborGraph::symmetric`](super::NeighborGraph::symmetric) graph to grow
//! over the undirected relation, as [`segment_medial_axis`](super::segment_medial_axis)
//! does.
//!
//! After the scan, regions with fewer than `min_segment_count` members are
//! dissolved into the unsegmented sentinel and the survivors are relabelled
//! densely from zero in creation order.
//!
//! # Example
//!
//! ```
//! use marrow::algo::{grow_regions, BruteForceNeighbors, Criterion, GrowOptions};
//! use marrow::medial::{compute_descriptors, DescriptorOptions};
//! use nalgebra::{Point3, Vector3};
//!
//! // Four surface samples on a line, medial balls half a unit above and below.
//! let points: Vec<Point3<f64>> = (0..4).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
//! let normals = vec![Vector3::z(); 4];
//! let medial: Vec<Point3<f64>> = (0..8)
//!     .map(|i| Point3::new((i % 4) as f64, 0.0, if i < 4 { 0.5 } else { -0.5 }))
//!     .collect();
//! let qidx = vec![1, 2, 3, 2, 1, 2, 3, 2];
//! let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
//!     .unwrap();
//!
//! let neighbors = BruteForceNeighbors::new(&axis.coordinates(), 2).unwrap();
//! let segments = grow_regions(
//!     axis.points(),
//!     &neighbors,
//!     &Criterion::BallOverlap { factor: 1.2 },
//!     &GrowOptions::default().with_min_segment_count(1),
//! )
//! .unwrap();
//!
//! assert_eq!(segments.len(), 8);
//! assert!(segments.num_segments() >= 1);
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use crate::error::{MatError, Result};
use crate::medial::MedialPoint;

use super::{Criterion, NeighborQuery, Progress};

/// Segment id of points that belong to no (large enough) region.
pub const UNSEGMENTED: i32 = -1;

/// Options for region growing.
#[derive(Debug, Clone)]
pub struct GrowOptions {
    /// Minimum member count of a reported region. Smaller regions are marked
    /// [`UNSEGMENTED`]. Zero keeps every region.
    pub min_segment_count: usize,

    /// Stop seeding new regions once this instant has passed. Points not
    /// reached by then stay unsegmented. Never interrupts a region mid-growth.
    pub deadline: Option<Instant>,
}

impl Default for GrowOptions {
    fn default() -> Self {
        Self {
            min_segment_count: 10,
            deadline: None,
        }
    }
}

impl GrowOptions {
    /// Set the minimum region size.
    pub fn with_min_segment_count(mut self, count: usize) -> Self {
        self.min_segment_count = count;
        self
    }

    /// Set a deadline after which no new region is started.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Final segment id of every medial point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentAssignment {
    ids: Vec<i32>,
    sizes: Vec<usize>,
}

impl SegmentAssignment {
    /// An assignment with all `len` points unsegmented.
    pub fn unsegmented(len: usize) -> Self {
        Self {
            ids: vec![UNSEGMENTED; len],
            sizes: Vec::new(),
        }
    }

    /// Segment ids, one per medial point, [`UNSEGMENTED`] for unassigned points.
    #[inline]
    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    /// Consume the assignment and return the id array.
    pub fn into_ids(self) -> Vec<i32> {
        self.ids
    }

    /// Segment of point `i`, or `None` if it is unsegmented.
    #[inline]
    pub fn segment(&self, i: usize) -> Option<usize> {
        usize::try_from(self.ids[i]).ok()
    }

    /// Number of medial points.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of segments (excluding the unsegmented set).
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.sizes.len()
    }

    /// Member count of every segment, indexed by segment id.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Number of unsegmented points.
    pub fn num_unsegmented(&self) -> usize {
        self.ids.iter().filter(|&&id| id == UNSEGMENTED).count()
    }

    /// Indices of the members of `segment`, ascending.
    pub fn members(&self, segment: usize) -> Vec<usize> {
        self.ids
            .iter()
            .enumerate()
            .filter(|(_, &id)| usize::try_from(id).ok() == Some(segment))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Growth state of a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointState {
    Unvisited,
    /// In the frontier of the given region. Stale once that region is finished.
    Queued(usize),
    Assigned(usize),
}

/// Partition medial points into regions.
///
/// See the [module documentation](self) for the algorithm. `neighbors` must cover
/// exactly the points of `points`.
pub fn grow_regions<N: NeighborQuery + ?Sized>(
    points: &[MedialPoint],
    neighbors: &N,
    criterion: &Criterion,
    options: &GrowOptions,
) -> Result<SegmentAssignment> {
    grow_regions_with_progress(points, neighbors, criterion, options, &Progress::none())
}

/// Partition medial points into regions, reporting after every finished region.
pub fn grow_regions_with_progress<N: NeighborQuery + ?Sized>(
    points: &[MedialPoint],
    neighbors: &N,
    criterion: &Criterion,
    options: &GrowOptions,
    progress: &Progress,
) -> Result<SegmentAssignment> {
    if neighbors.len() != points.len() {
        return Err(MatError::shape("neighbor index", points.len(), neighbors.len()));
    }
    criterion.validate()?;

    let n = points.len();
    let mut state = vec![PointState::Unvisited; n];
    let mut region_sizes: Vec<usize> = Vec::new();
    let mut frontier: VecDeque<(usize, usize)> = VecDeque::new();
    let mut assigned = 0;

    for seed in 0..n {
        if let PointState::Assigned(_) = state[seed] {
            continue;
        }
        if let Some(deadline) = options.deadline {
            if Instant::now() >= deadline {
                log::warn!(
                    "region growing stopped at deadline: {} of {} points assigned",
                    assigned,
                    n
                );
                break;
            }
        }

        let region = region_sizes.len();
        state[seed] = PointState::Assigned(region);
        let mut size = 1;
        enqueue_neighbors(seed, region, neighbors, &mut state, &mut frontier);

        while let Some((candidate, admitter)) = frontier.pop_front() {
            if let PointState::Assigned(_) = state[candidate] {
                continue;
            }
            if criterion.accepts(&points[admitter], &points[candidate], size) {
                state[candidate] = PointState::Assigned(region);
                size += 1;
                enqueue_neighbors(candidate, region, neighbors, &mut state, &mut frontier);
            }
        }

        region_sizes.push(size);
        assigned += size;
        progress.report(assigned, n, "Growing regions");
    }

    let segments = relabel(&state, &region_sizes, options.min_segment_count);
    log::info!(
        "{} regions grown with {} criterion, {} kept (min size {}), {} of {} points unsegmented",
        region_sizes.len(),
        criterion.method(),
        segments.num_segments(),
        options.min_segment_count,
        segments.num_unsegmented(),
        n
    );

    Ok(segments)
}

/// Queue every neighbor of `from` not yet assigned or queued for `region`.
fn enqueue_neighbors<N: NeighborQuery + ?Sized>(
    from: usize,
    region: usize,
    neighbors: &N,
    state: &mut [PointState],
    frontier: &mut VecDeque<(usize, usize)>,
) {
    for &neighbor in neighbors.neighbors(from).iter() {
        match state[neighbor] {
            PointState::Assigned(_) => {}
            PointState::Queued(r) if r == region => {}
            _ => {
                state[neighbor] = PointState::Queued(region);
                frontier.push_back((neighbor, from));
            }
        }
    }
}

/// Drop regions below `min_count` and renumber the rest densely.
fn relabel(state: &[PointState], region_sizes: &[usize], min_count: usize) -> SegmentAssignment {
    let mut new_ids: Vec<i32> = Vec::with_capacity(region_sizes.len());
    let mut sizes = Vec::new();
    for &size in region_sizes {
        if size >= min_count {
            new_ids.push(sizes.len() as i32);
            sizes.push(size);
        } else {
            new_ids.push(UNSEGMENTED);
        }
    }

    let ids = state
        .iter()
        .map(|s| match *s {
            PointState::Assigned(region) => new_ids[region],
            _ => UNSEGMENTED,
        })
        .collect();

    SegmentAssignment { ids, sizes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{BruteForceNeighbors, NeighborGraph};
    use nalgebra::{Point3, Vector3};

    fn medial_point(x: f64, bisector_degrees: f64) -> MedialPoint {
        let r = bisector_degrees.to_radians();
        MedialPoint {
            coordinate: Point3::new(x, 0.0, 0.0),
            feature_index: 0,
            radius: 1.0,
            spoke_primary: Vector3::x(),
            spoke_secondary: Vector3::y(),
            bisector: Vector3::new(r.sin(), 0.0, r.cos()),
            separation_angle: std::f64::consts::FRAC_PI_2,
            spoke_cross: Vector3::z(),
            is_interior: true,
        }
    }

    fn coordinates(points: &[MedialPoint]) -> Vec<Point3<f64>> {
        points.iter().map(|p| p.coordinate).collect()
    }

    fn grow(points: &[MedialPoint], k: usize, criterion: Criterion, min: usize) -> SegmentAssignment {
        let neighbors = BruteForceNeighbors::new(&coordinates(points), k).unwrap();
        grow_regions(
            points,
            &neighbors,
            &criterion,
            &GrowOptions::default().with_min_segment_count(min),
        )
        .unwrap()
    }

    fn assert_partition(segments: &SegmentAssignment) {
        let mut covered = segments.num_unsegmented();
        for s in 0..segments.num_segments() {
            let members = segments.members(s);
            assert_eq!(members.len(), segments.sizes()[s]);
            covered += members.len();
        }
        assert_eq!(covered, segments.len());
    }

    #[test]
    fn test_two_pairs() {
        // Two well separated pairs with nearly identical bisectors inside each pair.
        let points = vec![
            medial_point(0.0, 0.0),
            medial_point(0.1, 0.5),
            medial_point(10.0, 90.0),
            medial_point(10.1, 90.5),
        ];
        let segments = grow(&points, 3, Criterion::BisectorAngle { max_degrees: 5.0 }, 1);

        assert_eq!(segments.num_segments(), 2);
        assert_eq!(segments.ids(), &[0, 0, 1, 1]);
        assert_eq!(segments.members(0), vec![0, 1]);
        assert_eq!(segments.members(1), vec![2, 3]);
        assert_eq!(segments.num_unsegmented(), 0);
    }

    #[test]
    fn test_candidate_tested_against_admitter() {
        // A chain whose bisector turns 3 degrees per step: 12 degrees end to end.
        // Gaps shrink along the chain so each point's nearest neighbor is the next one.
        let points = vec![
            medial_point(0.0, 0.0),
            medial_point(4.0, 3.0),
            medial_point(7.0, 6.0),
            medial_point(9.0, 9.0),
            medial_point(10.0, 12.0),
        ];
        let segments = grow(&points, 1, Criterion::BisectorAngle { max_degrees: 5.0 }, 1);

        // Comparing against the seed would stop after the second point.
        assert_eq!(segments.ids(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_first_admitter_decides() {
        // Point 2 is queued by the seed (6 degrees apart) before point 1 could admit it.
        let points = vec![
            medial_point(0.0, 0.0),
            medial_point(1.0, 3.0),
            medial_point(2.0, 6.0),
        ];
        let segments = grow(&points, 2, Criterion::BisectorAngle { max_degrees: 5.0 }, 1);

        assert_eq!(segments.ids(), &[0, 0, 1]);
    }

    #[test]
    fn test_distant_balls_do_not_merge() {
        // Radii 1 + 1 times 1.2 allows a distance of 2.4; the centers are 3 apart.
        let points = vec![medial_point(0.0, 0.0), medial_point(3.0, 0.0)];
        let segments = grow(&points, 1, Criterion::BallOverlap { factor: 1.2 }, 0);
        assert_eq!(segments.ids(), &[0, 1]);

        let points = vec![medial_point(0.0, 0.0), medial_point(2.0, 0.0)];
        let segments = grow(&points, 1, Criterion::BallOverlap { factor: 1.2 }, 0);
        assert_eq!(segments.ids(), &[0, 0]);
    }

    #[test]
    fn test_symmetric_graph_ignores_input_order() {
        // With k = 1 the ball at x = 0 lists x = 10, but x = 10 only lists x = 11.
        let criterion = Criterion::BisectorAngle { max_degrees: 5.0 };
        let options = GrowOptions::default().with_min_segment_count(0);

        for xs in [[0.0, 10.0, 11.0], [11.0, 10.0, 0.0]] {
            let points: Vec<MedialPoint> = xs.iter().map(|&x| medial_point(x, 0.0)).collect();
            let coords = coordinates(&points);
            let brute = BruteForceNeighbors::new(&coords, 1).unwrap();

            let graph = NeighborGraph::build(&brute, false).symmetric(&coords).unwrap();
            let segments = grow_regions(&points, &graph, &criterion, &options).unwrap();
            assert_eq!(segments.ids(), &[0, 0, 0], "order {:?}", xs);
        }

        // The directed lists alone split off x = 0 when it comes last.
        let points: Vec<MedialPoint> = [11.0, 10.0, 0.0].iter().map(|&x| medial_point(x, 0.0)).collect();
        let segments = grow(&points, 1, criterion, 0);
        assert_eq!(segments.ids(), &[0, 0, 1]);
    }

    #[test]
    fn test_count_criterion() {
        let points = vec![
            medial_point(0.0, 0.0),
            medial_point(4.0, 90.0),
            medial_point(7.0, 180.0),
            medial_point(9.0, 0.0),
            medial_point(10.0, 45.0),
        ];
        let segments = grow(&points, 1, Criterion::Count { max_region_size: 3 }, 0);

        assert_eq!(segments.ids(), &[0, 0, 0, 1, 1]);
        assert_eq!(segments.sizes(), &[3, 2]);
    }

    #[test]
    fn test_small_regions_become_unsegmented() {
        let points = vec![
            medial_point(0.0, 0.0),
            medial_point(0.1, 1.0),
            medial_point(0.2, 2.0),
            medial_point(10.0, 90.0),
            medial_point(20.0, 0.0),
            medial_point(20.1, 1.0),
        ];
        let segments = grow(&points, 2, Criterion::BisectorAngle { max_degrees: 5.0 }, 2);

        assert_eq!(segments.ids(), &[0, 0, 0, UNSEGMENTED, 1, 1]);
        assert_eq!(segments.sizes(), &[3, 2]);
        assert_eq!(segments.segment(3), None);
        assert_eq!(segments.segment(4), Some(1));
        assert_partition(&segments);

        for (s, &size) in segments.sizes().iter().enumerate() {
            assert!(size >= 2, "segment {} has {} members", s, size);
        }
    }

    #[test]
    fn test_zero_minimum_keeps_singletons() {
        let points = vec![
            medial_point(0.0, 0.0),
            medial_point(1.0, 60.0),
            medial_point(2.0, 120.0),
        ];
        let segments = grow(&points, 1, Criterion::BisectorAngle { max_degrees: 5.0 }, 0);

        assert_eq!(segments.ids(), &[0, 1, 2]);
        assert_eq!(segments.num_unsegmented(), 0);
    }

    #[test]
    fn test_k_one_partition() {
        let points: Vec<MedialPoint> = (0..20)
            .map(|i| medial_point((i * i) as f64 * 0.1, (i % 4) as f64 * 2.0))
            .collect();
        let segments = grow(&points, 1, Criterion::BisectorAngle { max_degrees: 3.0 }, 3);

        assert_eq!(segments.len(), 20);
        assert_partition(&segments);
        assert!(segments.sizes().iter().all(|&s| s >= 3));
    }

    #[test]
    fn test_degenerate_points_stay_apart() {
        let mut points = vec![medial_point(0.0, 0.0), medial_point(1.0, 0.0), medial_point(2.0, 0.0)];
        points[1].bisector = Vector3::new(f64::NAN, f64::NAN, f64::NAN);
        let segments = grow(&points, 2, Criterion::BisectorAngle { max_degrees: 180.0 }, 0);

        assert_eq!(segments.ids(), &[0, 1, 0]);
    }

    #[test]
    fn test_deterministic() {
        let points: Vec<MedialPoint> = (0..60)
            .map(|i| {
                let x = (i as f64 * 0.37).sin() * 5.0;
                let mut p = medial_point(x, (i % 7) as f64);
                p.coordinate.y = (i as f64 * 0.11).cos() * 5.0;
                p
            })
            .collect();
        let neighbors = BruteForceNeighbors::new(&coordinates(&points), 4).unwrap();
        let graph = NeighborGraph::build(&neighbors, true);
        let criterion = Criterion::BisectorAngle { max_degrees: 2.5 };
        let options = GrowOptions::default().with_min_segment_count(2);

        let first = grow_regions(&points, &neighbors, &criterion, &options).unwrap();
        let second = grow_regions(&points, &graph, &criterion, &options).unwrap();
        assert_eq!(first, second);
        assert_partition(&first);
    }

    #[test]
    fn test_progress_reports_every_region() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let points = vec![medial_point(0.0, 0.0), medial_point(1.0, 90.0), medial_point(2.0, 0.0)];
        let neighbors = BruteForceNeighbors::new(&coordinates(&points), 1).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |current, total, _| {
            assert!(current <= total);
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let segments = grow_regions_with_progress(
            &points,
            &neighbors,
            &Criterion::BisectorAngle { max_degrees: 5.0 },
            &GrowOptions::default().with_min_segment_count(0),
            &progress,
        )
        .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), segments.num_segments());
    }

    #[test]
    fn test_expired_deadline_leaves_points_unsegmented() {
        let points = vec![medial_point(0.0, 0.0), medial_point(1.0, 0.0)];
        let neighbors = BruteForceNeighbors::new(&coordinates(&points), 1).unwrap();
        let options = GrowOptions::default()
            .with_min_segment_count(0)
            .with_deadline(Instant::now());

        let segments = grow_regions(
            &points,
            &neighbors,
            &Criterion::BisectorAngle { max_degrees: 5.0 },
            &options,
        )
        .unwrap();
        assert_eq!(segments, SegmentAssignment::unsegmented(2));
    }

    #[test]
    fn test_neighbor_index_size_mismatch() {
        let points = vec![medial_point(0.0, 0.0), medial_point(1.0, 0.0)];
        let neighbors = BruteForceNeighbors::new(&[Point3::origin()], 1).unwrap();

        let err = grow_regions(
            &points,
            &neighbors,
            &Criterion::Count { max_region_size: 2 },
            &GrowOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MatError::InputShapeMismatch { .. }));
    }

    #[test]
    fn test_empty_input() {
        let neighbors = BruteForceNeighbors::new(&[], 3).unwrap();
        let segments = grow_regions(
            &[],
            &neighbors,
            &Criterion::Count { max_region_size: 2 },
            &GrowOptions::default(),
        )
        .unwrap();
        assert!(segments.is_empty());
        assert_eq!(segments.num_segments(), 0);
    }
}
