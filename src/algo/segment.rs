//! One-call segmentation of a medial axis.
//!
//! [`GrowParameters`] gathers every knob of a segmentation run, with one
//! threshold per [`Method`] so that switching methods does not lose the other
//! settings. [`segment_medial_axis`] validates them, builds the neighbor graph
//! over the medial ball centers and grows the regions.
//!
//! # Example
//!
//! ```
//! use marrow::algo::{segment_medial_axis, GrowParameters, Method};
//! use marrow::medial::{compute_descriptors, DescriptorOptions};
//! use nalgebra::{Point3, Vector3};
//!
//! let points: Vec<Point3<f64>> = (0..6).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
//! let normals = vec![Vector3::z(); 6];
//! let medial: Vec<Point3<f64>> = (0..12)
//!     .map(|i| Point3::new((i % 6) as f64, 0.0, if i < 6 { 1.0 } else { -1.0 }))
//!     .collect();
//! let qidx: Vec<usize> = (0..12).map(|i| (i + 1) % 6).collect();
//! let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
//!     .unwrap();
//!
//! let params = GrowParameters::default()
//!     .with_method(Method::BallOverlap)
//!     .with_k(2)
//!     .with_min_count(1);
//! let segments = segment_medial_axis(&axis, &params).unwrap();
//! assert_eq!(segments.len(), axis.len());
//! ```

use std::time::{Duration, Instant};

use crate::error::{MatError, Result};
use crate::medial::MedialAxis;

use super::{
    grow_regions_with_progress, Criterion, GrowOptions, Method, NeighborGraph, Progress,
    RTreeNeighbors, SegmentAssignment,
};

/// Parameters of a segmentation run.
#[derive(Debug, Clone)]
pub struct GrowParameters {
    /// The active criterion.
    pub method: Method,
    /// Maximum bisector angle in degrees ([`Method::BisectorAngle`]).
    pub bisector_angle: f64,
    /// Maximum separation angle difference in degrees ([`Method::SeparationAngle`]).
    pub separation_angle: f64,
    /// Ball overlap factor ([`Method::BallOverlap`]).
    pub ball_overlap: f64,
    /// Region size cap ([`Method::Count`]).
    pub shape_count: usize,
    /// Number of nearest neighbors that are candidate edges.
    pub k: usize,
    /// Minimum size of a reported region.
    pub min_count: usize,
    /// Whether to build the neighbor graph in parallel (default: true).
    pub parallel: bool,
    /// Wall-clock budget for region growing; unfinished points stay unsegmented.
    pub time_limit: Option<Duration>,
}

impl Default for GrowParameters {
    fn default() -> Self {
        Self {
            method: Method::BisectorAngle,
            bisector_angle: 5.0,
            separation_angle: 5.0,
            ball_overlap: 1.2,
            shape_count: 15,
            k: 10,
            min_count: 10,
            parallel: true,
            time_limit: None,
        }
    }
}

impl GrowParameters {
    /// Select the criterion.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the bisector angle threshold in degrees.
    pub fn with_bisector_angle(mut self, degrees: f64) -> Self {
        self.bisector_angle = degrees;
        self
    }

    /// Set the separation angle threshold in degrees.
    pub fn with_separation_angle(mut self, degrees: f64) -> Self {
        self.separation_angle = degrees;
        self
    }

    /// Set the ball overlap factor.
    pub fn with_ball_overlap(mut self, factor: f64) -> Self {
        self.ball_overlap = factor;
        self
    }

    /// Set the region size cap of the count criterion.
    pub fn with_shape_count(mut self, count: usize) -> Self {
        self.shape_count = count;
        self
    }

    /// Set the neighbor count.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the minimum region size.
    pub fn with_min_count(mut self, count: usize) -> Self {
        self.min_count = count;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set a wall-clock budget for region growing.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// The criterion selected by `method`, with its threshold.
    pub fn criterion(&self) -> Result<Criterion> {
        let criterion = match self.method {
            Method::BisectorAngle => Criterion::BisectorAngle {
                max_degrees: self.bisector_angle,
            },
            Method::SeparationAngle => Criterion::SeparationAngle {
                max_degrees: self.separation_angle,
            },
            Method::BallOverlap => Criterion::BallOverlap {
                factor: self.ball_overlap,
            },
            Method::Count => Criterion::Count {
                max_region_size: self.shape_count,
            },
        };
        criterion.validate()?;
        Ok(criterion)
    }

    /// Region growing options derived from these parameters.
    ///
    /// The time limit, if any, starts counting when this is called.
    pub fn grow_options(&self) -> GrowOptions {
        let options = GrowOptions::default().with_min_segment_count(self.min_count);
        match self.time_limit {
            Some(limit) => options.with_deadline(Instant::now() + limit),
            None => options,
        }
    }

    /// Check every parameter before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(MatError::invalid_param("k", self.k, "must be at least 1"));
        }
        self.criterion().map(|_| ())
    }
}

/// Build the undirected k-nearest-neighbor graph over the medial ball centers.
///
/// Two balls are adjacent if either is among the `k` nearest of the other.
pub fn neighbor_graph(axis: &MedialAxis, k: usize, parallel: bool) -> Result<NeighborGraph> {
    let coordinates = axis.coordinates();
    let index = RTreeNeighbors::new(&coordinates, k)?;
    NeighborGraph::build(&index, parallel).symmetric(&coordinates)
}

/// Segment a medial axis with the given parameters.
pub fn segment_medial_axis(axis: &MedialAxis, params: &GrowParameters) -> Result<SegmentAssignment> {
    segment_medial_axis_with_progress(axis, params, &Progress::none())
}

/// Segment a medial axis, reporting progress after every finished region.
pub fn segment_medial_axis_with_progress(
    axis: &MedialAxis,
    params: &GrowParameters,
    progress: &Progress,
) -> Result<SegmentAssignment> {
    params.validate()?;
    let criterion = params.criterion()?;

    log::info!(
        "segmenting {} medial points: method={}, k={}, min_count={}",
        axis.len(),
        params.method,
        params.k,
        params.min_count
    );

    let options = params.grow_options();
    let graph = neighbor_graph(axis, params.k, params.parallel)?;
    grow_regions_with_progress(axis.points(), &graph, &criterion, &options, progress)
}
