//! Segmentation algorithms for medial-axis point sets.
//!
//! - **Neighbors**: k-nearest-neighbor candidate edges ([`NeighborQuery`])
//! - **Criteria**: pairwise acceptance predicates ([`Criterion`], [`Method`])
//! - **Region growing**: breadth-first flood fill with a minimum region size
//! - **Segmentation**: one-call pipeline from a [`MedialAxis`](crate::medial::MedialAxis)
//!   to a [`SegmentAssignment`]

pub mod criterion;
pub mod neighbors;
mod progress;
pub mod region_grow;
pub mod segment;

pub use criterion::{Criterion, Method};
pub use neighbors::{BruteForceNeighbors, NeighborGraph, NeighborQuery, RTreeNeighbors};
pub use progress::Progress;
pub use region_grow::{
    grow_regions, grow_regions_with_progress, GrowOptions, SegmentAssignment, UNSEGMENTED,
};
pub use segment::{
    neighbor_graph, segment_medial_axis, segment_medial_axis_with_progress, GrowParameters,
};
