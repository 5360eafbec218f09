//! # Marrow
//!
//! Medial axis descriptors and region-growing segmentation for sampled surfaces.
//!
//! Given oriented surface samples and, for each sample, an interior and an
//! exterior medial ball center together with the index of the second surface
//! point touching that ball, marrow computes per-ball geometry (radius, spokes,
//! bisector, separation angle) and partitions the medial points into regions of
//! similar local structure.
//!
//! ## Features
//!
//! - **Descriptors**: spoke and angle geometry for every medial ball, computed in parallel
//! - **Neighbor graphs**: R-tree backed k-nearest-neighbor candidate edges
//! - **Region growing**: four acceptance criteria, deterministic breadth-first growth
//! - **File formats**: PLY point clouds (ASCII and binary), MAT text records, CSV edge lists
//!
//! ## Quick Start
//!
//! ```no_run
//! use marrow::prelude::*;
//!
//! let (points, normals) = marrow::io::ply::load_oriented_points("surface.ply").unwrap();
//! let (medial, qidx) = marrow::io::ply::load_medial_points("medial.ply").unwrap();
//!
//! let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
//!     .unwrap();
//! println!("Medial points: {}", axis.len());
//!
//! let params = GrowParameters::default().with_method(Method::SeparationAngle);
//! let segments = segment_medial_axis(&axis, &params).unwrap();
//! println!("Segments: {}", segments.num_segments());
//!
//! marrow::io::ply::save_labelled_points(
//!     &axis.coordinates(),
//!     segments.ids(),
//!     "segments.ply",
//!     &PlyOptions::default(),
//! )
//! .unwrap();
//! ```
//!
//! ## Segmenting In Memory
//!
//! ```
//! use marrow::prelude::*;
//! use nalgebra::{Point3, Vector3};
//!
//! // Two parallel rows of samples; every interior ball touches both rows.
//! let points: Vec<Point3<f64>> = (0..8)
//!     .map(|i| Point3::new((i % 4) as f64, 0.0, if i < 4 { 0.0 } else { 2.0 }))
//!     .collect();
//! let normals = vec![Vector3::z(); 8];
//! let medial: Vec<Point3<f64>> = (0..16)
//!     .map(|i| {
//!         let p = points[i % 8];
//!         if i < 8 { Point3::new(p.x, 0.0, 1.0) } else { Point3::new(p.x, 5.0, p.z) }
//!     })
//!     .collect();
//! let qidx: Vec<usize> = (0..16).map(|i| if i < 8 { (i + 4) % 8 } else { i - 8 }).collect();
//!
//! let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
//!     .unwrap();
//! let params = GrowParameters::default()
//!     .with_method(Method::SeparationAngle)
//!     .with_k(3)
//!     .with_min_count(8);
//! let segments = segment_medial_axis(&axis, &params).unwrap();
//!
//! assert!(segments.ids()[..8].iter().all(|&id| id == 0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod medial;
pub mod sample;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use marrow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{
        grow_regions, segment_medial_axis, Criterion, GrowOptions, GrowParameters, Method,
        NeighborGraph, NeighborQuery, RTreeNeighbors, SegmentAssignment, UNSEGMENTED,
    };
    pub use crate::error::{MatError, Result};
    pub use crate::io::PlyOptions;
    pub use crate::medial::{compute_descriptors, DescriptorOptions, MedialAxis, MedialPoint};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
