//! File I/O for surface samples, medial points and segmentations.
//!
//! # Supported Formats
//!
//! | Data | Format | Load | Save | Notes |
//! |------|--------|------|------|-------|
//! | Surface samples | PLY | ✓ | ✓ | `x y z nx ny nz` |
//! | Medial points | PLY | ✓ | ✗ | `x y z qidx` |
//! | Segmented points | PLY | ✓ | ✓ | `segment_id`, ASCII or binary |
//! | MAT records | text | ✗ | ✓ | Two decimals, one row per surface sample |
//! | Neighbor graph | CSV | ✗ | ✓ | `source,target` edge list |
//!
//! # Usage
//!
//! ```no_run
//! use marrow::io::{mat, ply};
//! use marrow::medial::{compute_descriptors, DescriptorOptions};
//! use nalgebra::Vector3;
//!
//! let (points, normals) = ply::load_oriented_points("surface.ply").unwrap();
//! let (medial, qidx) = ply::load_medial_points("medial.ply").unwrap();
//!
//! let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
//!     .unwrap();
//! mat::save_mat_records("mat.txt", &points, &axis, &Vector3::zeros()).unwrap();
//! ```

pub mod adjacency;
pub mod mat;
pub mod ply;

pub use adjacency::save_adjacencies;
pub use mat::save_mat_records;
pub use ply::PlyOptions;
