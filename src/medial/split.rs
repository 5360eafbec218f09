//! Splitting a medial axis into its interior and exterior halves.

use nalgebra::Point3;

use crate::algo::SegmentAssignment;
use crate::error::{MatError, Result};

use super::MedialAxis;

/// Per-point attributes of one side of a medial axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedialHalf {
    /// Ball centers.
    pub coordinates: Vec<Point3<f64>>,
    /// Ball radii.
    pub radii: Vec<f64>,
    /// Separation angles in radians.
    pub separation_angles: Vec<f64>,
    /// Segment ids, with the unsegmented sentinel kept as is.
    pub segment_ids: Vec<i32>,
}

impl MedialHalf {
    /// Number of medial points on this side.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Split the medial axis and its segmentation into `(interior, exterior)`.
///
/// Follows the positional layout of the medial-axis computation: the first
/// half of the table is interior, the second half exterior.
pub fn split_interior_exterior(
    axis: &MedialAxis,
    segments: &SegmentAssignment,
) -> Result<(MedialHalf, MedialHalf)> {
    if segments.len() != axis.len() {
        return Err(MatError::shape("segment_ids", axis.len(), segments.len()));
    }

    let mut interior = MedialHalf::default();
    let mut exterior = MedialHalf::default();
    for (p, &id) in axis.iter().zip(segments.ids()) {
        let half = if p.is_interior {
            &mut interior
        } else {
            &mut exterior
        };
        half.coordinates.push(p.coordinate);
        half.radii.push(p.radius);
        half.separation_angles.push(p.separation_angle);
        half.segment_ids.push(id);
    }

    Ok((interior, exterior))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{grow_regions, BruteForceNeighbors, Criterion, GrowOptions};
    use crate::medial::{compute_descriptors, DescriptorOptions};
    use nalgebra::Vector3;

    #[test]
    fn test_split_halves() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let normals = vec![Vector3::z(); 3];
        let medial: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let z = if i < 3 { 1.0 } else { -1.0 };
                Point3::new((i % 3) as f64, 0.5, z)
            })
            .collect();
        let qidx = vec![1, 2, 1, 1, 2, 1];
        let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
            .unwrap();

        let neighbors = BruteForceNeighbors::new(&axis.coordinates(), 2).unwrap();
        let segments = grow_regions(
            axis.points(),
            &neighbors,
            &Criterion::Count { max_region_size: 3 },
            &GrowOptions::default().with_min_segment_count(0),
        )
        .unwrap();

        let (interior, exterior) = split_interior_exterior(&axis, &segments).unwrap();
        assert_eq!(interior.len(), 3);
        assert_eq!(exterior.len(), 3);
        assert!(interior.coordinates.iter().all(|c| c.z == 1.0));
        assert!(exterior.coordinates.iter().all(|c| c.z == -1.0));
        assert_eq!(interior.segment_ids, segments.ids()[..3].to_vec());
        assert_eq!(exterior.segment_ids, segments.ids()[3..].to_vec());
        assert_eq!(interior.radii[0], axis[0].radius);
    }

    #[test]
    fn test_split_length_mismatch() {
        let axis = compute_descriptors(
            &[Point3::origin()],
            &[Vector3::z()],
            &[Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, -1.0)],
            &[0, 0],
            &DescriptorOptions::default(),
        )
        .unwrap();
        let segments = SegmentAssignment::unsegmented(3);

        let err = split_interior_exterior(&axis, &segments).unwrap_err();
        assert!(matches!(err, MatError::InputShapeMismatch { expected: 2, actual: 3, .. }));
    }
}
