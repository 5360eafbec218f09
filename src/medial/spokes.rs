//! Line segments for inspecting spokes and bisectors.

use nalgebra::{Point3, Vector3};

use crate::error::{MatError, Result};

/// A line segment given by its two end points.
pub type Segment = [Point3<f64>; 2];

/// Build one segment per source point, from the source to `source + direction`.
///
/// Typical inputs are medial ball centers paired with their spokes (segments
/// reach the feature points) or their bisectors.
///
/// # Example
///
/// ```
/// use marrow::medial::spoke_segments;
/// use nalgebra::{Point3, Vector3};
///
/// let segments = spoke_segments(&[Point3::origin()], &[Vector3::new(0.0, 0.0, 2.0)]).unwrap();
/// assert_eq!(segments[0][1], Point3::new(0.0, 0.0, 2.0));
/// ```
pub fn spoke_segments(sources: &[Point3<f64>], directions: &[Vector3<f64>]) -> Result<Vec<Segment>> {
    if sources.len() != directions.len() {
        return Err(MatError::shape("directions", sources.len(), directions.len()));
    }

    Ok(sources
        .iter()
        .zip(directions)
        .map(|(s, d)| [*s, s + d])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_reach_feature_points() {
        let centers = vec![Point3::new(1.0, 1.0, 0.0), Point3::new(-2.0, 0.0, 3.0)];
        let features = vec![Point3::new(1.0, 2.0, 0.0), Point3::new(0.0, 0.0, 0.0)];
        let spokes: Vec<Vector3<f64>> = features.iter().zip(&centers).map(|(f, c)| f - c).collect();

        let segments = spoke_segments(&centers, &spokes).unwrap();
        assert_eq!(segments.len(), 2);
        for (segment, feature) in segments.iter().zip(&features) {
            assert_eq!(segment[1], *feature);
        }
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = spoke_segments(&[Point3::origin()], &[]).unwrap_err();
        assert!(matches!(err, MatError::InputShapeMismatch { expected: 1, actual: 0, .. }));
    }
}
