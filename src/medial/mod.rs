//! Medial-axis samples and their geometric descriptors.
//!
//! The external medial-axis computation produces two medial points for every
//! surface sample: the first `m` entries lie on the interior side of the surface,
//! the following `m` entries on the exterior side. Index `i` and index `i + m`
//! (modulo `2m`) share the same originating surface sample.
//!
//! [`compute_descriptors`] turns the raw medial arrays into a [`MedialAxis`], a
//! table of [`MedialPoint`] records carrying the radius, spoke vectors, bisector,
//! separation angle and spoke cross product of every medial ball.
//!
//! # Example
//!
//! ```
//! use marrow::medial::{compute_descriptors, DescriptorOptions};
//! use nalgebra::{Point3, Vector3};
//!
//! let points = vec![Point3::new(1.0, 0.0, 1.0), Point3::new(-1.0, 0.0, 1.0)];
//! let normals = vec![Vector3::z(), Vector3::z()];
//! let medial = vec![Point3::origin(); 4];
//! let qidx = vec![1, 0, 1, 0];
//!
//! let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
//!     .unwrap();
//!
//! assert_eq!(axis.len(), 4);
//! assert!((axis[0].separation_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! assert!(axis[0].is_interior && !axis[2].is_interior);
//! ```

mod descriptor;
mod split;
mod spokes;

use std::ops::Index;

use nalgebra::{Point3, Vector3};

pub use descriptor::{compute_descriptors, validate_inputs, DescriptorOptions};
pub use split::{split_interior_exterior, MedialHalf};
pub use spokes::{spoke_segments, Segment};

/// Descriptor record of a single medial-axis sample.
///
/// Vector fields may contain NaN for degenerate configurations (zero-length
/// spokes, parallel or anti-parallel spokes). Consumers must treat NaN as
/// "no information" rather than as a valid direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedialPoint {
    /// Center of the medial ball.
    pub coordinate: Point3<f64>,
    /// Index of the surface sample that generated this medial point ("qidx").
    pub feature_index: usize,
    /// Distance from the center to the primary feature point.
    pub radius: f64,
    /// Vector from the center to the primary feature point.
    pub spoke_primary: Vector3<f64>,
    /// Vector from the center to the secondary feature point.
    pub spoke_secondary: Vector3<f64>,
    /// Normalized sum of the two normalized spokes.
    pub bisector: Vector3<f64>,
    /// Angle between the two spokes, in radians within `[0, π]`.
    pub separation_angle: f64,
    /// Normalized cross product of the two normalized spokes.
    pub spoke_cross: Vector3<f64>,
    /// Whether this sample lies on the interior side of the surface.
    pub is_interior: bool,
}

impl MedialPoint {
    /// Returns true if any descriptor field is NaN.
    pub fn is_degenerate(&self) -> bool {
        self.radius.is_nan()
            || self.separation_angle.is_nan()
            || has_nan(&self.bisector)
            || has_nan(&self.spoke_cross)
    }
}

#[inline]
fn has_nan(v: &Vector3<f64>) -> bool {
    v.iter().any(|c| c.is_nan())
}

/// Descriptor table for a complete medial-axis transform.
///
/// Holds `2m` medial points for `m` surface samples, in the positional
/// interior-then-exterior layout of the medial-axis computation.
#[derive(Debug, Clone)]
pub struct MedialAxis {
    points: Vec<MedialPoint>,
    surface_len: usize,
}

impl MedialAxis {
    pub(crate) fn new(points: Vec<MedialPoint>, surface_len: usize) -> Self {
        debug_assert_eq!(points.len(), 2 * surface_len);
        Self {
            points,
            surface_len,
        }
    }

    /// Number of medial points (`2m`).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of surface samples the axis was computed from (`m`).
    #[inline]
    pub fn surface_len(&self) -> usize {
        self.surface_len
    }

    /// All medial points.
    #[inline]
    pub fn points(&self) -> &[MedialPoint] {
        &self.points
    }

    /// Iterate over all medial points.
    pub fn iter(&self) -> std::slice::Iter<'_, MedialPoint> {
        self.points.iter()
    }

    /// The interior half (first `m` entries).
    #[inline]
    pub fn interior(&self) -> &[MedialPoint] {
        &self.points[..self.surface_len]
    }

    /// The exterior half (last `m` entries).
    #[inline]
    pub fn exterior(&self) -> &[MedialPoint] {
        &self.points[self.surface_len..]
    }

    /// Surface sample index that generated medial point `i`, `None` if `i` is
    /// out of range.
    #[inline]
    pub fn surface_index(&self, i: usize) -> Option<usize> {
        (i < self.points.len()).then(|| i % self.surface_len)
    }

    /// Ball centers of all medial points.
    pub fn coordinates(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.coordinate).collect()
    }

    /// Ball radii of all medial points.
    pub fn radii(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.radius).collect()
    }

    /// Separation angles of all medial points.
    pub fn separation_angles(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.separation_angle).collect()
    }

    /// Bisectors of all medial points.
    pub fn bisectors(&self) -> Vec<Vector3<f64>> {
        self.points.iter().map(|p| p.bisector).collect()
    }

    /// Number of medial points with at least one NaN descriptor.
    pub fn num_degenerate(&self) -> usize {
        self.points.iter().filter(|p| p.is_degenerate()).count()
    }
}

impl Index<usize> for MedialAxis {
    type Output = MedialPoint;

    #[inline]
    fn index(&self, i: usize) -> &MedialPoint {
        &self.points[i]
    }
}

impl<'a> IntoIterator for &'a MedialAxis {
    type Item = &'a MedialPoint;
    type IntoIter = std::slice::Iter<'a, MedialPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(x: f64, interior: bool) -> MedialPoint {
        MedialPoint {
            coordinate: Point3::new(x, 0.0, 0.0),
            feature_index: 0,
            radius: 1.0,
            spoke_primary: Vector3::x(),
            spoke_secondary: Vector3::y(),
            bisector: Vector3::new(1.0, 1.0, 0.0).normalize(),
            separation_angle: std::f64::consts::FRAC_PI_2,
            spoke_cross: Vector3::z(),
            is_interior: interior,
        }
    }

    #[test]
    fn test_halves_and_surface_index() {
        let points = vec![
            record(0.0, true),
            record(1.0, true),
            record(2.0, true),
            record(0.0, false),
            record(1.0, false),
            record(2.0, false),
        ];
        let axis = MedialAxis::new(points, 3);

        assert_eq!(axis.len(), 6);
        assert_eq!(axis.surface_len(), 3);
        assert!(axis.interior().iter().all(|p| p.is_interior));
        assert!(axis.exterior().iter().all(|p| !p.is_interior));

        assert_eq!(axis.surface_index(0), Some(0));
        assert_eq!(axis.surface_index(5), Some(2));
        assert_eq!(axis.surface_index(6), None);
        assert_eq!(axis.num_degenerate(), 0);
    }

    #[test]
    fn test_empty_axis() {
        let axis = MedialAxis::new(Vec::new(), 0);
        assert!(axis.is_empty());
        assert_eq!(axis.surface_index(0), None);
        assert!(axis.interior().is_empty());
        assert!(axis.exterior().is_empty());
    }

    #[test]
    fn test_degenerate_detection() {
        let mut p = record(0.0, true);
        assert!(!p.is_degenerate());
        p.spoke_cross = Vector3::new(f64::NAN, f64::NAN, f64::NAN);
        assert!(p.is_degenerate());
    }
}
