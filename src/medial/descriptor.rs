//! Per-sample medial geometry.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::{MatError, Result};

use super::{MedialAxis, MedialPoint};

/// Options for descriptor computation.
#[derive(Debug, Clone)]
pub struct DescriptorOptions {
    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl DescriptorOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Check that the medial arrays match the surface point set.
///
/// `normals` must have one entry per surface point, `medial_coords` and
/// `feature_indices` two entries per surface point, and every feature index
/// must address a surface point.
pub fn validate_inputs(
    points: &[Point3<f64>],
    normals: &[Vector3<f64>],
    medial_coords: &[Point3<f64>],
    feature_indices: &[usize],
) -> Result<()> {
    let m = points.len();
    if normals.len() != m {
        return Err(MatError::shape("normals", m, normals.len()));
    }
    if medial_coords.len() != 2 * m {
        return Err(MatError::shape("medial_coords", 2 * m, medial_coords.len()));
    }
    if feature_indices.len() != 2 * m {
        return Err(MatError::shape("feature_indices", 2 * m, feature_indices.len()));
    }
    if let Some((position, &index)) = feature_indices.iter().enumerate().find(|(_, &q)| q >= m) {
        return Err(MatError::IndexOutOfRange {
            position,
            index,
            len: m,
        });
    }
    Ok(())
}

/// Compute the descriptor table of a medial-axis transform.
///
/// For medial point `i` with center `c`, the primary feature point is
/// `points[i % m]` and the secondary feature point is `points[feature_indices[i]]`.
/// The first `m` medial points are flagged as interior.
///
/// Inputs are validated with [`validate_inputs`] before anything is computed.
/// Degenerate geometry never fails: zero-length, parallel or anti-parallel
/// spokes yield NaN components in the affected fields.
///
/// # Example
///
/// ```
/// use marrow::medial::{compute_descriptors, DescriptorOptions};
/// use nalgebra::{Point3, Vector3};
///
/// let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 2.0)];
/// let normals = vec![Vector3::z(), -Vector3::z()];
/// let medial = vec![Point3::new(0.0, 0.0, 1.0); 4];
/// let qidx = vec![1, 0, 1, 0];
///
/// let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
///     .unwrap();
///
/// // Opposite spokes: the ball touches both planes, the bisector is undefined.
/// assert_eq!(axis[0].radius, 1.0);
/// assert_eq!(axis[0].separation_angle, std::f64::consts::PI);
/// assert!(axis[0].bisector.x.is_nan());
/// ```
pub fn compute_descriptors(
    points: &[Point3<f64>],
    normals: &[Vector3<f64>],
    medial_coords: &[Point3<f64>],
    feature_indices: &[usize],
    options: &DescriptorOptions,
) -> Result<MedialAxis> {
    validate_inputs(points, normals, medial_coords, feature_indices)?;

    let m = points.len();
    let describe = |i: usize| {
        let primary = &points[i % m];
        let secondary = &points[feature_indices[i]];
        describe_sample(&medial_coords[i], primary, secondary, feature_indices[i], i < m)
    };

    let records: Vec<MedialPoint> = if options.parallel {
        (0..2 * m).into_par_iter().map(describe).collect()
    } else {
        (0..2 * m).map(describe).collect()
    };

    log::debug!(
        "computed {} medial descriptors for {} surface points",
        records.len(),
        m
    );

    Ok(MedialAxis::new(records, m))
}

/// Descriptors of one medial ball centered at `center` touching `f1` and `f2`.
fn describe_sample(
    center: &Point3<f64>,
    f1: &Point3<f64>,
    f2: &Point3<f64>,
    feature_index: usize,
    is_interior: bool,
) -> MedialPoint {
    let spoke_primary = f1 - center;
    let spoke_secondary = f2 - center;

    let n1 = unit(&spoke_primary);
    let n2 = unit(&spoke_secondary);

    MedialPoint {
        coordinate: *center,
        feature_index,
        radius: spoke_primary.norm(),
        spoke_primary,
        spoke_secondary,
        bisector: unit(&(n1 + n2)),
        separation_angle: n1.dot(&n2).clamp(-1.0, 1.0).acos(),
        spoke_cross: unit(&n1.cross(&n2)),
        is_interior,
    }
}

/// Divide by the magnitude; a zero vector becomes NaN.
#[inline]
fn unit(v: &Vector3<f64>) -> Vector3<f64> {
    v / v.norm()
}
