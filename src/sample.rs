//! Synthetic point clouds for experiments and benchmarks.

use nalgebra::{Point3, Vector3};

/// An oriented point cloud with one scalar value per point.
#[derive(Debug, Clone, Default)]
pub struct SampleCloud {
    /// Point positions.
    pub points: Vec<Point3<f64>>,
    /// Unit normals, one per point.
    pub normals: Vec<Vector3<f64>>,
    /// Scalar value per point, constant per sampled plane.
    pub values: Vec<f64>,
}

/// Sample two orthogonal planes meeting along the y axis on a `grid` x `grid` lattice.
///
/// Points alternate between the `z = 0` plane (normal `+z`, value 0) and the
/// `x = 0` plane (normal `+x`, value 42).
///
/// # Example
///
/// ```
/// use marrow::sample::orthogonal_planes;
///
/// let cloud = orthogonal_planes(10);
/// assert_eq!(cloud.points.len(), 200);
/// assert_eq!(cloud.values[1], 42.0);
/// ```
pub fn orthogonal_planes(grid: usize) -> SampleCloud {
    let mut cloud = SampleCloud {
        points: Vec::with_capacity(2 * grid * grid),
        normals: Vec::with_capacity(2 * grid * grid),
        values: Vec::with_capacity(2 * grid * grid),
    };

    for i in 0..grid {
        for j in 0..grid {
            let (a, b) = (i as f64, j as f64);

            cloud.points.push(Point3::new(a, b, 0.0));
            cloud.normals.push(Vector3::z());
            cloud.values.push(0.0);

            cloud.points.push(Point3::new(0.0, b, a));
            cloud.normals.push(Vector3::x());
            cloud.values.push(42.0);
        }
    }

    cloud
}
