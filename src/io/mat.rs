//! Plain-text MAT records.
//!
//! One row per surface sample `i`, pairing it with its interior medial point
//! `i` and exterior medial point `i + m`:
//!
//! ```text
//! x y z x_mat1 y_mat1 z_mat1 x_mat2 y_mat2 z_mat2 radius_1 radius_2 sepangle_1 sepangle_2
//! ```
//!
//! Every value is written with two decimals. Separation angles are in radians.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MatError, Result};
use crate::medial::MedialAxis;

const HEADER: &str =
    "x y z x_mat1 y_mat1 z_mat1 x_mat2 y_mat2 z_mat2 radius_1 radius_2 sepangle_1 sepangle_2";

/// Write MAT records for `points` and their medial axis to `writer`.
///
/// `offset` is added to every coordinate (surface and medial).
pub fn write_mat_records<W: Write>(
    writer: &mut W,
    points: &[Point3<f64>],
    axis: &MedialAxis,
    offset: &Vector3<f64>,
) -> Result<()> {
    if axis.surface_len() != points.len() {
        return Err(MatError::shape("points", axis.surface_len(), points.len()));
    }

    writeln!(writer, "{}", HEADER)?;

    for ((p, inner), outer) in points.iter().zip(axis.interior()).zip(axis.exterior()) {
        let p = p + offset;
        let c1 = inner.coordinate + offset;
        let c2 = outer.coordinate + offset;
        writeln!(
            writer,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            p.x,
            p.y,
            p.z,
            c1.x,
            c1.y,
            c1.z,
            c2.x,
            c2.y,
            c2.z,
            inner.radius,
            outer.radius,
            inner.separation_angle,
            outer.separation_angle
        )?;
    }

    Ok(())
}

/// Save MAT records to a file.
///
/// # Example
///
/// ```no_run
/// use marrow::io::mat::save_mat_records;
/// use marrow::medial::{compute_descriptors, DescriptorOptions};
/// use nalgebra::{Point3, Vector3};
///
/// # let points: Vec<Point3<f64>> = Vec::new();
/// # let normals: Vec<Vector3<f64>> = Vec::new();
/// # let medial: Vec<Point3<f64>> = Vec::new();
/// # let qidx: Vec<usize> = Vec::new();
/// let axis = compute_descriptors(&points, &normals, &medial, &qidx, &DescriptorOptions::default())
///     .unwrap();
/// save_mat_records("mat.txt", &points, &axis, &Vector3::zeros()).unwrap();
/// ```
pub fn save_mat_records<P: AsRef<Path>>(
    path: P,
    points: &[Point3<f64>],
    axis: &MedialAxis,
    offset: &Vector3<f64>,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_mat_records(&mut writer, points, axis, offset)?;
    writer.flush()?;
    Ok(())
}
