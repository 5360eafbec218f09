//! PLY (Stanford polygon) point cloud support.
//!
//! Three kinds of point clouds are exchanged as PLY `vertex` elements:
//!
//! - oriented surface samples: `x y z nx ny nz`
//! - medial points from the external medial-axis computation: `x y z qidx`
//! - segmented points: `x y z segment_id`, written as ASCII or binary

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::{MatError, Result};

/// Options for writing segmented point clouds.
#[derive(Debug, Clone)]
pub struct PlyOptions {
    /// Write binary little endian instead of ASCII (default: false).
    pub binary: bool,
    /// Translation added to every written coordinate.
    pub offset: Vector3<f64>,
}

impl Default for PlyOptions {
    fn default() -> Self {
        Self {
            binary: false,
            offset: Vector3::zeros(),
        }
    }
}

impl PlyOptions {
    /// Set binary output.
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Set the coordinate offset.
    pub fn with_offset(mut self, offset: Vector3<f64>) -> Self {
        self.offset = offset;
        self
    }
}

/// Load surface samples with normals.
///
/// # Example
///
/// ```no_run
/// use marrow::io::ply;
///
/// let (points, normals) = ply::load_oriented_points("scan.ply").unwrap();
/// assert_eq!(points.len(), normals.len());
/// ```
pub fn load_oriented_points<P: AsRef<Path>>(path: P) -> Result<(Vec<Point3<f64>>, Vec<Vector3<f64>>)> {
    let path = path.as_ref();
    let vertices = read_vertices(path)?;

    let mut points = Vec::with_capacity(vertices.len());
    let mut normals = Vec::with_capacity(vertices.len());
    for vertex in &vertices {
        points.push(read_triple(path, vertex, ["x", "y", "z"])?.into());
        normals.push(read_triple(path, vertex, ["nx", "ny", "nz"])?);
    }

    Ok((points, normals))
}

/// Load medial points with their feature indices (`qidx` property).
pub fn load_medial_points<P: AsRef<Path>>(path: P) -> Result<(Vec<Point3<f64>>, Vec<usize>)> {
    let path = path.as_ref();
    let vertices = read_vertices(path)?;

    let mut coords = Vec::with_capacity(vertices.len());
    let mut qidx = Vec::with_capacity(vertices.len());
    for vertex in &vertices {
        coords.push(read_triple(path, vertex, ["x", "y", "z"])?.into());

        let index = get_int_property(vertex, "qidx").ok_or_else(|| load_error(path, "vertex missing qidx"))?;
        let index = usize::try_from(index)
            .map_err(|_| load_error(path, &format!("negative qidx {}", index)))?;
        qidx.push(index);
    }

    Ok((coords, qidx))
}

/// Load segmented points (`segment_id` property).
pub fn load_labelled_points<P: AsRef<Path>>(path: P) -> Result<(Vec<Point3<f64>>, Vec<i32>)> {
    let path = path.as_ref();
    let vertices = read_vertices(path)?;

    let mut points = Vec::with_capacity(vertices.len());
    let mut labels = Vec::with_capacity(vertices.len());
    for vertex in &vertices {
        points.push(read_triple(path, vertex, ["x", "y", "z"])?.into());

        let label = get_int_property(vertex, "segment_id")
            .ok_or_else(|| load_error(path, "vertex missing segment_id"))?;
        let label = i32::try_from(label)
            .map_err(|_| load_error(path, &format!("segment_id {} out of range", label)))?;
        labels.push(label);
    }

    Ok((points, labels))
}

fn read_vertices(path: &Path) -> Result<Vec<DefaultElement>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let mut ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(path, &e.to_string()))?;

    ply.payload
        .remove("vertex")
        .ok_or_else(|| load_error(path, "PLY file has no vertex element"))
}

fn read_triple(path: &Path, element: &DefaultElement, names: [&str; 3]) -> Result<Vector3<f64>> {
    let mut v = Vector3::zeros();
    for (c, name) in names.iter().enumerate() {
        v[c] = get_float_property(element, name)
            .ok_or_else(|| load_error(path, &format!("vertex missing {}", name)))?;
    }
    Ok(v)
}

fn load_error(path: &Path, message: &str) -> MatError {
    MatError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_int_property(element: &DefaultElement, name: &str) -> Option<i64> {
    match element.get(name)? {
        Property::Int(v) => Some(*v as i64),
        Property::UInt(v) => Some(*v as i64),
        Property::Short(v) => Some(*v as i64),
        Property::UShort(v) => Some(*v as i64),
        Property::Char(v) => Some(*v as i64),
        Property::UChar(v) => Some(*v as i64),
        _ => None,
    }
}

/// Save surface samples with normals (ASCII, full precision).
pub fn save_oriented_points<P: AsRef<Path>>(
    points: &[Point3<f64>],
    normals: &[Vector3<f64>],
    path: P,
) -> Result<()> {
    if normals.len() != points.len() {
        return Err(MatError::shape("normals", points.len(), normals.len()));
    }

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by marrow")?;
    writeln!(writer, "element vertex {}", points.len())?;
    for name in ["x", "y", "z", "nx", "ny", "nz"] {
        writeln!(writer, "property double {}", name)?;
    }
    writeln!(writer, "end_header")?;

    for (p, n) in points.iter().zip(normals) {
        writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, n.x, n.y, n.z)?;
    }

    writer.flush()?;
    Ok(())
}

/// Save segmented points with an integer `segment_id` per point.
///
/// ASCII output uses two decimals for coordinates; binary output keeps full
/// double precision.
///
/// # Example
///
/// ```no_run
/// use marrow::io::ply::{save_labelled_points, PlyOptions};
/// use nalgebra::Point3;
///
/// let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
/// save_labelled_points(&points, &[0, -1], "segments.ply", &PlyOptions::default().with_binary(true))
///     .unwrap();
/// ```
pub fn save_labelled_points<P: AsRef<Path>>(
    points: &[Point3<f64>],
    labels: &[i32],
    path: P,
    options: &PlyOptions,
) -> Result<()> {
    let path = path.as_ref();
    if labels.len() != points.len() {
        return Err(MatError::shape("labels", points.len(), labels.len()));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let offset = &options.offset;

    if options.binary {
        let mut ply = labelled_ply(points, labels, offset);
        ply.make_consistent().map_err(|e| MatError::SaveError {
            path: path.to_path_buf(),
            message: format!("{:?}", e),
        })?;
        Writer::new().write_ply(&mut writer, &mut ply)?;
    } else {
        writeln!(writer, "ply")?;
        writeln!(writer, "format ascii 1.0")?;
        writeln!(writer, "comment Generated by marrow")?;
        writeln!(writer, "element vertex {}", points.len())?;
        writeln!(writer, "property double x")?;
        writeln!(writer, "property double y")?;
        writeln!(writer, "property double z")?;
        writeln!(writer, "property int segment_id")?;
        writeln!(writer, "end_header")?;

        for (p, label) in points.iter().zip(labels) {
            let q = p + offset;
            writeln!(writer, "{:.2} {:.2} {:.2} {}", q.x, q.y, q.z, label)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn labelled_ply(points: &[Point3<f64>], labels: &[i32], offset: &Vector3<f64>) -> Ply<DefaultElement> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::BinaryLittleEndian;
    ply.header.comments.push("Generated by marrow".to_string());

    let mut vertex = ElementDef::new("vertex".to_string());
    for name in ["x", "y", "z"] {
        vertex.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::Double),
        ));
    }
    vertex.properties.add(PropertyDef::new(
        "segment_id".to_string(),
        PropertyType::Scalar(ScalarType::Int),
    ));
    ply.header.elements.add(vertex);

    let elements: Vec<DefaultElement> = points
        .iter()
        .zip(labels)
        .map(|(p, &label)| {
            let q = p + offset;
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Double(q.x));
            element.insert("y".to_string(), Property::Double(q.y));
            element.insert("z".to_string(), Property::Double(q.z));
            element.insert("segment_id".to_string(), Property::Int(label));
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), elements);

    ply
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("marrow_{}_{}.ply", name, std::process::id()))
    }

    #[test]
    fn test_oriented_points_round_trip() {
        let path = temp_path("oriented");
        let points = vec![Point3::new(0.1, -2.5, 3.0), Point3::new(1e-3, 4.0, -7.25)];
        let normals = vec![Vector3::z(), Vector3::new(0.6, 0.8, 0.0)];

        save_oriented_points(&points, &normals, &path).unwrap();
        let (loaded_points, loaded_normals) = load_oriented_points(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded_points, points);
        assert_eq!(loaded_normals, normals);
    }

    #[test]
    fn test_labelled_ascii_uses_two_decimals() {
        let path = temp_path("labelled_ascii");
        let points = vec![Point3::new(1.25, 2.5, -3.75), Point3::new(0.125, 0.0, 1.0)];
        let options = PlyOptions::default().with_offset(Vector3::new(100.0, 0.0, 0.0));

        save_labelled_points(&points, &[3, -1], &path, &options).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let (loaded, labels) = load_labelled_points(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(text.contains("property int segment_id"));
        assert!(text.contains("101.25 2.50 -3.75 3"));
        assert_eq!(loaded[0], Point3::new(101.25, 2.5, -3.75));
        assert_eq!(labels, vec![3, -1]);
    }

    #[test]
    fn test_labelled_binary_round_trip() {
        let path = temp_path("labelled_binary");
        let points = vec![
            Point3::new(0.123456789, -2.0, 3.5),
            Point3::new(1e6, 4.0, -7.25),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let labels = vec![0, 7, -1];

        save_labelled_points(&points, &labels, &path, &PlyOptions::default().with_binary(true)).unwrap();
        let (loaded, loaded_labels) = load_labelled_points(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, points);
        assert_eq!(loaded_labels, labels);
    }

    #[test]
    fn test_load_medial_points() {
        let path = temp_path("medial");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nproperty float y\n\
             property float z\nproperty int qidx\nend_header\n0.5 0 1 3\n-1 2 0.25 0\n",
        )
        .unwrap();

        let (coords, qidx) = load_medial_points(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(coords, vec![Point3::new(0.5, 0.0, 1.0), Point3::new(-1.0, 2.0, 0.25)]);
        assert_eq!(qidx, vec![3, 0]);
    }

    #[test]
    fn test_missing_normals_is_load_error() {
        let path = temp_path("no_normals");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\n\
             property float z\nend_header\n0 0 0\n",
        )
        .unwrap();

        let err = load_oriented_points(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, MatError::LoadError { .. }));
    }

    #[test]
    fn test_label_count_mismatch() {
        let err = save_labelled_points(
            &[Point3::origin()],
            &[],
            temp_path("never_written"),
            &PlyOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MatError::InputShapeMismatch { what: "labels", .. }));
    }
}
