use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::warn;
use serde::Deserialize;

/// Scan-head position in device bit units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point
{
    pub x: i32,
    pub y: i32
}

impl Point
{
    pub fn new(x: i32, y: i32) -> Point
    {
        Point {x, y}
    }
}

impl std::fmt::Display for Point
{
    fn fmt(self: &Self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point
{
    fn from((x, y): (i32, i32)) -> Point {
        Point {x, y}
    }
}

/// 2x2 linear correction applied to every compiled coordinate.
///
/// Row major: `x' = m[0]*x + m[1]*y`, `y' = m[2]*x + m[3]*y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub matrix : [f64;4]
}

fn matrix_mul(a: &[f64; 4], b: &[f64; 4]) -> [f64; 4]
{
    [a[0] * b[0] + a[1] * b[2],
     a[0] * b[1] + a[1] * b[3],
     a[2] * b[0] + a[3] * b[2],
     a[2] * b[1] + a[3] * b[3]]
}

impl CoordinateTransform {
    pub fn new(m :&[f64; 4]) -> CoordinateTransform {
        CoordinateTransform{matrix: *m}
    }
    pub fn identity() -> CoordinateTransform {
        CoordinateTransform{matrix:[1.0, 0.0, 0.0, 1.0]}
    }

    pub fn scale_xy(sx: f64, sy: f64) -> CoordinateTransform {
        CoordinateTransform{matrix:[sx, 0.0, 0.0, sy]}
    }

    // Angle in radians, counter-clockwise
    pub fn rotate(a: f64) -> CoordinateTransform {
        let (s,c) = a.sin_cos();
        CoordinateTransform{matrix:[c, -s, s, c]}
    }

    pub fn is_identity(&self) -> bool
    {
        *self == CoordinateTransform::identity()
    }

    /// Corrects a point. Each coordinate is truncated toward zero.
    pub fn apply(&self, p: Point) -> Point
    {
        let x = p.x as f64;
        let y = p.y as f64;
        Point {x: (self.matrix[0] * x + self.matrix[1] * y).trunc() as i32,
               y: (self.matrix[2] * x + self.matrix[3] * y).trunc() as i32}
    }

    /// Reads a correction matrix from a JSON file of the form
    /// `{"matrix": [[a, b], [c, d]]}`.
    pub fn from_file(path: &Path) -> Result<CoordinateTransform, TransformLoadError>
    {
        let file = File::open(path)
            .map_err(|e| TransformLoadError(format!("Failed to open {}: {}",
                                                    path.display(), e)))?;
        let reader = BufReader::new(file);
        let file: CorrectionFile = serde_json::from_reader(reader)
            .map_err(|e| TransformLoadError(format!("Failed to parse {}: {}",
                                                    path.display(), e)))?;
        CoordinateTransform::from_rows(file.matrix)
            .map_err(|e| TransformLoadError(format!("{}: {}", path.display(), e)))
    }

    /// Builds a transform from `[[a, b], [c, d]]`. Every entry must be finite.
    pub fn from_rows(rows: [[f64; 2]; 2]) -> Result<CoordinateTransform, TransformLoadError>
    {
        let [[a, b], [c, d]] = rows;
        let matrix = [a, b, c, d];
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(TransformLoadError(
                format!("Non-finite entry in correction matrix {:?}", rows)));
        }
        Ok(CoordinateTransform {matrix})
    }

    /// Like `from_file` but never fails. A missing or malformed file gives
    /// the identity matrix, a warning, and the reason as second value.
    pub fn load_or_identity(path: &Path)
                            -> (CoordinateTransform, Option<TransformLoadError>)
    {
        match CoordinateTransform::from_file(path) {
            Ok(t) => (t, None),
            Err(e) => {
                warn!("{}; using identity correction", e);
                (CoordinateTransform::identity(), Some(e))
            }
        }
    }
}

impl Default for CoordinateTransform
{
    fn default() -> CoordinateTransform {
        CoordinateTransform::identity()
    }
}

impl std::ops::Mul for CoordinateTransform {
    type Output = CoordinateTransform;
    fn mul(self, t: Self) -> Self {
        CoordinateTransform {matrix: matrix_mul(&self.matrix, &t.matrix)}
    }
}

impl std::ops::Mul<Point> for CoordinateTransform {
    type Output = Point;
    fn mul(self, p: Point) -> Point {
        self.apply(p)
    }
}

#[derive(Deserialize)]
struct CorrectionFile
{
    matrix: [[f64; 2]; 2]
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransformLoadError(String);

#[cfg(test)]
fn assert_matrix_eq(a:&[f64;4], b:&[f64;4])
{
    for (a,b) in a.iter().zip(b) {
        if (a-b).abs() > 1e-5 {
            panic!("{} != {}", a,b);
        }
    }
}

#[test]
fn test_transform()
{
    let a = CoordinateTransform::identity();
    let b = CoordinateTransform::identity();
    assert_eq!(a*b, CoordinateTransform::identity());
    let a = CoordinateTransform::new(&[1.3, 7.1, -23.0, 8.0]);
    let b = CoordinateTransform::new(&[4.3, 0.1, 23.0, 18.7]);
    assert_matrix_eq(&(a*b).matrix, &[168.89, 132.9, 85.1, 147.3]);
}

#[test]
fn test_apply_truncates_toward_zero()
{
    let t = CoordinateTransform::scale_xy(0.5, 0.5);
    assert_eq!(t.apply(Point::new(3, -3)), Point::new(1, -1));
    let t = CoordinateTransform::new(&[1.0, 0.5, 0.0, 1.0]);
    assert_eq!(t * Point::new(10, 5), Point::new(12, 5));
}

#[test]
fn test_identity_keeps_points()
{
    let t = CoordinateTransform::default();
    for &(x, y) in &[(0, 0), (-100, 100), (i32::MAX, i32::MIN), (33, -7)] {
        assert_eq!(t.apply(Point::new(x, y)), Point::new(x, y));
    }
}

#[test]
fn test_rotate_quarter_turn()
{
    let t = CoordinateTransform::rotate(std::f64::consts::FRAC_PI_2);
    let p = t.apply(Point::new(1000, 0));
    assert!(p.x.abs() <= 1);
    assert_eq!(p.y, 1000);
}

#[cfg(test)]
fn write_correction(name: &str, text: &str) -> std::path::PathBuf
{
    let path = std::env::temp_dir().join(format!("rtc_paths_{}_{}.json",
                                                 name, std::process::id()));
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_load_correction_file()
{
    let path = write_correction("scale", r#"{"matrix": [[2, 0], [0, 1.5]]}"#);
    let (t, err) = CoordinateTransform::load_or_identity(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(err.is_none());
    assert_matrix_eq(&t.matrix, &[2.0, 0.0, 0.0, 1.5]);
    assert_eq!(t.apply(Point::new(10, 10)), Point::new(20, 15));
}

#[test]
fn test_malformed_correction_file()
{
    let path = write_correction("malformed", r#"{"matrix": [[1, 0], [0]]}"#);
    let (t, err) = CoordinateTransform::load_or_identity(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(t.is_identity());
    assert!(err.unwrap().to_string().contains("Failed to parse"));
}

#[test]
fn test_non_finite_correction_rejected()
{
    assert!(CoordinateTransform::from_rows([[1.0, f64::NAN], [0.0, 1.0]]).is_err());
    assert!(CoordinateTransform::from_rows([[1.0, 0.0], [f64::INFINITY, 1.0]]).is_err());
    let t = CoordinateTransform::from_rows([[1.0, 0.5], [0.0, 1.0]]).unwrap();
    assert_eq!(t.matrix, [1.0, 0.5, 0.0, 1.0]);
    // JSON cannot spell infinity; overflowing literals fail to parse
    let path = write_correction("inf", r#"{"matrix": [[1e400, 0], [0, 1]]}"#);
    let (t, err) = CoordinateTransform::load_or_identity(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(t.is_identity());
    assert!(err.is_some());
}

#[test]
fn test_missing_correction_file()
{
    let path = Path::new("/nonexistent/correction.json");
    let (t, err) = CoordinateTransform::load_or_identity(path);
    assert!(t.is_identity());
    assert!(err.is_some());
}
