pub mod bboxes;
pub mod massing;
pub mod point;
pub mod polygon;
pub mod ray;
pub mod segment;
pub mod vector;

/// Geometric precision [m]
const EPS: f64 = 1e-9;
