//! Procedural meshes for the hit-test scenes: a torus, lattice planes and
//! spheres, a catalogue of malformed meshes, and non-indexed flattening.

pub mod degenerate;
pub mod plane;
pub mod sphere;
pub mod torus;

use basic3d_kernel::geometry::point::{Point2d, Point3d};
use basic3d_kernel::geometry::vector::Vec3;
use basic3d_kernel::mesh::MeshGeometry;
use thiserror::Error;

pub use degenerate::DegenerateMesh;
pub use plane::PlaneXY;
pub use sphere::Sphere;
pub use torus::Torus;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be at least 2, got {value}")]
    TooFewSegments { name: &'static str, value: usize },
    #[error("{name} must be a non-negative finite number, got {value}")]
    InvalidRadius { name: &'static str, value: f64 },
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("a {rows} x {cols} lattice has more vertices than an i32 index can address")]
    TooManyVertices { rows: usize, cols: usize },
}

pub(crate) fn check_segments(name: &'static str, value: usize) -> Result<usize, GeometryError> {
    if value < 2 {
        return Err(GeometryError::TooFewSegments { name, value });
    }
    Ok(value)
}

/// Reject lattices whose vertex indices would not fit in `i32`.
pub(crate) fn check_lattice(rows: usize, cols: usize) -> Result<(), GeometryError> {
    match rows.checked_mul(cols) {
        Some(total) if total <= i32::MAX as usize => Ok(()),
        _ => Err(GeometryError::TooManyVertices { rows, cols }),
    }
}

pub(crate) fn check_radius(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(GeometryError::InvalidRadius { name, value });
    }
    Ok(value)
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NonFinite { name, value });
    }
    Ok(value)
}

/// One sampled lattice vertex.
pub(crate) struct LatticeVertex {
    pub position: Point3d,
    pub normal: Vec3,
    pub texture: Point2d,
}

/// Build a `rows x cols` vertex lattice with two triangles per cell.
/// Callers validate the size with `check_lattice` first.
///
/// Vertex `(i, j)` lands at index `i * cols + j`. Each cell joins row
/// `i - 1` to row `i` and column `j - 1` to column `j`; with `wrap` the
/// first row and column also close against the last ones, so a periodic
/// surface has no seam duplicates.
pub(crate) fn lattice(
    rows: usize,
    cols: usize,
    wrap: bool,
    sample: impl Fn(usize, usize) -> LatticeVertex,
) -> MeshGeometry {
    let mut mesh = MeshGeometry::new();
    for i in 0..rows {
        for j in 0..cols {
            let v = sample(i, j);
            mesh.add_vertex(v.position, v.normal);
            mesh.texture_coordinates.push(v.texture);
        }
    }

    let start = if wrap { 0 } else { 1 };
    let index = |i: usize, j: usize| (i * cols + j) as i32;
    for i in start..rows {
        let ip = if i == 0 { rows - 1 } else { i - 1 };
        for j in start..cols {
            let jp = if j == 0 { cols - 1 } else { j - 1 };
            let a = index(ip, jp);
            let b = index(i, jp);
            let c = index(i, j);
            let d = index(ip, j);
            mesh.add_triangle(a, b, c);
            mesh.add_triangle(a, c, d);
        }
    }
    mesh
}

/// Expand an indexed mesh into consecutive position triples.
///
/// Normals and texture coordinates are carried along only when they are
/// parallel to the positions. A non-indexed mesh is returned unchanged.
pub fn flatten(mesh: &MeshGeometry) -> MeshGeometry {
    if !mesh.is_indexed() {
        return mesh.clone();
    }
    let keep_normals = mesh.normals.len() == mesh.positions.len();
    let keep_texture = mesh.texture_coordinates.len() == mesh.positions.len();

    let mut flat = MeshGeometry::new();
    for tri in mesh.triangles() {
        for i in tri {
            flat.positions.push(mesh.positions[i]);
            if keep_normals {
                flat.normals.push(mesh.normals[i]);
            }
            if keep_texture {
                flat.texture_coordinates.push(mesh.texture_coordinates[i]);
            }
        }
    }
    tracing::debug!(
        triangles = flat.triangle_count(),
        vertices = flat.vertex_count(),
        "flattened mesh"
    );
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_vertex(i: usize, j: usize) -> LatticeVertex {
        LatticeVertex {
            position: Point3d::new(j as f64, -(i as f64), 0.0),
            normal: Vec3::Z,
            texture: Point2d::new(j as f64, i as f64),
        }
    }

    #[test]
    fn test_open_lattice_counts() {
        let mesh = lattice(3, 4, false, flat_vertex);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 2 * 2 * 3);
        assert!(mesh.unreferenced_vertices().is_empty());
    }

    #[test]
    fn test_wrapped_lattice_counts() {
        let mesh = lattice(3, 4, true, flat_vertex);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 2 * 3 * 4);
    }

    #[test]
    fn test_flatten_preserves_triangles() {
        let mesh = lattice(2, 2, false, flat_vertex);
        let flat = flatten(&mesh);
        assert!(!flat.is_indexed());
        assert_eq!(flat.triangle_count(), mesh.triangle_count());
        assert_eq!(flat.normals.len(), flat.positions.len());
        let originals: Vec<[usize; 3]> = mesh.triangles().collect();
        for (t, tri) in originals.iter().enumerate() {
            for k in 0..3 {
                assert_eq!(flat.positions[3 * t + k], mesh.positions[tri[k]]);
            }
        }
    }

    #[test]
    fn test_flatten_drops_mismatched_attributes() {
        let mut mesh = lattice(2, 2, false, flat_vertex);
        mesh.normals.pop();
        mesh.triangle_indices.extend_from_slice(&[0, 1, 99]);
        let flat = flatten(&mesh);
        assert!(flat.normals.is_empty());
        assert_eq!(flat.texture_coordinates.len(), flat.positions.len());
        assert_eq!(flat.triangle_count(), 2);
    }

    #[test]
    fn test_validation_helpers() {
        assert!(check_segments("segments", 1).is_err());
        assert_eq!(check_segments("segments", 2), Ok(2));
        assert!(check_radius("radius", -0.1).is_err());
        assert!(check_radius("radius", f64::NAN).is_err());
        assert_eq!(check_radius("radius", 0.0), Ok(0.0));
        assert!(check_finite("width", f64::INFINITY).is_err());
    }

    #[test]
    fn test_lattice_size_limit() {
        assert_eq!(check_lattice(2, i32::MAX as usize / 2), Ok(()));
        assert_eq!(
            check_lattice(2, i32::MAX as usize),
            Err(GeometryError::TooManyVertices {
                rows: 2,
                cols: i32::MAX as usize
            })
        );
        assert!(check_lattice(usize::MAX, 2).is_err());
    }
}
