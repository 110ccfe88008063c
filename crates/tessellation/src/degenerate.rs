//! Malformed meshes that hit testing must tolerate without panicking.

use basic3d_kernel::geometry::point::{Point2d, Point3d};
use basic3d_kernel::geometry::vector::Vec3;
use basic3d_kernel::mesh::MeshGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegenerateMesh {
    Empty,
    /// Non-indexed positions whose count is not a multiple of three.
    PartialTriangle,
    OutOfRangeIndices,
    NegativeIndices,
    /// Index list length not a multiple of three.
    PartialIndexTriple,
    MismatchedNormals,
    MismatchedTextureCoordinates,
    ZeroArea,
    RepeatedIndices,
    NanPositions,
    InfinitePositions,
    HugeCoordinates,
}

impl DegenerateMesh {
    pub const ALL: [DegenerateMesh; 12] = [
        DegenerateMesh::Empty,
        DegenerateMesh::PartialTriangle,
        DegenerateMesh::OutOfRangeIndices,
        DegenerateMesh::NegativeIndices,
        DegenerateMesh::PartialIndexTriple,
        DegenerateMesh::MismatchedNormals,
        DegenerateMesh::MismatchedTextureCoordinates,
        DegenerateMesh::ZeroArea,
        DegenerateMesh::RepeatedIndices,
        DegenerateMesh::NanPositions,
        DegenerateMesh::InfinitePositions,
        DegenerateMesh::HugeCoordinates,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DegenerateMesh::Empty => "empty",
            DegenerateMesh::PartialTriangle => "partial triangle",
            DegenerateMesh::OutOfRangeIndices => "out-of-range indices",
            DegenerateMesh::NegativeIndices => "negative indices",
            DegenerateMesh::PartialIndexTriple => "partial index triple",
            DegenerateMesh::MismatchedNormals => "mismatched normals",
            DegenerateMesh::MismatchedTextureCoordinates => "mismatched texture coordinates",
            DegenerateMesh::ZeroArea => "zero-area triangles",
            DegenerateMesh::RepeatedIndices => "repeated indices",
            DegenerateMesh::NanPositions => "NaN positions",
            DegenerateMesh::InfinitePositions => "infinite positions",
            DegenerateMesh::HugeCoordinates => "huge coordinates",
        }
    }

    pub fn build(&self) -> MeshGeometry {
        let mut mesh = MeshGeometry::new();
        match self {
            DegenerateMesh::Empty => {}
            DegenerateMesh::PartialTriangle => {
                mesh.positions = unit_triangle().to_vec();
                mesh.positions.push(Point3d::new(1.0, 1.0, 0.0));
            }
            DegenerateMesh::OutOfRangeIndices => {
                mesh.positions = unit_triangle().to_vec();
                mesh.triangle_indices = vec![0, 1, 3, 0, 1, i32::MAX];
            }
            DegenerateMesh::NegativeIndices => {
                mesh.positions = unit_triangle().to_vec();
                mesh.triangle_indices = vec![0, -1, 2, i32::MIN, 1, 2];
            }
            DegenerateMesh::PartialIndexTriple => {
                mesh.positions = unit_triangle().to_vec();
                mesh.triangle_indices = vec![0, 1, 2, 0, 1];
            }
            DegenerateMesh::MismatchedNormals => {
                mesh.positions = unit_triangle().to_vec();
                mesh.normals = vec![Vec3::Z];
                mesh.triangle_indices = vec![0, 1, 2];
            }
            DegenerateMesh::MismatchedTextureCoordinates => {
                mesh.positions = unit_triangle().to_vec();
                mesh.texture_coordinates = vec![Point2d::ORIGIN; 7];
                mesh.triangle_indices = vec![0, 1, 2];
            }
            DegenerateMesh::ZeroArea => {
                // Collinear, then coincident.
                mesh.positions = vec![
                    Point3d::new(-1.0, 0.0, 0.0),
                    Point3d::new(0.0, 0.0, 0.0),
                    Point3d::new(1.0, 0.0, 0.0),
                    Point3d::new(0.5, 0.5, 0.0),
                    Point3d::new(0.5, 0.5, 0.0),
                    Point3d::new(0.5, 0.5, 0.0),
                ];
            }
            DegenerateMesh::RepeatedIndices => {
                mesh.positions = unit_triangle().to_vec();
                mesh.triangle_indices = vec![0, 0, 0, 1, 1, 2, 2, 2, 2];
            }
            DegenerateMesh::NanPositions => {
                mesh.positions = vec![
                    Point3d::new(f64::NAN, 0.0, 0.0),
                    Point3d::new(1.0, f64::NAN, 0.0),
                    Point3d::new(0.0, 1.0, f64::NAN),
                ];
                mesh.triangle_indices = vec![0, 1, 2];
            }
            DegenerateMesh::InfinitePositions => {
                mesh.positions = vec![
                    Point3d::new(f64::NEG_INFINITY, -1.0, 0.0),
                    Point3d::new(f64::INFINITY, -1.0, 0.0),
                    Point3d::new(0.0, f64::INFINITY, 0.0),
                ];
            }
            DegenerateMesh::HugeCoordinates => {
                mesh.positions = vec![
                    Point3d::new(-1e300, -1e300, 0.0),
                    Point3d::new(1e300, -1e300, 0.0),
                    Point3d::new(0.0, 1e300, 0.0),
                ];
                mesh.triangle_indices = vec![0, 1, 2];
            }
        }
        mesh
    }

    /// Every catalogue entry, in declaration order.
    pub fn all_meshes() -> Vec<(&'static str, MeshGeometry)> {
        Self::ALL.iter().map(|d| (d.name(), d.build())).collect()
    }
}

fn unit_triangle() -> [Point3d; 3] {
    [
        Point3d::new(0.0, 0.0, 0.0),
        Point3d::new(1.0, 0.0, 0.0),
        Point3d::new(0.0, 1.0, 0.0),
    ]
}
