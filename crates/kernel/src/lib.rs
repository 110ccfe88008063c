//! Retained-mode 3D scene kernel: matrices, quaternions, transforms,
//! meshes, cameras and ray hit testing.
//!
//! Matrices follow the row-vector convention (`p' = p * M`); see
//! [`geometry::matrix::Matrix4x4`].

pub mod camera;
pub mod error;
pub mod geometry;
pub mod hit_test;
pub mod mesh;
pub mod scene;
pub mod trackball;

pub use camera::{Camera, MatrixCamera, OrthographicCamera, PerspectiveCamera};
pub use error::KernelError;
pub use geometry::{BoundingBox, Matrix4x4, Point2d, Point3d, Quaternion, Rotation3D, Transform3D, Vec3};
pub use hit_test::{FaceSide, HitTestResultBehavior, Ray, RayMeshHit};
pub use mesh::MeshGeometry;
pub use scene::{
    Color, GeometryModel3D, Light, Material, Model3D, ModelId, ModelVisual3D, SceneStore, Viewport3D,
    VisualId,
};
pub use trackball::Trackball;

/// Tolerances used by ray/triangle intersection.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Ray/triangle determinants smaller than this are treated as parallel.
    pub parallel: f64,
    /// Barycentric slack allowed past a triangle's edges.
    pub edge: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            parallel: 1e-12,
            edge: 0.0,
        }
    }
}
