use basic3d_kernel::geometry::point::{Point2d, Point3d};
use basic3d_kernel::geometry::vector::Vec3;
use basic3d_kernel::mesh::MeshGeometry;
use tracing::debug;

use crate::{check_lattice, check_finite, check_segments, lattice, GeometryError, LatticeVertex};

/// A `width x height` rectangle in the z = 0 plane, centred on the origin
/// and facing +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneXY {
    pub width: f64,
    pub height: f64,
}

impl PlaneXY {
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            width: check_finite("width", width)?,
            height: check_finite("height", height)?,
        })
    }

    /// Lattice of `u` columns by `v` rows, top row first.
    pub fn create_mesh(&self, u: usize, v: usize) -> Result<MeshGeometry, GeometryError> {
        let u = check_segments("u", u)?;
        let v = check_segments("v", v)?;
        check_lattice(v, u)?;
        let (w, h) = (self.width, self.height);
        let mesh = lattice(v, u, false, |i, j| {
            let s = j as f64 / (u - 1) as f64;
            let t = i as f64 / (v - 1) as f64;
            LatticeVertex {
                position: Point3d::new(-w / 2.0 + w * s, h / 2.0 - h * t, 0.0),
                normal: Vec3::Z,
                texture: Point2d::new(s, t),
            }
        });
        debug!(u, v, triangles = mesh.triangle_count(), "built plane mesh");
        Ok(mesh)
    }
}
