use std::f64::consts::{PI, TAU};

use basic3d_kernel::geometry::point::{Point2d, Point3d};
use basic3d_kernel::geometry::vector::Vec3;
use basic3d_kernel::mesh::MeshGeometry;
use tracing::debug;

use crate::{check_lattice, check_radius, check_segments, lattice, GeometryError, LatticeVertex};

/// A latitude/longitude sphere centred on the origin with its poles on the
/// Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            radius: check_radius("radius", radius)?,
        })
    }

    /// `u` longitude samples by `v` latitude samples, north pole first. The
    /// seam and the poles repeat vertices.
    pub fn create_mesh(&self, u: usize, v: usize) -> Result<MeshGeometry, GeometryError> {
        let u = check_segments("u", u)?;
        let v = check_segments("v", v)?;
        check_lattice(v, u)?;
        let r = self.radius;
        let mesh = lattice(v, u, false, |i, j| {
            let phi = PI * i as f64 / (v - 1) as f64;
            let theta = TAU * j as f64 / (u - 1) as f64;
            let normal = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
            LatticeVertex {
                position: Point3d::from_vec3(normal * r),
                normal,
                texture: Point2d::new(j as f64 / (u - 1) as f64, i as f64 / (v - 1) as f64),
            }
        });
        debug!(u, v, radius = r, triangles = mesh.triangle_count(), "built sphere mesh");
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts_and_radius() {
        let mesh = Sphere::new(0.3).unwrap().create_mesh(11, 11).unwrap();
        assert_eq!(mesh.vertex_count(), 121);
        assert_eq!(mesh.triangle_count(), 200);
        for p in &mesh.positions {
            assert!((p.to_vec3().length() - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sphere_poles_on_y_axis() {
        let mesh = Sphere::new(2.0).unwrap().create_mesh(5, 5).unwrap();
        assert!((mesh.positions[0].y - 2.0).abs() < 1e-12);
        assert!((mesh.positions[24].y + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_faces_outward() {
        let mesh = Sphere::new(1.0).unwrap().create_mesh(9, 7).unwrap();
        for [a, b, c] in mesh.triangles() {
            let (pa, pb, pc) = (mesh.positions[a], mesh.positions[b], mesh.positions[c]);
            let n = (pb - pa).cross(&(pc - pa));
            // Pole caps collapse one edge to a point.
            if n.length() < 1e-12 {
                continue;
            }
            let centroid = pa.to_vec3() + pb.to_vec3() + pc.to_vec3();
            assert!(n.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_sphere_rejects_bad_arguments() {
        assert!(Sphere::new(-1.0).is_err());
        assert!(Sphere::new(1.0).unwrap().create_mesh(11, 1).is_err());
        assert!(matches!(
            Sphere::new(1.0).unwrap().create_mesh(1 << 16, 1 << 16),
            Err(GeometryError::TooManyVertices { rows: 65536, cols: 65536 })
        ));
    }
}
