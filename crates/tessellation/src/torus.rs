//! Parametric torus lying in the XY plane.

use std::f64::consts::TAU;

use basic3d_kernel::geometry::point::{Point2d, Point3d};
use basic3d_kernel::geometry::vector::Vec3;
use basic3d_kernel::mesh::MeshGeometry;
use tracing::debug;

use crate::{check_lattice, check_radius, check_segments, lattice, GeometryError, LatticeVertex};

pub const DEFAULT_INNER_RADIUS: f64 = 0.3;
pub const DEFAULT_OUTER_RADIUS: f64 = 0.1;
pub const DEFAULT_SPINE_SEGMENTS: usize = 32;
pub const DEFAULT_FLESH_SEGMENTS: usize = 16;

/// A torus around the Z axis.
///
/// `inner_radius` is the distance from the centre to the tube's spine and
/// `outer_radius` the tube's own radius. The mesh is built lazily and
/// rebuilt after any property change.
#[derive(Debug, Clone)]
pub struct Torus {
    inner_radius: f64,
    outer_radius: f64,
    spine_segments: usize,
    flesh_segments: usize,
    center: Point3d,
    cached: Option<MeshGeometry>,
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            inner_radius: DEFAULT_INNER_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
            spine_segments: DEFAULT_SPINE_SEGMENTS,
            flesh_segments: DEFAULT_FLESH_SEGMENTS,
            center: Point3d::ORIGIN,
            cached: None,
        }
    }
}

impl Torus {
    pub fn new(
        inner_radius: f64,
        outer_radius: f64,
        spine_segments: usize,
        flesh_segments: usize,
    ) -> Result<Self, GeometryError> {
        let spine_segments = check_segments("spine_segments", spine_segments)?;
        let flesh_segments = check_segments("flesh_segments", flesh_segments)?;
        check_lattice(spine_segments, flesh_segments)?;
        Ok(Self {
            inner_radius: check_radius("inner_radius", inner_radius)?,
            outer_radius: check_radius("outer_radius", outer_radius)?,
            spine_segments,
            flesh_segments,
            ..Self::default()
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn spine_segments(&self) -> usize {
        self.spine_segments
    }

    pub fn flesh_segments(&self) -> usize {
        self.flesh_segments
    }

    pub fn center(&self) -> Point3d {
        self.center
    }

    pub fn set_inner_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        self.inner_radius = check_radius("inner_radius", radius)?;
        self.cached = None;
        Ok(())
    }

    pub fn set_outer_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        self.outer_radius = check_radius("outer_radius", radius)?;
        self.cached = None;
        Ok(())
    }

    pub fn set_spine_segments(&mut self, segments: usize) -> Result<(), GeometryError> {
        let segments = check_segments("spine_segments", segments)?;
        check_lattice(segments, self.flesh_segments)?;
        self.spine_segments = segments;
        self.cached = None;
        Ok(())
    }

    pub fn set_flesh_segments(&mut self, segments: usize) -> Result<(), GeometryError> {
        let segments = check_segments("flesh_segments", segments)?;
        check_lattice(self.spine_segments, segments)?;
        self.flesh_segments = segments;
        self.cached = None;
        Ok(())
    }

    pub fn set_center(&mut self, center: Point3d) {
        self.center = center;
        self.cached = None;
    }

    pub fn is_built(&self) -> bool {
        self.cached.is_some()
    }

    /// The tessellated torus, building it on first access.
    pub fn mesh(&mut self) -> &MeshGeometry {
        let mesh = match self.cached.take() {
            Some(mesh) => mesh,
            None => self.build(),
        };
        self.cached.insert(mesh)
    }

    fn build(&self) -> MeshGeometry {
        let spine = self.spine_segments;
        let flesh = self.flesh_segments;
        let mesh = lattice(spine, flesh, true, |i, j| {
            let theta = TAU * i as f64 / spine as f64;
            let phi = TAU * j as f64 / flesh as f64;
            let spine_dir = Vec3::new(theta.cos(), theta.sin(), 0.0);
            let flesh_dir = spine_dir * phi.cos() + Vec3::Z * phi.sin();
            LatticeVertex {
                position: self.center + spine_dir * self.inner_radius + flesh_dir * self.outer_radius,
                normal: flesh_dir,
                texture: Point2d::new(i as f64 / spine as f64, j as f64 / flesh as f64),
            }
        });
        debug!(
            spine,
            flesh,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "built torus mesh"
        );
        mesh
    }
}
