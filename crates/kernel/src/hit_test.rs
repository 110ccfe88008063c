//! Ray hit testing against a viewport's scene.
//!
//! A pixel becomes a ray through the camera; every geometry model reachable
//! from the viewport's root visuals is tested in world space (the composed
//! model and visual transforms, including projective ones). Hits outside
//! the camera's near/far range are discarded. The survivors are reported
//! nearest first.

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::error::KernelError;
use crate::geometry::matrix::Matrix4x4;
use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::transform::BoundingBox;
use crate::geometry::vector::Vec3;
use crate::scene::{GeometryModel3D, Model3D, ModelId, Viewport3D, VisualId};
use crate::Tolerance;

/// A half-line `origin + t * direction`. The direction is not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }
}

/// Returned by a hit-test callback to continue or end the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTestResultBehavior {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceSide {
    Front,
    Back,
}

/// One ray/triangle intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayMeshHit {
    pub visual: Option<VisualId>,
    pub model: Option<ModelId>,
    pub point: Point3d,
    /// Distance from the ray origin, in world units.
    pub distance: f64,
    /// Position indices of the hit triangle (indexed meshes only).
    pub vertex_indices: Option<[usize; 3]>,
    /// Barycentric weights matching `vertex_indices`.
    pub vertex_weights: Option<[f64; 3]>,
    pub side: FaceSide,
}

struct HitCollector<'a> {
    viewport: &'a Viewport3D,
    ray: Ray,
    aspect: f64,
    tolerance: Tolerance,
    hits: Vec<RayMeshHit>,
}

impl HitCollector<'_> {
    fn visit_visual(&mut self, id: VisualId, parent: &Matrix4x4) -> Result<(), KernelError> {
        let visual = self.viewport.store.visual(id)?;
        let world = visual.transform.value() * *parent;
        if let Some(content) = visual.content {
            self.visit_model(id, content, &world)?;
        }
        for &child in &visual.children {
            self.visit_visual(child, &world)?;
        }
        Ok(())
    }

    fn visit_model(&mut self, visual: VisualId, id: ModelId, parent: &Matrix4x4) -> Result<(), KernelError> {
        let model = self.viewport.store.model(id)?;
        let world = model.transform().value() * *parent;
        match model {
            Model3D::Geometry(geometry) => self.test_geometry(visual, id, geometry, &world),
            Model3D::Group { children, .. } => {
                for &child in children {
                    self.visit_model(visual, child, &world)?;
                }
                Ok(())
            }
            Model3D::Light { .. } => Ok(()),
        }
    }

    fn test_geometry(
        &mut self,
        visual: VisualId,
        model: ModelId,
        geometry: &GeometryModel3D,
        world: &Matrix4x4,
    ) -> Result<(), KernelError> {
        let front = geometry.material.is_some();
        let back = geometry.back_material.is_some();
        if !front && !back {
            return Ok(());
        }

        let mesh = &geometry.geometry;
        // Vertices behind a projective transform (w <= 0) map to None.
        let world_positions: Vec<Option<Point3d>> = mesh
            .positions
            .iter()
            .map(|p| {
                let [x, y, z, w] = world.transform_homogeneous([p.x, p.y, p.z, 1.0]);
                (w > 0.0).then(|| Point3d::new(x / w, y / w, z / w))
            })
            .collect();
        let bounds = BoundingBox::from_points(world_positions.iter().flatten());
        if !bounds
            .expanded(self.tolerance.parallel)
            .intersects_line(&self.ray.origin, &self.ray.direction)
        {
            return Ok(());
        }

        let indexed = mesh.is_indexed();
        for tri in mesh.triangles() {
            let (Some(a), Some(b), Some(c)) = (
                world_positions[tri[0]],
                world_positions[tri[1]],
                world_positions[tri[2]],
            ) else {
                continue;
            };
            let Some((side, u, v, point)) = self.intersect_triangle(a, b, c, front, back) else {
                continue;
            };
            if !self.viewport.camera.depth_contains(&point, self.aspect)? {
                continue;
            }
            self.hits.push(RayMeshHit {
                visual: Some(visual),
                model: Some(model),
                point,
                distance: point.distance_to(&self.ray.origin),
                vertex_indices: indexed.then_some(tri),
                vertex_weights: indexed.then_some([1.0 - u - v, u, v]),
                side,
            });
        }
        Ok(())
    }

    /// Möller–Trumbore. Front faces wind counter-clockwise as seen along
    /// the ray, i.e. their normal opposes the ray direction.
    fn intersect_triangle(
        &self,
        a: Point3d,
        b: Point3d,
        c: Point3d,
        front: bool,
        back: bool,
    ) -> Option<(FaceSide, f64, f64, Point3d)> {
        let d = self.ray.direction;
        let e1 = b - a;
        let e2 = c - a;
        let side = if e1.cross(&e2).dot(&d) < 0.0 {
            FaceSide::Front
        } else {
            FaceSide::Back
        };
        match side {
            FaceSide::Front if !front => return None,
            FaceSide::Back if !back => return None,
            _ => {}
        }

        let pv = d.cross(&e2);
        let det = e1.dot(&pv);
        if !(det.abs() >= self.tolerance.parallel) {
            return None;
        }
        let tv = self.ray.origin - a;
        let u = tv.dot(&pv) / det;
        if u < -self.tolerance.edge || u > 1.0 + self.tolerance.edge {
            return None;
        }
        let qv = tv.cross(&e1);
        let v = d.dot(&qv) / det;
        if v < -self.tolerance.edge || u + v > 1.0 + self.tolerance.edge {
            return None;
        }
        let t = e2.dot(&qv) / det;
        let point = self.ray.at(t);
        point.is_finite().then_some((side, u, v, point))
    }
}

impl Viewport3D {
    /// Map a pixel position to normalized device coordinates.
    pub fn pixel_to_ndc(&self, pixel: Point2d) -> Result<Point2d, KernelError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(KernelError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(Point2d::new(
            pixel.x / self.width * 2.0 - 1.0,
            1.0 - pixel.y / self.height * 2.0,
        ))
    }

    pub fn ray_at(&self, pixel: Point2d) -> Result<Ray, KernelError> {
        let ndc = self.pixel_to_ndc(pixel)?;
        self.camera.ray(ndc, self.aspect_ratio())
    }

    /// Every hit under `pixel`, nearest first.
    pub fn hits_at(&self, pixel: Point2d) -> Result<Vec<RayMeshHit>, KernelError> {
        self.hits_at_with(pixel, &Tolerance::default())
    }

    pub fn hits_at_with(&self, pixel: Point2d, tolerance: &Tolerance) -> Result<Vec<RayMeshHit>, KernelError> {
        let mut collector = HitCollector {
            viewport: self,
            ray: self.ray_at(pixel)?,
            aspect: self.aspect_ratio(),
            tolerance: *tolerance,
            hits: Vec::new(),
        };
        for &visual in &self.children {
            collector.visit_visual(visual, &Matrix4x4::identity())?;
        }
        let mut hits = collector.hits;
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(hits)
    }

    /// Deliver the hits under `pixel` to `callback`, nearest first, until it
    /// returns [`HitTestResultBehavior::Stop`]. Returns how many hits were
    /// delivered.
    #[instrument(level = "trace", skip(self, callback))]
    pub fn hit_test<F>(&self, pixel: Point2d, mut callback: F) -> Result<usize, KernelError>
    where
        F: FnMut(&RayMeshHit) -> HitTestResultBehavior,
    {
        let hits = self.hits_at(pixel)?;
        let mut delivered = 0;
        for hit in &hits {
            delivered += 1;
            if callback(hit) == HitTestResultBehavior::Stop {
                break;
            }
        }
        trace!(found = hits.len(), delivered, "hit test complete");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, PerspectiveCamera};
    use crate::geometry::transform::Transform3D;
    use crate::mesh::MeshGeometry;
    use crate::scene::{Color, Material};

    fn facing_triangle(z: f64) -> MeshGeometry {
        let mut mesh = MeshGeometry::new();
        mesh.add_vertex(Point3d::new(-1.0, -1.0, z), Vec3::Z);
        mesh.add_vertex(Point3d::new(1.0, -1.0, z), Vec3::Z);
        mesh.add_vertex(Point3d::new(0.0, 1.0, z), Vec3::Z);
        mesh.add_triangle(0, 1, 2);
        mesh
    }

    fn viewport_with(model: GeometryModel3D) -> (Viewport3D, ModelId) {
        let camera = Camera::Perspective(PerspectiveCamera::new(
            Point3d::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            45.0,
        ));
        let mut viewport = Viewport3D::new(camera, 200.0, 200.0);
        let id = viewport.store.add_geometry(model);
        viewport.add_model_visual(id);
        (viewport, id)
    }

    #[test]
    fn test_center_hit_reports_triangle() {
        let (viewport, id) = viewport_with(GeometryModel3D::new(facing_triangle(0.0), Material::diffuse(Color::RED)));
        let hits = viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap();
        assert_eq!(hits.len(), 1);
        let hit = &hits[0];
        assert_eq!(hit.model, Some(id));
        assert_eq!(hit.side, FaceSide::Front);
        assert!((hit.distance - 5.0).abs() < 1e-12);
        assert_eq!(hit.vertex_indices, Some([0, 1, 2]));
        let w = hit.vertex_weights.unwrap();
        assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_back_face_needs_back_material() {
        let mut mesh = facing_triangle(0.0);
        mesh.triangle_indices = vec![0, 2, 1];
        let (viewport, _) = viewport_with(GeometryModel3D::new(mesh.clone(), Material::diffuse(Color::RED)));
        assert!(viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap().is_empty());

        let (viewport, _) = viewport_with(
            GeometryModel3D::new(mesh, Material::diffuse(Color::RED)).with_back_material(Material::diffuse(Color::BLUE)),
        );
        let hits = viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].side, FaceSide::Back);
    }

    #[test]
    fn test_hits_sorted_and_stop_honoured() {
        let (mut viewport, _) = viewport_with(GeometryModel3D::new(facing_triangle(-2.0), Material::diffuse(Color::RED)));
        let near = viewport
            .store
            .add_geometry(GeometryModel3D::new(facing_triangle(1.0), Material::diffuse(Color::RED)));
        viewport.add_model_visual(near);

        let hits = viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].model, Some(near));
        assert!(hits[0].distance < hits[1].distance);

        let delivered = viewport
            .hit_test(Point2d::new(100.0, 100.0), |_| HitTestResultBehavior::Stop)
            .unwrap();
        assert_eq!(delivered, 1);
    }

    #[test]
    fn test_visual_transform_moves_geometry() {
        let (mut viewport, _) = viewport_with(GeometryModel3D::new(facing_triangle(0.0), Material::diffuse(Color::RED)));
        let root = viewport.children[0];
        viewport.store.visual_mut(root).unwrap().transform = Transform3D::translate(10.0, 0.0, 0.0);
        assert!(viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap().is_empty());
    }

    #[test]
    fn test_non_indexed_hit_has_no_indices() {
        let mut mesh = facing_triangle(0.0);
        mesh.triangle_indices.clear();
        let (viewport, _) = viewport_with(GeometryModel3D::new(mesh, Material::diffuse(Color::RED)));
        let hits = viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].vertex_indices.is_none());
        assert!(hits[0].vertex_weights.is_none());
    }

    #[test]
    fn test_model_without_material_is_not_hit() {
        let mut model = GeometryModel3D::new(facing_triangle(0.0), Material::diffuse(Color::RED));
        model.material = None;
        let (viewport, _) = viewport_with(model);
        assert!(viewport.hits_at(Point2d::new(100.0, 100.0)).unwrap().is_empty());
    }

    #[test]
    fn test_empty_viewport_is_an_error() {
        let viewport = Viewport3D::new(Camera::default(), 0.0, 100.0);
        assert!(matches!(
            viewport.hits_at(Point2d::new(0.0, 0.0)),
            Err(KernelError::EmptyViewport { .. })
        ));
    }
}
