//! Hit testing through nested group transforms, and clipping against the
//! near and far planes.

use basic3d_kernel::{
    Camera, Color, GeometryModel3D, Material, MeshGeometry, ModelId, OrthographicCamera,
    PerspectiveCamera, Point2d, Point3d, Rotation3D, SceneStore, Transform3D, Vec3, Viewport3D,
};

use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::config::HarnessConfig;
use crate::helpers::{pixel, HarnessError};
use crate::oracle::{check_hit_pattern, count_hits_where, OracleVerdict};

// ── Hit Testing ─────────────────────────────────────────────────────────────

/// One small front-facing triangle and two large back-facing copies, one in
/// front of it and one behind, under a rotated and scaled group. The left
/// side looks through a perspective camera, the right through an
/// orthographic one.
pub struct HitTesting;

impl HitTesting {
    const TRIANGLE: [Point3d; 3] = [
        Point3d { x: 0.0, y: 0.0, z: 0.0 },
        Point3d { x: 0.0, y: 1.0, z: 0.0 },
        Point3d { x: 1.0, y: 0.0, z: 0.0 },
    ];

    const BOTH: [(f64, f64); 2] = [(110.0, 210.0), (90.0, 196.0)];
    const LEFT_ONLY: [(f64, f64); 1] = [(150.0, 140.0)];
    const RIGHT_ONLY: [(f64, f64); 2] = [(170.0, 152.0), (166.0, 168.0)];
    const NEITHER: [(f64, f64); 4] = [(60.0, 230.0), (175.0, 210.0), (140.0, 300.0), (300.0, 100.0)];

    fn mesh(indices: [i32; 3]) -> MeshGeometry {
        let mut mesh = MeshGeometry::new();
        mesh.positions = Self::TRIANGLE.to_vec();
        mesh.triangle_indices = indices.to_vec();
        mesh
    }

    /// Whether any hit under `pixel` lands on a mesh made of exactly the
    /// three triangle positions.
    fn hits_triangle(viewport: &Viewport3D, pixel: Point2d) -> Result<bool, HarnessError> {
        let count = count_hits_where(viewport, pixel, |_, model| {
            model.geometry.positions == Self::TRIANGLE
        })?;
        Ok(count > 0)
    }
}

impl TestCase for HitTesting {
    fn name(&self) -> &'static str {
        "Hit Testing"
    }

    fn camera(&self, side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        let position = Point3d::new(3.0, -5.0, 1.0);
        let look = Vec3::new(-3.0, 5.0, -1.0);
        Ok(match side {
            Side::Left => Camera::Perspective(PerspectiveCamera::new(position, look, Vec3::Y, 30.0)),
            Side::Right => Camera::Orthographic(OrthographicCamera::new(position, look, Vec3::Y, 4.0)),
        })
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let front = GeometryModel3D::new(Self::mesh([2, 1, 0]), Material::diffuse(Color::RED));
        // Positive Z is in front of the triangle.
        let in_front = GeometryModel3D::new(Self::mesh([0, 1, 2]), Material::diffuse(Color::YELLOW))
            .with_transform(Transform3D::Group(vec![
                Transform3D::scale(5.0, 5.0, 5.0),
                Transform3D::translate(-2.0, -2.0, 0.3),
            ]));
        let behind = GeometryModel3D::new(Self::mesh([0, 1, 2]), Material::diffuse(Color::BLUE))
            .with_transform(Transform3D::Group(vec![
                Transform3D::scale(15.0, 15.0, 15.0),
                Transform3D::translate(-2.0, -2.0, -0.4),
            ]));
        let meshes = vec![
            store.add_geometry(front),
            store.add_geometry(in_front),
            store.add_geometry(behind),
        ];

        let rotation = Transform3D::Group(vec![Transform3D::rotate_at(
            Rotation3D::axis_angle(Vec3::new(1.0, 0.0, 1.0), 30.0),
            Point3d::new(0.25, -1.0, 0.5),
        )]);
        let mesh_group = store.add_group(meshes, rotation);

        let placement = Transform3D::Group(vec![
            Transform3D::scale_at(Vec3::new(1.5, 2.0, 2.5), Point3d::new(0.5, -0.25, 0.75)),
            Transform3D::translate(0.25, -0.25, 0.5),
        ]);
        Ok(vec![store.add_group(vec![mesh_group], placement)])
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let expectations = [
            (&Self::BOTH[..], true, true),
            (&Self::LEFT_ONLY[..], true, false),
            (&Self::RIGHT_ONLY[..], false, true),
            (&Self::NEITHER[..], false, false),
        ];
        for (points, left, right) in expectations {
            for &(x, y) in points {
                for (side, expected) in [(Side::Left, left), (Side::Right, right)] {
                    let actual = Self::hits_triangle(scenes.side(side), pixel(x, y))?;
                    let what = if expected { "a hit" } else { "no hit" };
                    let detail = format!("Expected {what} at ({x}, {y}).");
                    let verdict = if actual == expected {
                        OracleVerdict::pass("triangle_hit", detail)
                    } else {
                        OracleVerdict::fail("triangle_hit", detail)
                    };
                    v.hits(side, &verdict);
                }
            }
        }
        Ok(())
    }
}

// ── Hit Testing Clipped ─────────────────────────────────────────────────────

/// A tilted triangle that pokes through both the near and the far plane.
/// Only the part between the planes may be hit.
pub struct HitTestingClipped;

impl TestCase for HitTestingClipped {
    fn name(&self) -> &'static str {
        "Hit Testing Clipped"
    }

    fn camera(&self, side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        let position = Point3d::new(0.0, 0.0, 1.0);
        let look = Vec3::new(0.0, 0.0, -1.0);
        Ok(match side {
            Side::Left => Camera::Perspective(PerspectiveCamera::new(position, look, Vec3::Y, 90.0).with_planes(1.0, 2.0)),
            Side::Right => {
                Camera::Orthographic(OrthographicCamera::new(position, look, Vec3::Y, 4.0).with_planes(1.0, 2.0))
            }
        })
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mut mesh = MeshGeometry::new();
        mesh.positions = vec![
            Point3d::new(-1.0, 0.0, 0.5),
            Point3d::new(1.0, 0.0, -1.5),
            Point3d::new(0.0, 1.0, -0.5),
        ];
        mesh.triangle_indices = vec![0, 1, 2];
        Ok(vec![store.add_geometry(GeometryModel3D::new(mesh, Material::diffuse(Color::RED)))])
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let sides = [
            (Side::Left, pixel(168.0, 239.0), [pixel(90.0, 243.0), pixel(248.0, 237.0)]),
            (Side::Right, pixel(198.0, 231.0), [pixel(142.0, 234.0), pixel(249.0, 233.0)]),
        ];
        for (side, hit, misses) in sides {
            let verdict = check_hit_pattern(scenes.side(side), &[hit], &misses)?;
            v.hits(side, &verdict);
        }
        Ok(())
    }
}
