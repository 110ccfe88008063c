//! Scenes checked by hit testing alone: default cameras and lights, mesh
//! layouts, singular model transforms and back materials.

use basic3d_kernel::{
    Camera, Color, GeometryModel3D, Light, Material, MeshGeometry, ModelId, OrthographicCamera,
    PerspectiveCamera, Point2d, Point3d, SceneStore, Transform3D, Vec3, Viewport3D,
};
use basic3d_tessellation::{flatten, DegenerateMesh, PlaneXY, Sphere};
use tracing::debug;

use super::{check_both_sides, geometry_models};
use crate::assertions::{verify, Verifier};
use crate::case::{ScenePair, Side, TestCase};
use crate::config::HarnessConfig;
use crate::helpers::{
    blue, camera_on_z, pixel, pixel_grid, pixels, pyramid_camera, pyramid_points, white, HarnessError,
};
use crate::oracle::{check_hit_count, count_hits};

fn pyramid_light(color: Color) -> Vec<Light> {
    vec![Light::Point {
        color,
        position: Point3d::new(0.2, 6.0, 0.1),
        range: 10000.0,
        attenuation: [1.0, 0.0, 0.0],
    }]
}

// ── Defaults ────────────────────────────────────────────────────────────────

/// Default-constructed cameras and lights looking at a unit plane.
pub struct Defaults;

impl Defaults {
    /// Distance at which a 45 degree perspective frames a width of 2.
    const CAMERA_Z: f64 = 2.4142135623730949;
}

impl TestCase for Defaults {
    fn name(&self) -> &'static str {
        "Defaults"
    }

    fn camera(&self, side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        let position = Point3d::new(0.0, 0.0, Self::CAMERA_Z);
        Ok(match side {
            Side::Left => Camera::Perspective(PerspectiveCamera {
                position,
                ..PerspectiveCamera::default()
            }),
            Side::Right => Camera::Orthographic(OrthographicCamera {
                position,
                ..OrthographicCamera::default()
            }),
        })
    }

    fn lights(&self, side: Side) -> Vec<Light> {
        match side {
            Side::Left => crate::helpers::default_lights(),
            Side::Right => vec![Light::Spot {
                color: Color::WHITE,
                position: Point3d::new(0.0, 0.0, 0.5),
                direction: Vec3::new(0.0, 0.0, -1.0),
                range: 1000.0,
                inner_cone_angle: 180.0,
                outer_cone_angle: 90.0,
            }],
        }
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mesh = PlaneXY::new(1.0, 1.0)?.create_mesh(20, 20)?;
        Ok(vec![store.add_geometry(GeometryModel3D::new(mesh, white()))])
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        check_both_sides(
            scenes,
            v,
            &[(110.0, 160.0), (280.0, 330.0), (200.0, 250.0), (150.0, 300.0)],
            &[(60.0, 245.0), (330.0, 245.0), (196.0, 120.0), (196.0, 380.0), (20.0, 20.0)],
        )
    }
}

// ── Non-Indexed Meshes ──────────────────────────────────────────────────────

/// The six faces of the pyramid as indices into `pyramid_points()`.
const PYRAMID_FACES: [i32; 18] = [0, 2, 1, 0, 1, 3, 0, 3, 4, 0, 4, 2, 1, 2, 3, 4, 3, 2];

/// The pyramid indexed on the left and as position triples with no index
/// list on the right. Both must hit alike everywhere.
pub struct NonIndexedMeshes;

impl NonIndexedMeshes {
    fn mesh(side: Side) -> MeshGeometry {
        let points = pyramid_points();
        let mut mesh = MeshGeometry::new();
        if side.is_left() {
            mesh.positions = points.to_vec();
            mesh.triangle_indices = PYRAMID_FACES.to_vec();
        } else {
            mesh.positions = PYRAMID_FACES.iter().map(|&i| points[i as usize]).collect();
        }
        mesh
    }
}

/// Pixels where the two viewports disagree on hit count, distance or face
/// side. Vertex indices are ignored since only indexed meshes report them.
fn differing_hits(left: &Viewport3D, right: &Viewport3D, grid: &[Point2d]) -> Result<Vec<String>, HarnessError> {
    let mut differing = Vec::new();
    for &p in grid {
        let (l, r) = (left.hits_at(p)?, right.hits_at(p)?);
        let same = l.len() == r.len()
            && l.iter()
                .zip(&r)
                .all(|(a, b)| verify(a.distance, b.distance) && a.side == b.side);
        if !same {
            differing.push(format!("({}, {}): {} hits vs {}", p.x, p.y, l.len(), r.len()));
        }
    }
    Ok(differing)
}

impl TestCase for NonIndexedMeshes {
    fn name(&self) -> &'static str {
        "Non-Indexed Meshes"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(pyramid_camera())
    }

    fn lights(&self, _side: Side) -> Vec<Light> {
        pyramid_light(Color::YELLOW)
    }

    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let model = GeometryModel3D::new(Self::mesh(side), Material::diffuse(Color::GREEN));
        Ok(vec![store.add_geometry(model)])
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        for side in Side::BOTH {
            let hits = count_hits(scenes.side(side), pixel(155.0, 245.0))?;
            v.expect(&format!("hit testing the pyramid ({side})"), hits > 0);
        }
        let grid = pixel_grid(
            config.viewport_width,
            config.viewport_height,
            config.equivalence_step,
        );
        let differing = differing_hits(&scenes.left, &scenes.right, &grid)?;
        v.expect(
            &format!("indexed and non-indexed pyramids hit alike: {}", differing.join("; ")),
            differing.is_empty(),
        );
        Ok(())
    }
}

// ── Flattened Spheres ───────────────────────────────────────────────────────

/// Spheres scattered over a grid, a third of them squashed flat by a zero
/// scale along X.
pub struct FlattenedSpheres;

impl TestCase for FlattenedSpheres {
    fn name(&self) -> &'static str {
        "Flattened Spheres"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(camera_on_z(10.0, 30.0))
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mesh = Sphere::new(0.3)?.create_mesh(11, 11)?;
        let mut spheres = Vec::new();
        let mut count = 0;
        let mut x = -1.0;
        while x < 1.0 {
            let mut y = -1.0;
            while y < 1.0 {
                if count % 2 != 0 {
                    let mut steps = Vec::new();
                    if count % 3 == 0 {
                        steps.push(Transform3D::scale(0.0, 1.0, 1.0));
                    }
                    steps.push(Transform3D::translate(x, y, 0.0));
                    steps.push(Transform3D::rotate(Vec3::new(1.0, 2.0, 3.0), 33.0));
                    let model =
                        GeometryModel3D::new(mesh.clone(), blue()).with_transform(Transform3D::Group(steps));
                    spheres.push(store.add_geometry(model));
                }
                count += 1;
                y += 0.6;
            }
            x += 0.6;
        }
        debug!(spheres = spheres.len(), "placed spheres");
        Ok(vec![store.add_group(spheres, Transform3D::Identity)])
    }

    fn round_trip(&self) -> bool {
        false
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let hits = pixels(&[(218.0, 160.0), (140.0, 200.0), (250.0, 244.0)]);
        for side in Side::BOTH {
            let verdict = check_hit_count(scenes.side(side), &hits, hits.len())?;
            v.hits(side, &verdict);
        }
        check_both_sides(scenes, v, &[], &[(100.0, 310.0), (196.0, 380.0)])
    }
}

// ── Weird Meshes ────────────────────────────────────────────────────────────

/// Every malformed mesh in the catalogue under one group. Hit testing must
/// neither fail nor panic.
pub struct WeirdMeshes;

impl TestCase for WeirdMeshes {
    fn name(&self) -> &'static str {
        "Weird Meshes"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(crate::helpers::default_camera())
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let models = DegenerateMesh::all_meshes()
            .into_iter()
            .map(|(_, mesh)| store.add_geometry(GeometryModel3D::new(mesh, blue())))
            .collect();
        Ok(vec![store.add_group(models, Transform3D::Identity)])
    }

    // NaN and infinite positions do not survive JSON.
    fn round_trip(&self) -> bool {
        false
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let mut points = vec![pixel(100.0, 100.0)];
        points.extend(pixel_grid(
            config.viewport_width,
            config.viewport_height,
            config.equivalence_step,
        ));
        for side in Side::BOTH {
            let failed: Vec<String> = points
                .iter()
                .filter_map(|&p| count_hits(scenes.side(side), p).err().map(|e| describe(p, e)))
                .collect();
            v.expect(
                &format!("hit testing weird meshes ({side}): {}", failed.join("; ")),
                failed.is_empty(),
            );
        }
        Ok(())
    }
}

fn describe(p: Point2d, error: HarnessError) -> String {
    format!("({}, {}) {error}", p.x, p.y)
}

// ── Large Vertex Non Indexed ────────────────────────────────────────────────

/// A 201 x 201 sphere expanded to 240000 non-indexed vertices.
pub struct LargeVertexNonIndexed;

impl LargeVertexNonIndexed {
    const SEGMENTS: usize = 201;
}

impl TestCase for LargeVertexNonIndexed {
    fn name(&self) -> &'static str {
        "Large Vertex Non Indexed"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(camera_on_z(10.0, 30.0))
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mesh = flatten(&Sphere::new(2.0)?.create_mesh(Self::SEGMENTS, Self::SEGMENTS)?);
        Ok(vec![store.add_geometry(GeometryModel3D::new(mesh, blue()))])
    }

    fn round_trip(&self) -> bool {
        false
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let cells = (Self::SEGMENTS - 1) * (Self::SEGMENTS - 1);
        for side in Side::BOTH {
            for model in geometry_models(scenes.side(side)) {
                let mesh = &model.geometry;
                v.expect(&format!("sphere mesh is non-indexed ({side})"), !mesh.is_indexed());
                v.expect(
                    &format!("sphere mesh has {} vertices ({side})", cells * 6),
                    mesh.vertex_count() == cells * 6,
                );
                v.expect(
                    &format!("sphere mesh has {} triangles ({side})", cells * 2),
                    mesh.triangle_count() == cells * 2,
                );
            }
        }
        check_both_sides(scenes, v, &[(196.0, 245.0), (250.0, 300.0)], &[(20.0, 20.0)])
    }
}

// ── BackMaterial ────────────────────────────────────────────────────────────

/// Pyramids whose back faces carry their own material. The right side drops
/// one front face and adds a mirrored copy below.
pub struct BackMaterial;

impl TestCase for BackMaterial {
    fn name(&self) -> &'static str {
        "BackMaterial"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(pyramid_camera())
    }

    fn lights(&self, _side: Side) -> Vec<Light> {
        pyramid_light(Color::WHITE)
    }

    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mut mesh = MeshGeometry::new();
        mesh.positions = pyramid_points().to_vec();
        let red = Material::diffuse(Color::RED);

        if side.is_left() {
            mesh.triangle_indices = PYRAMID_FACES.to_vec();
            let translucent_green = Material::diffuse(Color {
                a: 127.0 / 255.0,
                ..Color::rgb(0.0, 1.0, 0.0)
            });
            let model = GeometryModel3D::new(mesh, translucent_green).with_back_material(red);
            return Ok(vec![store.add_geometry(model)]);
        }

        mesh.triangle_indices = PYRAMID_FACES[3..].to_vec();
        let t = Point2d::new(0.0, 0.0);
        let r = Point2d::new(1.0, 0.0);
        let b = Point2d::new(0.5, 0.5 * 3f64.sqrt());
        mesh.texture_coordinates = vec![t, b, t, r, t];
        let model = GeometryModel3D::new(mesh, Material::diffuse(Color::GREEN)).with_back_material(red);
        let flipped = model.clone().with_transform(Transform3D::Group(vec![
            Transform3D::scale(1.0, -1.0, 1.0),
            Transform3D::translate(0.0, -1.05, 0.0),
        ]));
        Ok(vec![store.add_geometry(flipped), store.add_geometry(model)])
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        // Two hits where a front and a back face overlap, one where the
        // missing front face leaves only a back face.
        let expectations = [
            (Side::Left, 172.0, 214.0, 2),
            (Side::Right, 110.0, 243.0, 2),
            (Side::Right, 254.0, 210.0, 1),
            (Side::Right, 161.0, 387.0, 2),
            (Side::Right, 209.0, 442.0, 1),
        ];
        for (side, x, y, expected) in expectations {
            let verdict = check_hit_count(scenes.side(side), &[pixel(x, y)], expected)?;
            v.hits(side, &verdict);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

    fn scenes(case: &dyn TestCase) -> ScenePair {
        ScenePair::build(case, VIEWPORT_WIDTH, VIEWPORT_HEIGHT).unwrap()
    }

    #[test]
    fn test_non_indexed_pyramid_hits_like_indexed() {
        let pair = scenes(&NonIndexedMeshes);
        let left: Vec<_> = geometry_models(&pair.left).collect();
        let right: Vec<_> = geometry_models(&pair.right).collect();
        assert!(left[0].geometry.is_indexed());
        assert!(!right[0].geometry.is_indexed());
        assert_eq!(left[0].geometry.triangle_count(), right[0].geometry.triangle_count());

        let grid = pixel_grid(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, 7);
        let covered = grid
            .iter()
            .filter(|&&p| count_hits(&pair.left, p).unwrap() > 0)
            .count();
        assert!(covered > 0);
        let differing = differing_hits(&pair.left, &pair.right, &grid).unwrap();
        assert!(differing.is_empty(), "{differing:?}");
    }

    #[test]
    fn test_flattened_spheres_places_odd_cells() {
        let pair = scenes(&FlattenedSpheres);
        assert_eq!(geometry_models(&pair.left).count(), 8);
        let squashed = geometry_models(&pair.left)
            .filter(|m| match &m.transform {
                Transform3D::Group(steps) => steps.len() == 3,
                _ => false,
            })
            .count();
        assert_eq!(squashed, 3);
    }

    #[test]
    fn test_back_material_right_side_has_mirrored_copy() {
        let pair = scenes(&BackMaterial);
        assert_eq!(geometry_models(&pair.left).count(), 1);
        let right: Vec<_> = geometry_models(&pair.right).collect();
        assert_eq!(right.len(), 2);
        assert!(right.iter().all(|m| m.back_material.is_some()));
        assert!(right.iter().all(|m| m.geometry.triangle_count() == 5));
    }

    #[test]
    fn test_weird_meshes_hold_whole_catalogue() {
        let pair = scenes(&WeirdMeshes);
        assert_eq!(geometry_models(&pair.right).count(), DegenerateMesh::ALL.len());
    }

    #[test]
    fn test_defaults_sides_use_different_projections() {
        let pair = scenes(&Defaults);
        assert!(matches!(pair.left.camera, Camera::Perspective(_)));
        assert!(matches!(pair.right.camera, Camera::Orthographic(_)));
    }
}
