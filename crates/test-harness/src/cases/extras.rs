//! Torus topology, the trackball helper and world-space bounds.

use basic3d_kernel::{
    BoundingBox, Camera, GeometryModel3D, Matrix4x4, MeshGeometry, ModelId, Point3d, Quaternion,
    SceneStore, Trackball, Transform3D, Vec3,
};
use basic3d_tessellation::{PlaneXY, Torus};
use tracing::debug;

use super::geometry_models;
use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::config::HarnessConfig;
use crate::helpers::{default_camera, pixel, pixel_grid, pixels, white, HarnessError, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::oracle::check_same_coverage;

fn check_coverage(scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
    let grid = pixel_grid(
        config.viewport_width,
        config.viewport_height,
        config.equivalence_step,
    );
    let coverage = check_same_coverage(&scenes.left, &scenes.right, &grid)?;
    v.verdict(&coverage);
    if coverage.passed {
        v.expect("geometry covers part of the grid", coverage.value.unwrap_or(0.0) > 0.0);
    }
    Ok(())
}

// ── Torus Topology ──────────────────────────────────────────────────────────

/// A 15 x 15 torus built directly on the left and by setters on the right.
pub struct TorusTopology;

impl TorusTopology {
    const SEGMENTS: usize = 15;

    fn torus(side: Side) -> Result<Torus, HarnessError> {
        if side.is_left() {
            return Ok(Torus::new(0.3, 0.1, Self::SEGMENTS, Self::SEGMENTS)?);
        }
        let mut torus = Torus::default();
        // Build once so the setters below have a cached mesh to discard.
        torus.mesh();
        torus.set_spine_segments(Self::SEGMENTS)?;
        torus.set_flesh_segments(Self::SEGMENTS)?;
        Ok(torus)
    }
}

impl TestCase for TorusTopology {
    fn name(&self) -> &'static str {
        "Torus Topology"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(default_camera())
    }

    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mut torus = Self::torus(side)?;
        let mesh = torus.mesh().clone();
        Ok(vec![store.add_geometry(GeometryModel3D::new(mesh, white()))])
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let cells = Self::SEGMENTS * Self::SEGMENTS;
        for side in Side::BOTH {
            for model in geometry_models(scenes.side(side)) {
                let mesh: &MeshGeometry = &model.geometry;
                v.expect(
                    &format!("torus has {cells} vertices ({side}), got {}", mesh.vertex_count()),
                    mesh.vertex_count() == cells,
                );
                v.expect(
                    &format!("torus has {} triangles ({side}), got {}", 2 * cells, mesh.triangle_count()),
                    mesh.triangle_count() == 2 * cells,
                );
                let unused = mesh.unreferenced_vertices();
                v.expect(
                    &format!("torus references every vertex ({side}), unused {unused:?}"),
                    unused.is_empty(),
                );
            }
        }

        // Rejected values leave the torus untouched.
        let mut torus = Torus::default();
        v.expect("spine segments below 2 rejected", torus.set_spine_segments(1).is_err());
        v.expect("flesh segments below 2 rejected", torus.set_flesh_segments(0).is_err());
        v.expect("negative inner radius rejected", torus.set_inner_radius(-0.1).is_err());
        v.expect("NaN outer radius rejected", torus.set_outer_radius(f64::NAN).is_err());
        v.expect(
            "torus keeps its defaults after rejected setters",
            torus.spine_segments() == 32 && torus.flesh_segments() == 16,
        );

        check_coverage(scenes, config, v)
    }
}

// ── Trackball ───────────────────────────────────────────────────────────────

/// A torus oriented by a scripted trackball drag. The left side uses the
/// trackball's transform, the right side its flattened matrix.
pub struct TrackballCase;

impl TrackballCase {
    const CENTER: (f64, f64) = (196.0, 245.0);
    const ROTATE_TO: (f64, f64) = (296.0, 245.0);
    /// Dragging down by 50 pixels zooms in to `e^0.5`.
    const ZOOM_TO: (f64, f64) = (196.0, 295.0);

    fn dragged() -> Result<Trackball, HarnessError> {
        let mut trackball = Trackball::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)?;
        let (cx, cy) = Self::CENTER;
        let (rx, ry) = Self::ROTATE_TO;
        let (zx, zy) = Self::ZOOM_TO;
        trackball.begin_rotate(pixel(cx, cy));
        trackball.drag_rotate(pixel(rx, ry));
        trackball.end_rotate();
        trackball.begin_zoom(pixel(cx, cy));
        trackball.drag_zoom(pixel(zx, zy));
        trackball.end_zoom();
        debug!(
            angle = trackball.orientation().angle(),
            zoom = trackball.zoom(),
            "scripted trackball drag"
        );
        Ok(trackball)
    }
}

impl TestCase for TrackballCase {
    fn name(&self) -> &'static str {
        "Trackball"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(default_camera())
    }

    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let trackball = Self::dragged()?;
        let transform = match side {
            Side::Left => trackball.transform(),
            Side::Right => Transform3D::Matrix(trackball.transform().value()),
        };
        let mut torus = Torus::default();
        let model = GeometryModel3D::new(torus.mesh().clone(), white()).with_transform(transform);
        Ok(vec![store.add_geometry(model)])
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let mut trackball = Self::dragged()?;

        let (cx, cy) = Self::CENTER;
        v.vector("sphere point at the centre", Vec3::Z, trackball.project_to_sphere(pixel(cx, cy)));
        v.expect(
            "corner lands on the rim",
            trackball.project_to_sphere(pixel(0.0, 0.0)).z == 0.0,
        );

        let orientation = trackball.orientation();
        v.within("orientation length", 1.0, orientation.length(), 1e-12);
        v.vector("drag axis", Vec3::Y, orientation.axis());
        let (rx, ry) = Self::ROTATE_TO;
        let expected = Vec3::Z.angle_between(&trackball.project_to_sphere(pixel(rx, ry)));
        v.low_precision("drag angle", expected, orientation.angle());
        v.within("zoom", 0.5f64.exp(), trackball.zoom(), 1e-12);

        // Without begin_rotate a drag only records its position.
        let idle = trackball.drag_rotate(pixel(rx, ry));
        v.expect("drag without begin is idle", idle == Quaternion::IDENTITY);

        let left: Vec<_> = geometry_models(&scenes.left).collect();
        let right: Vec<_> = geometry_models(&scenes.right).collect();
        if let ([l], [r]) = (left.as_slice(), right.as_slice()) {
            v.matrix("trackball transform", &l.transform.value(), &r.transform.value());
        } else {
            v.expect("one torus per side", false);
        }

        check_coverage(scenes, config, v)
    }
}

// ── Bounds ──────────────────────────────────────────────────────────────────

/// A plane placed under nested transforms on the left and by one flattened
/// matrix on the right. Both must report the same world bounds, and every
/// hit must land inside them.
pub struct Bounds;

impl Bounds {
    fn model_transform() -> Transform3D {
        Transform3D::Group(vec![
            Transform3D::scale(2.0, 3.0, 1.0),
            Transform3D::translate(0.5, 0.0, 0.0),
        ])
    }

    fn group_transform() -> Transform3D {
        Transform3D::translate(0.0, 0.0, -1.0)
    }

    fn expected() -> BoundingBox {
        BoundingBox::new(Point3d::new(-0.5, -1.5, -1.0), Point3d::new(1.5, 1.5, -1.0))
    }
}

impl TestCase for Bounds {
    fn name(&self) -> &'static str {
        "Bounds"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(default_camera())
    }

    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let mesh = PlaneXY::new(1.0, 1.0)?.create_mesh(2, 2)?;
        Ok(match side {
            Side::Left => {
                let plane = store.add_geometry(GeometryModel3D::new(mesh, white()).with_transform(Self::model_transform()));
                vec![store.add_group(vec![plane], Self::group_transform())]
            }
            Side::Right => {
                let world = Self::model_transform().value() * Self::group_transform().value();
                let model = GeometryModel3D::new(mesh, white()).with_transform(Transform3D::Matrix(world));
                vec![store.add_geometry(model)]
            }
        })
    }

    fn check(&self, scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let expected = Self::expected();
        let samples = pixels(&[(196.0, 245.0), (150.0, 300.0), (250.0, 200.0), (120.0, 150.0)]);
        for side in Side::BOTH {
            let viewport = scenes.side(side);
            let bounds = viewport.bounds()?;
            v.point(&format!("bounds min ({side})"), expected.min, bounds.min);
            v.point(&format!("bounds max ({side})"), expected.max, bounds.max);

            for &root in &viewport.children {
                let visual = viewport.store.visual_bounds(root, &Matrix4x4::identity())?;
                v.expect(&format!("root visual bounds match ({side})"), visual == bounds);
            }

            let slack = bounds.expanded(1e-9);
            let mut hits = 0;
            for &p in &samples {
                for hit in viewport.hits_at(p)? {
                    hits += 1;
                    v.expect(
                        &format!("hit {:?} at ({}, {}) inside bounds ({side})", hit.point, p.x, p.y),
                        slack.contains_point(&hit.point),
                    );
                }
            }
            v.expect(&format!("plane is hit ({side})"), hits > 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_sides_agree() {
        let mut left = TorusTopology::torus(Side::Left).unwrap();
        let mut right = TorusTopology::torus(Side::Right).unwrap();
        assert_eq!(left.mesh(), right.mesh());
        assert_eq!(left.mesh().vertex_count(), 225);
    }

    #[test]
    fn test_trackball_sides_share_world_matrix() {
        let trackball = TrackballCase::dragged().unwrap();
        assert!(trackball.zoom() > 1.0);
        assert!(!trackball.orientation().is_identity());
    }

    #[test]
    fn test_bounds_expected_box() {
        let mut store = SceneStore::new();
        let ids = Bounds.geometry(Side::Left, &mut store).unwrap();
        let bounds = store.model_bounds(ids[0], &Matrix4x4::identity()).unwrap();
        assert_eq!(bounds, Bounds::expected());
    }
}
