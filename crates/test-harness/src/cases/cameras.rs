//! Projection cameras against matrix cameras built from hand-written view
//! and projection matrices.

use basic3d_kernel::{
    Camera, GeometryModel3D, KernelError, Matrix4x4, MatrixCamera, ModelId, OrthographicCamera,
    PerspectiveCamera, Point3d, SceneStore, Vec3,
};
use basic3d_tessellation::Torus;

use super::check_both_sides;
use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::config::HarnessConfig;
use crate::helpers::{pixel_grid, white, HarnessError};
use crate::oracle::check_same_coverage;
use crate::reference;

const POSITION: Point3d = Point3d {
    x: 0.5,
    y: 0.5,
    z: 2.5,
};
const LOOK: Vec3 = Vec3 {
    x: -0.5,
    y: -0.5,
    z: -2.5,
};
const NEAR: f64 = 0.24;
const FAR: f64 = 10.0;

fn reference_view() -> Result<Matrix4x4, HarnessError> {
    reference::view_matrix(POSITION, LOOK, Vec3::Y).ok_or_else(|| {
        HarnessError::Kernel(KernelError::InvalidArgument {
            name: "up_direction",
            reason: "parallel to the look direction".to_string(),
        })
    })
}

fn torus(store: &mut SceneStore) -> Vec<ModelId> {
    let mut torus = Torus::default();
    vec![store.add_geometry(GeometryModel3D::new(torus.mesh().clone(), white()))]
}

/// Compare both sides' view and projection matrices, then their coverage.
fn check_matrices(scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
    let aspect = scenes.left.aspect_ratio();
    v.matrix(
        "view matrix",
        &scenes.right.camera.view_matrix()?,
        &scenes.left.camera.view_matrix()?,
    );
    v.matrix(
        "projection matrix",
        &scenes.right.camera.projection_matrix(aspect),
        &scenes.left.camera.projection_matrix(aspect),
    );

    let grid = pixel_grid(
        config.viewport_width,
        config.viewport_height,
        config.equivalence_step,
    );
    let coverage = check_same_coverage(&scenes.left, &scenes.right, &grid)?;
    v.verdict(&coverage);
    Ok(())
}

// ── Perspective ─────────────────────────────────────────────────────────────

pub struct PerspectiveVsMatrix;

impl PerspectiveVsMatrix {
    const FIELD_OF_VIEW: f64 = 40.0;
}

impl TestCase for PerspectiveVsMatrix {
    fn name(&self) -> &'static str {
        "Perspective vs. Matrix"
    }

    fn camera(&self, side: Side, aspect: f64) -> Result<Camera, HarnessError> {
        Ok(match side {
            Side::Left => Camera::Perspective(
                PerspectiveCamera::new(POSITION, LOOK, Vec3::Y, Self::FIELD_OF_VIEW).with_planes(NEAR, FAR),
            ),
            Side::Right => Camera::Matrix(MatrixCamera {
                view_matrix: reference_view()?,
                projection_matrix: reference::perspective_projection(Self::FIELD_OF_VIEW, aspect, NEAR, FAR),
            }),
        })
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        Ok(torus(store))
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        check_matrices(scenes, config, v)?;
        check_both_sides(scenes, v, &[(240.0, 262.0)], &[(198.0, 283.0), (183.0, 151.0)])
    }
}

// ── Orthographic ────────────────────────────────────────────────────────────

pub struct OrthographicVsMatrix;

impl OrthographicVsMatrix {
    const WIDTH: f64 = 2.0;
}

impl TestCase for OrthographicVsMatrix {
    fn name(&self) -> &'static str {
        "Orthographic vs. Matrix"
    }

    fn camera(&self, side: Side, aspect: f64) -> Result<Camera, HarnessError> {
        Ok(match side {
            Side::Left => Camera::Orthographic(
                OrthographicCamera::new(POSITION, LOOK, Vec3::Y, Self::WIDTH).with_planes(NEAR, FAR),
            ),
            Side::Right => Camera::Matrix(MatrixCamera {
                view_matrix: reference_view()?,
                projection_matrix: reference::orthographic_projection(Self::WIDTH, aspect, NEAR, FAR),
            }),
        })
    }

    fn geometry(&self, _side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        Ok(torus(store))
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        check_matrices(scenes, config, v)?;
        check_both_sides(scenes, v, &[(210.0, 289.0)], &[(218.0, 264.0), (207.0, 135.0)])
    }
}
