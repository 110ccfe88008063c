//! Transform equivalence: the same torus placed by two different transform
//! spellings must land on the same world matrix and cover the same pixels.

use basic3d_kernel::{
    Camera, GeometryModel3D, Matrix4x4, MatrixCamera, ModelId, SceneStore, Transform3D, Vec3,
};
use basic3d_tessellation::Torus;

use super::check_both_sides;
use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::config::HarnessConfig;
use crate::helpers::{default_camera, pixel_grid, white, HarnessError};
use crate::oracle::check_same_coverage;
use crate::reference;

/// Where a side's transform sits: on the torus itself or on the group
/// holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub model: Transform3D,
    pub group: Transform3D,
}

impl Placement {
    pub fn on_model(transform: Transform3D) -> Self {
        Self {
            model: transform,
            group: Transform3D::Identity,
        }
    }

    pub fn on_group(transform: Transform3D) -> Self {
        Self {
            model: Transform3D::Identity,
            group: transform,
        }
    }

    /// The composed model-to-world matrix.
    pub fn world(&self) -> Matrix4x4 {
        self.model.value() * self.group.value()
    }
}

/// A pair of placements that must be indistinguishable.
#[derive(Debug, Clone)]
pub struct Equivalence {
    name: &'static str,
    left: Placement,
    right: Placement,
    camera: Camera,
    hits: &'static [(f64, f64)],
    misses: &'static [(f64, f64)],
}

impl Equivalence {
    fn on_models(name: &'static str, left: Transform3D, right: Transform3D) -> Self {
        Self {
            name,
            left: Placement::on_model(left),
            right: Placement::on_model(right),
            camera: default_camera(),
            hits: &[],
            misses: &[],
        }
    }

    /// Axis-angle rotation against the explicit Rodrigues matrix.
    pub fn rotate() -> Self {
        let axis = Vec3::new(1.0, 1.0, 1.0);
        let angle = 30.0;
        let matrix = reference::rodrigues(axis, angle).unwrap_or_default();
        Self::on_models("Rotate", Transform3D::rotate(axis, angle), Transform3D::Matrix(matrix))
    }

    pub fn scale() -> Self {
        let (sx, sy, sz) = (1.5, 2.2, 0.35);
        let matrix = Matrix4x4::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self::on_models("Scale", Transform3D::scale(sx, sy, sz), Transform3D::Matrix(matrix))
    }

    pub fn translate() -> Self {
        let (tx, ty, tz) = (0.1, 0.2341, 0.345);
        let matrix = Matrix4x4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [tx, ty, tz, 1.0],
        ]);
        Self::on_models("Translate", Transform3D::translate(tx, ty, tz), Transform3D::Matrix(matrix))
    }

    /// A camera's view and projection folded into the model transform and
    /// seen through an identity matrix camera.
    pub fn non_affine() -> Self {
        let view = Matrix4x4::from_rows([
            [0.98058067569092, -0.0377425678048199, 0.192450089729875, 0.0],
            [0.0, 0.981306762925316, 0.192450089729875, 0.0],
            [-0.196116135138184, -0.188712839024099, 0.962250448649376, 0.0],
            [5.55111512312578E-17, 5.55111512312578E-17, -2.59807621135332, 1.0],
        ]);
        let projection = Matrix4x4::from_rows([
            [2.74747741945462, 0.0, 0.0, 0.0],
            [0.0, 2.74747741945462, 0.0, 0.0],
            [0.0, 0.0, -1.02564102564103, -1.0],
            [0.0, 0.0, -0.256410256410256, 0.0],
        ]);
        let transform = Transform3D::Matrix(view * projection);
        Self {
            camera: Camera::Matrix(MatrixCamera::default()),
            hits: &[(157.0, 250.0)],
            misses: &[(196.0, 245.0), (100.0, 100.0)],
            ..Self::on_models("Non-Affine", transform.clone(), transform)
        }
    }

    /// A scale-then-translate group against the same steps applied to a
    /// matrix.
    pub fn transform_collection() -> Self {
        let scale = Vec3::new(2.0, 3.0, 4.0);
        let translation = Vec3::new(0.2, 0.3, 0.4);
        let group = Transform3D::Group(vec![
            Transform3D::scale(scale.x, scale.y, scale.z),
            Transform3D::translate(translation.x, translation.y, translation.z),
        ]);
        let mut matrix = Matrix4x4::identity();
        matrix.scale(scale);
        matrix.translate(translation);
        Self::on_models("Transform Collection", group, Transform3D::Matrix(matrix))
    }

    /// The same scale on the torus or on its parent group.
    pub fn model_vs_prim() -> Self {
        let scale = Transform3D::scale(2.0, 2.0, 2.0);
        Self {
            name: "Model vs. Prim",
            left: Placement::on_model(scale.clone()),
            right: Placement::on_group(scale),
            camera: default_camera(),
            hits: &[],
            misses: &[],
        }
    }

    pub fn placement(&self, side: Side) -> &Placement {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl TestCase for Equivalence {
    fn name(&self) -> &'static str {
        self.name
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(self.camera.clone())
    }

    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        let placement = self.placement(side);
        let mut torus = Torus::default();
        let model = GeometryModel3D::new(torus.mesh().clone(), white()).with_transform(placement.model.clone());
        let model = store.add_geometry(model);
        Ok(vec![store.add_group(vec![model], placement.group.clone())])
    }

    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        v.matrix("world matrix", &self.left.world(), &self.right.world());

        let grid = pixel_grid(
            config.viewport_width,
            config.viewport_height,
            config.equivalence_step,
        );
        let coverage = check_same_coverage(&scenes.left, &scenes.right, &grid)?;
        v.verdict(&coverage);
        if coverage.passed {
            v.expect("torus covers part of the grid", coverage.value.unwrap_or(0.0) > 0.0);
        }

        check_both_sides(scenes, v, self.hits, self.misses)
    }
}
