//! The `TestCase` trait and the paired left/right scenes every case builds.

use std::fmt;

use basic3d_kernel::{Camera, Light, ModelId, SceneStore, Transform3D, Viewport3D};
use serde::Serialize;
use tracing::debug;

use crate::assertions::Verifier;
use crate::config::HarnessConfig;
use crate::helpers::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn is_left(self) -> bool {
        self == Side::Left
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("Left"),
            Side::Right => f.write_str("Right"),
        }
    }
}

/// One named check built from a pair of scenes.
///
/// Each side's viewport holds a single root visual whose content is a group
/// of the side's lights followed by its geometry.
pub trait TestCase {
    fn name(&self) -> &'static str;

    fn camera(&self, side: Side, aspect: f64) -> Result<Camera, HarnessError>;

    fn lights(&self, _side: Side) -> Vec<Light> {
        crate::helpers::default_lights()
    }

    /// Add the side's models to `store`, returning the top-level ones.
    fn geometry(&self, side: Side, store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError>;

    /// Whether the scenes survive the JSON round trip check.
    fn round_trip(&self) -> bool {
        true
    }

    /// Verify the built scenes, recording every mismatch in `verifier`.
    fn check(&self, scenes: &ScenePair, config: &HarnessConfig, verifier: &mut Verifier) -> Result<(), HarnessError>;
}

/// The two viewports of a case.
#[derive(Debug, Clone)]
pub struct ScenePair {
    pub left: Viewport3D,
    pub right: Viewport3D,
}

impl ScenePair {
    pub fn build(case: &dyn TestCase, width: f64, height: f64) -> Result<Self, HarnessError> {
        Ok(Self {
            left: build_side(case, Side::Left, width, height)?,
            right: build_side(case, Side::Right, width, height)?,
        })
    }

    pub fn side(&self, side: Side) -> &Viewport3D {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

fn build_side(case: &dyn TestCase, side: Side, width: f64, height: f64) -> Result<Viewport3D, HarnessError> {
    let camera = case.camera(side, width / height)?;
    let mut viewport = Viewport3D::new(camera, width, height);
    let store = &mut viewport.store;
    let mut content: Vec<ModelId> = case
        .lights(side)
        .into_iter()
        .map(|light| store.add_light(light))
        .collect();
    content.extend(case.geometry(side, store)?);
    let root = store.add_group(content, Transform3D::Identity);
    viewport.add_model_visual(root);
    debug!(
        case = case.name(),
        %side,
        models = viewport.store.models.len(),
        "built scene"
    );
    Ok(viewport)
}
