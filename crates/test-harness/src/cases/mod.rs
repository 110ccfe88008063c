//! The suite's test cases, in run order.

mod cameras;
mod extras;
mod hit_testing;
mod math;
mod scenes;
mod transforms;

pub use cameras::{OrthographicVsMatrix, PerspectiveVsMatrix};
pub use extras::{Bounds, TorusTopology, TrackballCase};
pub use hit_testing::{HitTesting, HitTestingClipped};
pub use math::Math;
pub use scenes::{BackMaterial, Defaults, FlattenedSpheres, LargeVertexNonIndexed, NonIndexedMeshes, WeirdMeshes};
pub use transforms::Equivalence;

use basic3d_kernel::{GeometryModel3D, Model3D, Viewport3D};

use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::helpers::{pixels, HarnessError};
use crate::oracle::check_hit_pattern;

pub fn all_cases() -> Vec<Box<dyn TestCase>> {
    vec![
        Box::new(Defaults),
        Box::new(NonIndexedMeshes),
        Box::new(FlattenedSpheres),
        Box::new(WeirdMeshes),
        Box::new(Equivalence::rotate()),
        Box::new(Equivalence::scale()),
        Box::new(Equivalence::translate()),
        Box::new(Equivalence::non_affine()),
        Box::new(Equivalence::transform_collection()),
        Box::new(Equivalence::model_vs_prim()),
        Box::new(PerspectiveVsMatrix),
        Box::new(OrthographicVsMatrix),
        Box::new(BackMaterial),
        Box::new(HitTesting),
        Box::new(HitTestingClipped),
        Box::new(LargeVertexNonIndexed),
        Box::new(Math),
        Box::new(TorusTopology),
        Box::new(TrackballCase),
        Box::new(Bounds),
    ]
}

/// The case whose name matches `name`, ignoring case.
pub fn find_case(name: &str) -> Result<Box<dyn TestCase>, HarnessError> {
    all_cases()
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| HarnessError::UnknownCase {
            name: name.trim().to_string(),
        })
}

/// Require the same hits and misses on both sides.
fn check_both_sides(
    scenes: &ScenePair,
    verifier: &mut Verifier,
    hits: &[(f64, f64)],
    misses: &[(f64, f64)],
) -> Result<(), HarnessError> {
    let (hits, misses) = (pixels(hits), pixels(misses));
    for side in Side::BOTH {
        let verdict = check_hit_pattern(scenes.side(side), &hits, &misses)?;
        verifier.hits(side, &verdict);
    }
    Ok(())
}

/// Every geometry model in the viewport's store.
fn geometry_models(viewport: &Viewport3D) -> impl Iterator<Item = &GeometryModel3D> + '_ {
    viewport.store.models.values().filter_map(|m| match m {
        Model3D::Geometry(g) => Some(g),
        _ => None,
    })
}
