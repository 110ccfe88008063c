//! Hit-test oracles: pure functions returning pass/fail verdicts.
//!
//! A count mismatch is a verdict, not an error, so a case can report every
//! failing point in one pass. A hit that names no visual or model, or ids
//! the viewport's store does not hold, breaks the hit-test contract: the
//! traversal is stopped and the oracle returns an error that aborts the
//! case.

use basic3d_kernel::{
    GeometryModel3D, HitTestResultBehavior, Model3D, Point2d, RayMeshHit, Viewport3D,
};
use tracing::{debug, error};

use crate::helpers::HarnessError;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    pub(crate) fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    pub(crate) fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    pub(crate) fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    pub(crate) fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Hit Counting ────────────────────────────────────────────────────────────

/// Count the hits under `pixel` that `accept` keeps.
///
/// `accept` sees the hit and the geometry model it landed on.
pub fn count_hits_where<F>(viewport: &Viewport3D, pixel: Point2d, mut accept: F) -> Result<usize, HarnessError>
where
    F: FnMut(&RayMeshHit, &GeometryModel3D) -> bool,
{
    let mut count = 0;
    let mut violation: Option<HarnessError> = None;
    viewport.hit_test(pixel, |hit| {
        let model = match resolve_hit(viewport, hit) {
            Ok(model) => model,
            Err(e) => {
                violation = Some(e);
                return HitTestResultBehavior::Stop;
            }
        };
        if accept(hit, model) {
            count += 1;
            debug!(
                x = pixel.x,
                y = pixel.y,
                distance = hit.distance,
                vertices = ?hit.vertex_indices,
                "counted hit"
            );
        }
        HitTestResultBehavior::Continue
    })?;

    if let Some(e) = violation {
        error!(x = pixel.x, y = pixel.y, error = %e, "stopped hit test");
        return Err(e);
    }
    Ok(count)
}

/// The geometry model a hit landed on, checked against the viewport's
/// store.
pub fn resolve_hit<'a>(viewport: &'a Viewport3D, hit: &RayMeshHit) -> Result<&'a GeometryModel3D, HarnessError> {
    let violation = |detail: String| HarnessError::ContractViolation { detail };
    let visual = hit
        .visual
        .ok_or_else(|| violation("hit without a visual".to_string()))?;
    if !viewport.store.visuals.contains_key(visual) {
        return Err(violation(format!("hit names unknown visual {visual:?}")));
    }
    let id = hit
        .model
        .ok_or_else(|| violation("hit without a model".to_string()))?;
    match viewport.store.models.get(id) {
        Some(Model3D::Geometry(model)) => Ok(model),
        Some(_) => Err(violation(format!("hit names non-geometry model {id:?}"))),
        None => Err(violation(format!("hit names unknown model {id:?}"))),
    }
}

pub fn count_hits(viewport: &Viewport3D, pixel: Point2d) -> Result<usize, HarnessError> {
    count_hits_where(viewport, pixel, |_, _| true)
}

/// Whether anything is hit under `pixel`.
pub fn do_hit_test(viewport: &Viewport3D, pixel: Point2d) -> Result<bool, HarnessError> {
    Ok(count_hits(viewport, pixel)? > 0)
}

/// Whether the hits summed over `points` total exactly `expected`.
pub fn do_hit_test_points(viewport: &Viewport3D, points: &[Point2d], expected: usize) -> Result<bool, HarnessError> {
    Ok(check_hit_count(viewport, points, expected)?.passed)
}

// ── Hit Oracles ─────────────────────────────────────────────────────────────

/// Verdict on the total hit count over `points`.
pub fn check_hit_count(viewport: &Viewport3D, points: &[Point2d], expected: usize) -> Result<OracleVerdict, HarnessError> {
    check_hit_count_where(viewport, points, expected, |_, _| true)
}

pub fn check_hit_count_where<F>(
    viewport: &Viewport3D,
    points: &[Point2d],
    expected: usize,
    mut accept: F,
) -> Result<OracleVerdict, HarnessError>
where
    F: FnMut(&RayMeshHit, &GeometryModel3D) -> bool,
{
    let mut actual = 0;
    for &p in points {
        actual += count_hits_where(viewport, p, &mut accept)?;
    }
    let detail = format!("Expected {expected} got {actual} hits.");
    Ok(if actual == expected {
        OracleVerdict::pass_val("hit_count", detail, actual as f64)
    } else {
        OracleVerdict::fail_val("hit_count", detail, actual as f64)
    })
}

/// Verdict on whether every pixel in `hits` hits something and every pixel
/// in `misses` hits nothing.
pub fn check_hit_pattern(
    viewport: &Viewport3D,
    hits: &[Point2d],
    misses: &[Point2d],
) -> Result<OracleVerdict, HarnessError> {
    let mut wrong = Vec::new();
    for &p in hits {
        if !do_hit_test(viewport, p)? {
            wrong.push(format!("expected a hit at ({}, {})", p.x, p.y));
        }
    }
    for &p in misses {
        if do_hit_test(viewport, p)? {
            wrong.push(format!("expected no hit at ({}, {})", p.x, p.y));
        }
    }
    Ok(if wrong.is_empty() {
        OracleVerdict::pass(
            "hit_pattern",
            format!("{} hits, {} misses", hits.len(), misses.len()),
        )
    } else {
        OracleVerdict::fail("hit_pattern", wrong.join("; "))
    })
}

/// Verdict on whether two viewports hit or miss alike at every pixel.
pub fn check_same_coverage(
    left: &Viewport3D,
    right: &Viewport3D,
    pixels: &[Point2d],
) -> Result<OracleVerdict, HarnessError> {
    let mut differing = Vec::new();
    let mut covered = 0;
    for &p in pixels {
        let l = do_hit_test(left, p)?;
        let r = do_hit_test(right, p)?;
        if l {
            covered += 1;
        }
        if l != r {
            differing.push((p.x, p.y));
        }
    }
    Ok(if differing.is_empty() {
        OracleVerdict::pass_val(
            "same_coverage",
            format!("{covered} of {} pixels hit on both sides", pixels.len()),
            covered as f64,
        )
    } else {
        OracleVerdict::fail(
            "same_coverage",
            format!(
                "{} pixels differ, first: {:?}",
                differing.len(),
                &differing[..differing.len().min(5)]
            ),
        )
    })
}

/// Verdict on whether two viewports report identical hit lists at every
/// pixel.
pub fn check_identical_hits(
    before: &Viewport3D,
    after: &Viewport3D,
    pixels: &[Point2d],
) -> Result<OracleVerdict, HarnessError> {
    for &p in pixels {
        let a = before.hits_at(p)?;
        let b = after.hits_at(p)?;
        if a != b {
            return Ok(OracleVerdict::fail(
                "identical_hits",
                format!("({}, {}): {} hits before, {} after", p.x, p.y, a.len(), b.len()),
            ));
        }
    }
    Ok(OracleVerdict::pass(
        "identical_hits",
        format!("{} pixels unchanged", pixels.len()),
    ))
}
