//! Numeric comparisons and the per-case `Verifier` that accumulates them.
//!
//! A mismatch never aborts a case: it is logged with the values involved,
//! counted, and the case keeps running so every failing aspect is reported
//! in one pass.

use basic3d_kernel::{Matrix4x4, Point3d, Quaternion, Vec3};
use tracing::warn;

use crate::case::Side;
use crate::config::ComparisonMode;
use crate::oracle::OracleVerdict;

/// `a == b`, or `|a - b| / (|a| + |b| + 10) < f64::EPSILON`.
///
/// The exact test comes first so equal infinities compare equal.
pub fn verify(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() / (a.abs() + b.abs() + 10.0) < f64::EPSILON
}

/// For values that went through a trigonometric round trip.
pub fn verify_low_precision(a: f64, b: f64) -> bool {
    (a - b).abs() < 1.5e-6
}

pub fn verify_absolute(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

pub fn verify_with(mode: ComparisonMode, a: f64, b: f64) -> bool {
    match mode {
        ComparisonMode::Relative => verify(a, b),
        ComparisonMode::Absolute => a == b || verify_absolute(a, b, ComparisonMode::ABSOLUTE_TOLERANCE),
    }
}

/// Indices `0..16` of the components where `a` and `b` disagree.
pub fn matrix_mismatches(mode: ComparisonMode, a: &Matrix4x4, b: &Matrix4x4) -> Vec<usize> {
    (0..16).filter(|&i| !verify_with(mode, a.m[i], b.m[i])).collect()
}

fn component_name(index: usize) -> String {
    match index {
        12 => "OffsetX".to_string(),
        13 => "OffsetY".to_string(),
        14 => "OffsetZ".to_string(),
        _ => format!("M{}{}", index / 4 + 1, index % 4 + 1),
    }
}

// ── Verifier ────────────────────────────────────────────────────────────────

/// Collects the checks of one case.
#[derive(Debug, Clone)]
pub struct Verifier {
    case: String,
    mode: ComparisonMode,
    checks: usize,
    failures: Vec<String>,
}

impl Verifier {
    pub fn new(case: &str, mode: ComparisonMode) -> Self {
        Self {
            case: case.to_string(),
            mode,
            checks: 0,
            failures: Vec::new(),
        }
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn checks(&self) -> usize {
        self.checks
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, ok: bool, message: impl FnOnce() -> String) -> bool {
        self.checks += 1;
        if !ok {
            let message = message();
            warn!(case = %self.case, "{message}");
            self.failures.push(message);
        }
        ok
    }

    pub fn expect(&mut self, what: &str, ok: bool) -> bool {
        self.record(ok, || format!("{what} failed"))
    }

    /// Compare two scalars under the configured comparison mode.
    pub fn scalar(&mut self, what: &str, expected: f64, actual: f64) -> bool {
        let ok = verify_with(self.mode, expected, actual);
        self.record(ok, || format!("{what}: expected {expected:e}, got {actual:e}"))
    }

    pub fn low_precision(&mut self, what: &str, expected: f64, actual: f64) -> bool {
        self.record(verify_low_precision(expected, actual), || {
            format!("{what}: expected {expected:e}, got {actual:e} (low precision)")
        })
    }

    pub fn within(&mut self, what: &str, expected: f64, actual: f64, tolerance: f64) -> bool {
        self.record(verify_absolute(expected, actual, tolerance), || {
            format!("{what}: expected {expected:e}, got {actual:e} (tolerance {tolerance:e})")
        })
    }

    /// Component-wise matrix comparison; one check, one failure listing
    /// every mismatched component.
    pub fn matrix(&mut self, what: &str, expected: &Matrix4x4, actual: &Matrix4x4) -> bool {
        let bad = matrix_mismatches(self.mode, expected, actual);
        self.record(bad.is_empty(), || {
            let detail: Vec<String> = bad
                .iter()
                .map(|&i| format!("{} {:e} != {:e}", component_name(i), expected.m[i], actual.m[i]))
                .collect();
            format!("{what}: {}", detail.join(", "))
        })
    }

    pub fn vector(&mut self, what: &str, expected: Vec3, actual: Vec3) -> bool {
        let ok = verify_with(self.mode, expected.x, actual.x)
            && verify_with(self.mode, expected.y, actual.y)
            && verify_with(self.mode, expected.z, actual.z);
        self.record(ok, || format!("{what}: expected {expected:?}, got {actual:?}"))
    }

    pub fn point(&mut self, what: &str, expected: Point3d, actual: Point3d) -> bool {
        self.vector(what, expected.to_vec3(), actual.to_vec3())
    }

    pub fn quaternion(&mut self, what: &str, expected: Quaternion, actual: Quaternion) -> bool {
        let ok = verify_with(self.mode, expected.x, actual.x)
            && verify_with(self.mode, expected.y, actual.y)
            && verify_with(self.mode, expected.z, actual.z)
            && verify_with(self.mode, expected.w, actual.w);
        self.record(ok, || format!("{what}: expected {expected:?}, got {actual:?}"))
    }

    /// Record a hit-count verdict for one side of the case.
    pub fn hits(&mut self, side: Side, verdict: &OracleVerdict) -> bool {
        let case = self.case.clone();
        self.record(verdict.passed, || {
            format!("Failed DoHitTest in {case} ({side}).  {}", verdict.detail)
        })
    }

    /// Record any oracle verdict.
    pub fn verdict(&mut self, verdict: &OracleVerdict) -> bool {
        self.record(verdict.passed, || format!("{}: {}", verdict.oracle_name, verdict.detail))
    }
}
