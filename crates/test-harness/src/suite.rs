//! Suite driver: runs cases, turns errors and panics into failed results,
//! and adds the scene round trip and hit timing on top of each case's own
//! checks.

use std::io::BufRead;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use basic3d_kernel::Viewport3D;
use tracing::{error, info, instrument, warn};

use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::cases::{all_cases, find_case};
use crate::config::HarnessConfig;
use crate::helpers::{pixel_grid, HarnessError};
use crate::oracle::{check_identical_hits, do_hit_test};
use crate::report::{CaseResult, SuiteReport};

/// Pixel spacing of the grid compared before and after the round trip.
const ROUND_TRIP_STEP: usize = 28;

/// Build, check and post-check one case. Errors escape; mismatches are in
/// the returned verifier.
fn execute(case: &dyn TestCase, config: &HarnessConfig) -> Result<Verifier, HarnessError> {
    let scenes = ScenePair::build(case, config.viewport_width, config.viewport_height)?;
    let mut verifier = Verifier::new(case.name(), config.comparison);
    case.check(&scenes, config, &mut verifier)?;

    if config.round_trip && case.round_trip() {
        check_round_trip(case, &scenes, config, &mut verifier)?;
    }
    if config.hit_timing {
        time_hit_tests(case, &scenes, config)?;
    }
    Ok(verifier)
}

/// Serialize each side to JSON and back; the copy must hit exactly like the
/// original.
fn check_round_trip(
    case: &dyn TestCase,
    scenes: &ScenePair,
    config: &HarnessConfig,
    verifier: &mut Verifier,
) -> Result<(), HarnessError> {
    let grid = pixel_grid(config.viewport_width, config.viewport_height, ROUND_TRIP_STEP);
    for side in Side::BOTH {
        let original = scenes.side(side);
        let copy = Viewport3D::from_json(&original.to_json()?)?;
        let verdict = check_identical_hits(original, &copy, &grid)?;
        if !verdict.passed {
            let mismatch = HarnessError::RoundTripMismatch {
                case: case.name().to_string(),
                side: side.to_string(),
                detail: verdict.detail.clone(),
            };
            verifier.expect(&mismatch.to_string(), false);
        } else {
            verifier.verdict(&verdict);
        }
    }
    Ok(())
}

/// Hit-test every `timing_step`-th pixel of both sides and log how long it
/// took.
fn time_hit_tests(case: &dyn TestCase, scenes: &ScenePair, config: &HarnessConfig) -> Result<(), HarnessError> {
    let grid = pixel_grid(config.viewport_width, config.viewport_height, config.timing_step);
    for side in Side::BOTH {
        let viewport = scenes.side(side);
        let start = Instant::now();
        let mut hits = 0usize;
        for &p in &grid {
            if do_hit_test(viewport, p)? {
                hits += 1;
            }
        }
        info!(
            case = case.name(),
            %side,
            pixels = grid.len(),
            hits,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "hit timing"
        );
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run one case. Never fails: errors and panics become a failed result.
#[instrument(skip(case, config), fields(case = case.name()))]
pub fn run_case(case: &dyn TestCase, config: &HarnessConfig) -> CaseResult {
    info!("starting");
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| execute(case, config)));
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let result = match outcome {
        Ok(Ok(verifier)) => CaseResult {
            name: case.name().to_string(),
            passed: verifier.passed(),
            checks: verifier.checks(),
            failures: verifier.into_failures(),
            error: None,
            elapsed_ms,
        },
        Ok(Err(e)) => {
            error!(error = %e, "case aborted");
            CaseResult::aborted(case.name(), &e, elapsed_ms)
        }
        Err(payload) => {
            let e = HarnessError::CasePanicked {
                case: case.name().to_string(),
                message: panic_message(payload.as_ref()),
            };
            error!(error = %e, "case panicked");
            CaseResult::aborted(case.name(), &e, elapsed_ms)
        }
    };

    if result.passed {
        info!(checks = result.checks, elapsed_ms, "passed");
    } else {
        warn!(
            checks = result.checks,
            failures = result.failures.len(),
            "failed"
        );
    }
    result
}

/// Run every case the config selects, in order.
pub fn run_suite(config: &HarnessConfig) -> SuiteReport {
    let mut report = SuiteReport::default();
    for case in all_cases() {
        if config.selects(case.name()) {
            report.cases.push(run_case(case.as_ref(), config));
        }
    }
    info!("{}", report.summary_line());
    report
}

/// Run the cases named one per line on `input` until `quit` or end of
/// input. Unknown names are reported as failed cases.
pub fn run_named<R: BufRead>(input: R, config: &HarnessConfig) -> Result<SuiteReport, HarnessError> {
    let mut report = SuiteReport::default();
    for line in input.lines() {
        let line = line?;
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case("quit") {
            break;
        }
        match find_case(name) {
            Ok(case) => report.cases.push(run_case(case.as_ref(), config)),
            Err(e) => {
                warn!(error = %e, "skipping");
                report.cases.push(CaseResult::aborted(name, &e, 0.0));
            }
        }
    }
    info!("{}", report.summary_line());
    Ok(report)
}

/// Repeat the suite until a run fails or `max_runs` runs have passed, and
/// return the last report. `None` repeats without limit.
pub fn run_forever(config: &HarnessConfig, max_runs: Option<usize>) -> SuiteReport {
    let mut run = 0usize;
    loop {
        run += 1;
        let report = run_suite(config);
        info!(run, passed = report.passed(), "suite run finished");
        if !report.passed() || max_runs.is_some_and(|max| run >= max) {
            return report;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basic3d_kernel::{Camera, ModelId, SceneStore};

    use crate::helpers::default_camera;

    struct Panics;

    impl TestCase for Panics {
        fn name(&self) -> &'static str {
            "Panics"
        }

        fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
            Ok(default_camera())
        }

        fn geometry(&self, _side: Side, _store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
            Ok(Vec::new())
        }

        fn check(&self, _scenes: &ScenePair, _config: &HarnessConfig, _v: &mut Verifier) -> Result<(), HarnessError> {
            panic!("boom");
        }
    }

    struct Fails;

    impl TestCase for Fails {
        fn name(&self) -> &'static str {
            "Fails"
        }

        fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
            Ok(default_camera())
        }

        fn geometry(&self, _side: Side, _store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
            Ok(Vec::new())
        }

        fn check(&self, _scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
            v.scalar("one", 1.0, 2.0);
            Err(HarnessError::ContractViolation {
                detail: "hit without a model".to_string(),
            })
        }
    }

    #[test]
    fn test_panic_becomes_failed_case() {
        let result = run_case(&Panics, &HarnessConfig::default());
        assert!(!result.passed);
        let error = result.error.unwrap();
        assert!(error.contains("boom"), "{error}");
    }

    #[test]
    fn test_error_aborts_case() {
        let result = run_case(&Fails, &HarnessConfig::default());
        assert!(!result.passed);
        assert!(result.error.unwrap().contains("contract violated"));
    }

    #[test]
    fn test_run_named_stops_at_quit() {
        let input = "Math\n\nno such case\nquit\nBounds\n".as_bytes();
        let report = run_named(input, &HarnessConfig::quick()).unwrap();
        assert_eq!(report.cases.len(), 2);
        assert!(report.cases[0].passed);
        assert!(!report.cases[1].passed);
        assert_eq!(report.exit_code(), -1);
    }

    #[test]
    fn test_case_filter_limits_run() {
        let config = HarnessConfig {
            cases: vec!["clipped".to_string()],
            ..HarnessConfig::quick()
        };
        let report = run_suite(&config);
        assert_eq!(report.cases.len(), 1);
        assert_eq!(report.cases[0].name, "Hit Testing Clipped");
    }
}
