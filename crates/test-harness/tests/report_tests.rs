//! Tests for the report module.

use basic3d_harness::report::{CaseResult, SuiteReport};
use basic3d_harness::HarnessError;

fn case(name: &str, passed: bool) -> CaseResult {
    CaseResult {
        name: name.to_string(),
        passed,
        checks: 4,
        failures: if passed {
            Vec::new()
        } else {
            vec![format!("{name}: expected 1e0, got 2e0")]
        },
        error: None,
        elapsed_ms: 1.5,
    }
}

fn report(cases: Vec<CaseResult>) -> SuiteReport {
    SuiteReport {
        cases,
        ..SuiteReport::default()
    }
}

#[test]
fn all_passed_summary() {
    let r = report(vec![case("Rotate", true), case("Scale", true)]);
    assert!(r.passed());
    assert_eq!(r.summary_line(), "DrtBasic3D successfully completed 2 of 2 tests.");
    assert_eq!(r.exit_code(), 0);
}

#[test]
fn failed_summary_lists_names_in_order() {
    let r = report(vec![case("Rotate", false), case("Scale", true), case("Math", false)]);
    assert!(!r.passed());
    assert_eq!(
        r.summary_line(),
        "DrtBasic3D failed 2 of 3 tests. FAILED TESTS: Rotate, Math"
    );
    assert_eq!(r.exit_code(), -2);
}

#[test]
fn text_report_marks_each_case() {
    let r = report(vec![case("Rotate", true), case("Math", false)]);
    let text = r.to_text();
    assert!(text.contains("[PASS] Rotate (4 checks"), "{text}");
    assert!(text.contains("[FAIL] Math (4 checks"), "{text}");
    assert!(text.contains("Math: expected 1e0, got 2e0"), "{text}");
    assert!(text.trim_end().ends_with("FAILED TESTS: Math"), "{text}");
    assert_eq!(text, r.to_string());
}

#[test]
fn aborted_case_carries_error() {
    let err = HarnessError::UnknownCase {
        name: "Teapot".to_string(),
    };
    let result = CaseResult::aborted("Teapot", &err, 0.0);
    assert!(!result.passed);
    assert_eq!(result.error.as_deref(), Some("no test case named `Teapot`"));
    let text = report(vec![result]).to_text();
    assert!(text.contains("error: no test case named `Teapot`"), "{text}");
}

#[test]
fn json_report_round_trips() {
    let r = report(vec![case("Bounds", true), case("Hit Testing", false)]);
    let json = r.to_json().unwrap();
    assert!(json.contains("\"suite\": \"DrtBasic3D\""), "{json}");
    let back: SuiteReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
}

#[test]
fn empty_report_passes() {
    let r = SuiteReport::default();
    assert!(r.passed());
    assert_eq!(r.summary_line(), "DrtBasic3D successfully completed 0 of 0 tests.");
}
