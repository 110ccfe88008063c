//! Verification harness for the basic3d kernel.
//!
//! Recomputes matrix and quaternion results in closed form and compares
//! them against the kernel, and builds pairs of scenes that must hit-test
//! identically.
//!
//! # Key Components
//!
//! - [`reference`]: Closed-form matrix, projection and view formulas
//! - [`assertions`]: Epsilon comparisons and the per-case [`Verifier`]
//! - [`oracle`]: Hit-test verdicts against one or two viewports
//! - [`cases`]: The paired scenes of the suite, in run order
//! - [`suite`]: Case execution, round trip and hit timing
//! - [`report`]: Text and JSON suite results

pub mod assertions;
pub mod case;
pub mod cases;
pub mod config;
pub mod helpers;
pub mod oracle;
pub mod reference;
pub mod report;
pub mod suite;

pub use assertions::Verifier;
pub use case::{ScenePair, Side, TestCase};
pub use config::{ComparisonMode, HarnessConfig};
pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::{CaseResult, SuiteReport};
pub use suite::{run_case, run_suite};
