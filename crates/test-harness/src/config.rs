//! Suite configuration and command-line parsing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::helpers::{HarnessError, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// How scalar matrix components are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonMode {
    /// `|a - b| / (|a| + |b| + 10) < f64::EPSILON`.
    #[default]
    Relative,
    /// `|a - b| < ComparisonMode::ABSOLUTE_TOLERANCE`.
    Absolute,
}

impl ComparisonMode {
    pub const ABSOLUTE_TOLERANCE: f64 = 1e-10;
}

/// What the binary should do after parsing its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunAction {
    #[default]
    Run,
    PrintTier,
    PrintUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub action: RunAction,
    pub comparison: ComparisonMode,
    /// Serialize every scene to JSON and back and require unchanged hits.
    pub round_trip: bool,
    /// Read case names from stdin instead of running the whole suite.
    pub interactive: bool,
    /// Repeat the suite until a run fails.
    pub forever: bool,
    /// Time a dense grid of hit tests per case.
    pub hit_timing: bool,
    /// Pixel spacing of the timing grid.
    pub timing_step: usize,
    /// Pixel spacing of the grid both sides of an equivalence case must
    /// agree on.
    pub equivalence_step: usize,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Run only cases whose name contains one of these (case-insensitive).
    pub cases: Vec<String>,
    pub json_report: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            action: RunAction::Run,
            comparison: ComparisonMode::Relative,
            round_trip: true,
            interactive: false,
            forever: false,
            hit_timing: false,
            timing_step: 4,
            equivalence_step: 28,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            cases: Vec::new(),
            json_report: None,
        }
    }
}

impl HarnessConfig {
    /// Coarse grids and no scene round trip.
    pub fn quick() -> Self {
        Self {
            round_trip: false,
            equivalence_step: 56,
            ..Self::default()
        }
    }

    /// Dense equivalence grid with the round trip on.
    pub fn strict() -> Self {
        Self {
            round_trip: true,
            equivalence_step: 14,
            ..Self::default()
        }
    }

    /// Whether `name` passes the `-case` filter.
    pub fn selects(&self, name: &str) -> bool {
        if self.cases.is_empty() {
            return true;
        }
        let name = name.to_lowercase();
        self.cases.iter().any(|c| name.contains(&c.to_lowercase()))
    }
}

pub const USAGE: &str = "\
usage: drt-basic3d [flags]
  -i              read case names from stdin; `quit` ends
  -forever        repeat the suite until a run fails
  -hit            time a hit test of every 4th pixel per case
  -tier           print the rendering tier and exit
  -case <name>    run only cases whose name contains <name> (repeatable)
  -json <path>    write the JSON report to <path>
  -absolute       compare matrix components with an absolute 1e-10
  -noroundtrip    skip the scene JSON round trip
  -quick          coarse grids, no round trip
  -strict         dense equivalence grid
  -cover, -help   print this text and exit";

/// Fill a default config from command-line arguments. The first element is
/// the program name. Unknown flags are logged and skipped.
pub fn parse_args(args: &[String]) -> Result<HarnessConfig, HarnessError> {
    let mut cfg = HarnessConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => {
                cfg.interactive = true;
                i += 1;
            }
            "-forever" => {
                cfg.forever = true;
                i += 1;
            }
            "-hit" => {
                cfg.hit_timing = true;
                i += 1;
            }
            "-tier" => {
                cfg.action = RunAction::PrintTier;
                i += 1;
            }
            "-cover" | "-help" | "--help" | "-?" => {
                cfg.action = RunAction::PrintUsage;
                i += 1;
            }
            "-absolute" => {
                cfg.comparison = ComparisonMode::Absolute;
                i += 1;
            }
            "-noroundtrip" => {
                cfg.round_trip = false;
                i += 1;
            }
            "-quick" => {
                cfg = HarnessConfig {
                    cases: cfg.cases,
                    json_report: cfg.json_report,
                    ..HarnessConfig::quick()
                };
                i += 1;
            }
            "-strict" => {
                cfg = HarnessConfig {
                    cases: cfg.cases,
                    json_report: cfg.json_report,
                    ..HarnessConfig::strict()
                };
                i += 1;
            }
            "-case" if i + 1 < args.len() => {
                cfg.cases.push(args[i + 1].clone());
                i += 2;
            }
            "-json" if i + 1 < args.len() => {
                cfg.json_report = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            flag @ ("-case" | "-json") => {
                return Err(HarnessError::InvalidArgument {
                    flag: flag.to_string(),
                    reason: "missing value".to_string(),
                });
            }
            other => {
                warn!(flag = other, "ignoring unknown flag");
                i += 1;
            }
        }
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("drt-basic3d")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_flags_gives_default() {
        assert_eq!(parse_args(&args(&[])).unwrap(), HarnessConfig::default());
    }

    #[test]
    fn test_flags_set_fields() {
        let cfg = parse_args(&args(&[
            "-i", "-hit", "-absolute", "-noroundtrip", "-case", "math", "-case", "Bounds", "-json",
            "out.json",
        ]))
        .unwrap();
        assert!(cfg.interactive);
        assert!(cfg.hit_timing);
        assert_eq!(cfg.comparison, ComparisonMode::Absolute);
        assert!(!cfg.round_trip);
        assert_eq!(cfg.cases, vec!["math".to_string(), "Bounds".to_string()]);
        assert_eq!(cfg.json_report, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_missing_value_is_error() {
        assert!(matches!(
            parse_args(&args(&["-case"])),
            Err(HarnessError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_help_and_tier_actions() {
        assert_eq!(parse_args(&args(&["-cover"])).unwrap().action, RunAction::PrintUsage);
        assert_eq!(parse_args(&args(&["-tier"])).unwrap().action, RunAction::PrintTier);
    }

    #[test]
    fn test_case_filter_matches_substrings() {
        let cfg = HarnessConfig {
            cases: vec!["hit testing".to_string()],
            ..HarnessConfig::default()
        };
        assert!(cfg.selects("Hit Testing"));
        assert!(cfg.selects("Hit Testing Clipped"));
        assert!(!cfg.selects("Math"));
        assert!(HarnessConfig::default().selects("Math"));
    }

    #[test]
    fn test_presets_keep_case_filter() {
        let cfg = parse_args(&args(&["-case", "rotate", "-quick"])).unwrap();
        assert!(!cfg.round_trip);
        assert_eq!(cfg.cases, vec!["rotate".to_string()]);
    }
}
