//! `drt-basic3d`: run the basic3d verification suite.

use std::io;
use std::process;

use basic3d_harness::config::{parse_args, RunAction, USAGE};
use basic3d_harness::suite::{run_forever, run_named, run_suite};
use basic3d_harness::{HarnessError, HarnessConfig, SuiteReport};
use tracing::{error, info};

/// The kernel hit-tests on the CPU only.
const RENDERING_TIER: u32 = 0;

fn run(config: &HarnessConfig) -> Result<SuiteReport, HarnessError> {
    let report = if config.interactive {
        run_named(io::stdin().lock(), config)?
    } else if config.forever {
        run_forever(config, None)
    } else {
        run_suite(config)
    };

    for case in report.cases.iter().filter(|c| !c.passed) {
        error!(
            case = %case.name,
            failures = case.failures.len(),
            error = case.error.as_deref().unwrap_or(""),
            "case failed"
        );
    }
    println!("{}", report.summary_line());

    if let Some(path) = &config.json_report {
        std::fs::write(path, report.to_json()?)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(report)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            process::exit(1);
        }
    };

    match config.action {
        RunAction::PrintUsage => {
            println!("{USAGE}");
            process::exit(0);
        }
        RunAction::PrintTier => {
            println!("Rendering tier: {RENDERING_TIER} (software)");
            process::exit(0);
        }
        RunAction::Run => {}
    }

    match run(&config) {
        Ok(report) => process::exit(report.exit_code()),
        Err(e) => {
            error!(error = %e, "suite aborted");
            process::exit(1);
        }
    }
}
