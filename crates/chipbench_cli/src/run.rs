//! `chipbench run`: build the design and run one test entrypoint.

use std::time::Duration;

use chipbench_config::{resolve_build, resolve_scenario, resolve_time_limit, EnvOverrides};
use chipbench_runner::{backend_for, BuildRequest, RunReport, RunRequest};

use crate::pipeline::load_project;
use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `chipbench run` command.
///
/// Returns exit code 0 if the test passed and 1 if it failed. Hangs,
/// watchdog expiries, and setup problems are errors.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    execute(args, global, &EnvOverrides::from_env())
}

fn execute(
    args: &RunArgs,
    global: &GlobalArgs,
    env: &EnvOverrides,
) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global, env, args.gl)?;
    let config = &project.config;

    let build = resolve_build(config, &project.dir, project.home.as_deref())?;
    let scenario = resolve_scenario(config)?;
    let backend = backend_for(&config.simulation.backend)?;

    if !global.quiet {
        let view = if config.simulation.gate_level {
            "gate-level"
        } else {
            "behavioral"
        };
        eprintln!(
            "   Building {} ({view}, {} source file(s), backend {})",
            build.top,
            build.sources.len(),
            backend.name()
        );
    }
    let model = backend.build(&BuildRequest::from(build))?;

    let mut plusargs = config.simulation.plusargs.clone();
    plusargs.extend(args.plusargs.iter().cloned());
    let request = RunRequest {
        test: args
            .test
            .clone()
            .unwrap_or_else(|| config.scenario.test.clone()),
        plusargs,
        scenario,
        time_limit_fs: resolve_time_limit(config)?,
        wall_timeout: (config.simulation.wall_timeout_secs > 0)
            .then(|| Duration::from_secs(config.simulation.wall_timeout_secs)),
    };

    if !global.quiet {
        eprintln!("   Running {}", request.test);
    }
    let report = backend.run(&model, &request)?;

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                print_report(&report);
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.outcome.is_pass() { 0 } else { 1 })
}

fn print_report(report: &RunReport) {
    match report.outcome.failure() {
        None => eprintln!(
            "   PASS  {name} ({time})",
            name = report.test,
            time = report.final_time,
        ),
        Some(failure) => eprintln!(
            "   FAIL  {name}: {failure} ({time})",
            name = report.test,
            time = report.final_time,
        ),
    }
}
