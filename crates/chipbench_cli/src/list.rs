//! `chipbench list`: show the test entrypoints of the configured backend.

use chipbench_config::EnvOverrides;
use chipbench_runner::backend_for;

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `chipbench list` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global, &EnvOverrides::from_env(), false)?;
    let backend = backend_for(&project.config.simulation.backend)?;
    let default = &project.config.scenario.test;
    for name in backend.tests() {
        if &name == default {
            println!("{name} (default)");
        } else {
            println!("{name}");
        }
    }
    Ok(0)
}
