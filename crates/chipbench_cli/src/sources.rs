//! `chipbench sources`: print the resolved compile list.

use chipbench_config::{resolve_build, EnvOverrides, ResolvedBuild};

use crate::pipeline::load_project;
use crate::{GlobalArgs, SourcesArgs};

/// Runs the `chipbench sources` command.
pub fn run(args: &SourcesArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global, &EnvOverrides::from_env(), args.gl)?;
    let build = resolve_build(&project.config, &project.dir, project.home.as_deref())?;
    print!("{}", render(&build));
    Ok(0)
}

/// One line per entry: defines as `+define+NAME=VALUE`, includes as
/// `+incdir+DIR`, then source files in compile order.
fn render(build: &ResolvedBuild) -> String {
    let mut out = String::new();
    for (name, value) in &build.defines {
        out.push_str(&format!("+define+{name}={value}\n"));
    }
    for dir in &build.includes {
        out.push_str(&format!("+incdir+{}\n", dir.display()));
    }
    for file in &build.sources {
        out.push_str(&format!("{}\n", file.display()));
    }
    out
}
