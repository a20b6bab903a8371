//! The build/run contract every simulation backend implements.

use std::path::PathBuf;
use std::time::Duration;

use chipbench_config::{Defines, ResolvedBuild};
use chipbench_harness::{ModelVariant, ScenarioConfig, TestOutcome};
use chipbench_sim::SimTime;
use serde::Serialize;

use crate::error::RunnerError;
use crate::model_backend::{ModelBackend, ModelFactory};

/// Inputs to a build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    /// Top-level module name.
    pub top: String,
    /// Source files in compile order.
    pub sources: Vec<PathBuf>,
    /// Preprocessor defines.
    pub defines: Defines,
    /// Include directories.
    pub includes: Vec<PathBuf>,
    /// Extra backend-specific build arguments.
    pub build_args: Vec<String>,
    /// Behavioral or gate-level.
    pub variant: ModelVariant,
}

impl From<ResolvedBuild> for BuildRequest {
    fn from(build: ResolvedBuild) -> Self {
        Self {
            top: build.top,
            sources: build.sources,
            defines: build.defines,
            includes: build.includes,
            build_args: build.build_args,
            variant: build.variant,
        }
    }
}

/// The result of a successful build, ready to be run any number of times.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    /// Top-level module name.
    pub top: String,
    /// Behavioral or gate-level.
    pub variant: ModelVariant,
    /// Sources the model was built from.
    pub sources: Vec<PathBuf>,
    /// Name of the backend that built it.
    pub backend: String,
    pub(crate) factory: ModelFactory,
}

/// Inputs to one test run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Test entrypoint name.
    pub test: String,
    /// `+key=value` arguments.
    pub plusargs: Vec<String>,
    /// Scenario parameters before plusargs are applied.
    pub scenario: ScenarioConfig,
    /// Simulated-time watchdog in femtoseconds.
    pub time_limit_fs: Option<u64>,
    /// Wall-clock watchdog.
    pub wall_timeout: Option<Duration>,
}

impl RunRequest {
    /// A request with no plusargs and no watchdogs.
    pub fn new(test: impl Into<String>, scenario: ScenarioConfig) -> Self {
        Self {
            test: test.into(),
            plusargs: Vec::new(),
            scenario,
            time_limit_fs: None,
            wall_timeout: None,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Test entrypoint that ran.
    pub test: String,
    /// Pass or fail.
    pub outcome: TestOutcome,
    /// Simulated time when the test finished.
    pub final_time: SimTime,
    /// Time-stamped log lines recorded during the run.
    pub transcript: Vec<String>,
}

/// A simulator that can build a design and run tests against it.
pub trait Backend {
    /// Backend name as used in configuration.
    fn name(&self) -> &str;

    /// Compiles the sources into a runnable model.
    fn build(&self, request: &BuildRequest) -> Result<CompiledModel, RunnerError>;

    /// Runs one test entrypoint against a compiled model.
    fn run(&self, model: &CompiledModel, request: &RunRequest) -> Result<RunReport, RunnerError>;

    /// Names of the test entrypoints this backend can run.
    fn tests(&self) -> Vec<String>;
}

/// Selects a backend by name.
pub fn backend_for(name: &str) -> Result<Box<dyn Backend>, RunnerError> {
    match name {
        ModelBackend::NAME => Ok(Box::new(ModelBackend::new())),
        other => Err(RunnerError::UnknownBackend(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_backend_is_available() {
        let backend = backend_for("model").unwrap();
        assert_eq!(backend.name(), "model");
    }

    #[test]
    fn external_simulators_are_not() {
        for name in ["icarus", "verilator", ""] {
            assert!(matches!(
                backend_for(name),
                Err(RunnerError::UnknownBackend(_))
            ));
        }
    }

    #[test]
    fn build_request_from_resolved() {
        let resolved = ResolvedBuild {
            top: "chip_top".into(),
            sources: vec![PathBuf::from("/proj/src/chip_top.sv")],
            defines: Defines::new(),
            includes: Vec::new(),
            build_args: vec!["--timing".into()],
            variant: ModelVariant::Behavioral,
        };
        let request = BuildRequest::from(resolved);
        assert_eq!(request.top, "chip_top");
        assert_eq!(request.build_args, vec!["--timing"]);
    }
}
