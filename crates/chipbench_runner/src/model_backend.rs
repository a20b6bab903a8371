//! In-process backend: Rust models on the chipbench kernel.

use std::collections::BTreeMap;

use chipbench_sim::{Model, Sim};

use crate::backend::{Backend, BuildRequest, CompiledModel, RunReport, RunRequest};
use crate::chip_top::ChipTop;
use crate::error::RunnerError;
use crate::plusargs::apply_plusargs;
use crate::registry::TestRegistry;

/// Creates a fresh model instance; the flag selects the powered
/// (gate-level) view.
pub type ModelFactory = fn(powered: bool) -> Box<dyn Model>;

fn chip_top(powered: bool) -> Box<dyn Model> {
    if powered {
        Box::new(ChipTop::gate_level())
    } else {
        Box::new(ChipTop::behavioral())
    }
}

/// Runs tests against registered Rust models.
///
/// Building does not compile anything: it checks that a model is registered
/// for the top-level module and records the request. Each run gets a fresh
/// kernel and a fresh model instance.
#[derive(Clone, Debug)]
pub struct ModelBackend {
    models: BTreeMap<String, ModelFactory>,
    tests: TestRegistry,
}

impl Default for ModelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBackend {
    /// Name used to select this backend.
    pub const NAME: &'static str = "model";

    /// A backend with `chip_top` and the built-in tests registered.
    pub fn new() -> Self {
        let mut backend = Self {
            models: BTreeMap::new(),
            tests: TestRegistry::with_builtin(),
        };
        backend.register_model("chip_top", chip_top);
        backend
    }

    /// Adds or replaces the model for a top-level module.
    pub fn register_model(&mut self, top: impl Into<String>, factory: ModelFactory) {
        self.models.insert(top.into(), factory);
    }

    /// The test registry, for adding entrypoints.
    pub fn tests_mut(&mut self) -> &mut TestRegistry {
        &mut self.tests
    }
}

impl Backend for ModelBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build(&self, request: &BuildRequest) -> Result<CompiledModel, RunnerError> {
        let factory = *self
            .models
            .get(&request.top)
            .ok_or_else(|| RunnerError::UnknownModel(request.top.clone()))?;
        tracing::info!(
            top = %request.top,
            sources = request.sources.len(),
            gate_level = request.variant.is_powered(),
            "building model"
        );
        for (name, value) in &request.defines {
            tracing::debug!(define = %name, %value, "define");
        }
        if !request.build_args.is_empty() {
            tracing::debug!(args = ?request.build_args, "build arguments have no effect on the model backend");
        }
        Ok(CompiledModel {
            top: request.top.clone(),
            variant: request.variant.clone(),
            sources: request.sources.clone(),
            backend: Self::NAME.to_string(),
            factory,
        })
    }

    fn run(&self, model: &CompiledModel, request: &RunRequest) -> Result<RunReport, RunnerError> {
        let test = self
            .tests
            .get(&request.test)
            .ok_or_else(|| RunnerError::UnknownTest(request.test.clone()))?;

        let mut scenario = request.scenario.clone();
        apply_plusargs(&mut scenario, &request.plusargs)?;
        scenario.startup.variant = model.variant.clone();

        let sim = Sim::with_model((model.factory)(model.variant.is_powered()))?;
        if let Some(limit) = request.time_limit_fs {
            sim.set_time_limit(limit);
        }
        if let Some(budget) = request.wall_timeout {
            sim.set_wall_timeout(budget);
        }

        tracing::info!(test = %request.test, top = %model.top, "running test");
        let dut = sim.dut(model.top.clone());
        let outcome = sim
            .run(test(dut, scenario))
            .map_err(|err| RunnerError::from_run(&request.test, err))?;
        tracing::info!(test = %request.test, %outcome, time = %sim.now(), "test finished");

        Ok(RunReport {
            test: request.test.clone(),
            outcome,
            final_time: sim.now(),
            transcript: sim.transcript(),
        })
    }

    fn tests(&self) -> Vec<String> {
        self.tests.names()
    }
}
