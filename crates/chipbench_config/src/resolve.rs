//! Resolution of a configuration into build inputs and scenario parameters.

use crate::error::ConfigError;
use crate::types::{Defines, ProjectConfig};
use chipbench_common::{parse_duration, Frequency};
use chipbench_harness::{
    ClockConfig, ModelVariant, PowerConfig, ResetConfig, ScenarioConfig, StartupConfig,
};
use std::path::{Path, PathBuf};

/// Everything a build backend needs, with paths made absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBuild {
    /// Top-level module name.
    pub top: String,
    /// Source files in compile order.
    pub sources: Vec<PathBuf>,
    /// Preprocessor defines.
    pub defines: Defines,
    /// Include directories.
    pub includes: Vec<PathBuf>,
    /// Extra build arguments.
    pub build_args: Vec<String>,
    /// Behavioral or gate-level.
    pub variant: ModelVariant,
}

/// Resolves the source set for the configured model variant.
///
/// Gate-level builds start with the standard cell models and the netlist and
/// define `USE_POWER_PINS=false`; behavioral builds start with the RTL list.
/// IO cell models and extra files follow in both cases.
pub fn resolve_build(
    config: &ProjectConfig,
    project_dir: &Path,
    home: Option<&Path>,
) -> Result<ResolvedBuild, ConfigError> {
    let pdk_dir = expand_home(&config.pdk.root, home)?.join(&config.pdk.name);
    let mut sources = Vec::new();
    let mut defines = Defines::new();

    if config.simulation.gate_level {
        let scl = &config.pdk.scl;
        sources.push(
            pdk_dir
                .join("libs.ref")
                .join(scl)
                .join("verilog")
                .join(format!("{scl}.v")),
        );
        let netlist = config
            .sources
            .netlist
            .clone()
            .unwrap_or_else(|| format!("final/nl/{}.nl.v", config.project.top));
        sources.push(project_dir.join(netlist));
        defines.insert("USE_POWER_PINS".to_string(), "false".to_string());
    } else {
        if config.sources.rtl.is_empty() {
            return Err(ConfigError::MissingField("sources.rtl".to_string()));
        }
        sources.extend(config.sources.rtl.iter().map(|f| project_dir.join(f)));
    }

    sources.extend(config.sources.io_models.iter().map(|f| pdk_dir.join(f)));
    sources.extend(config.sources.extra.iter().map(|f| project_dir.join(f)));

    tracing::debug!(
        gate_level = config.simulation.gate_level,
        files = sources.len(),
        "resolved build sources"
    );

    Ok(ResolvedBuild {
        top: config.project.top.clone(),
        sources,
        defines,
        includes: config
            .sources
            .includes
            .iter()
            .map(|d| project_dir.join(d))
            .collect(),
        build_args: config.simulation.build_args.clone(),
        variant: model_variant(config),
    })
}

/// The model variant selected by `simulation.gate_level`.
pub fn model_variant(config: &ProjectConfig) -> ModelVariant {
    if config.simulation.gate_level {
        ModelVariant::GateLevel {
            power: PowerConfig {
                vdd: config.signals.vdd.clone(),
                vss: config.signals.vss.clone(),
            },
        }
    } else {
        ModelVariant::Behavioral
    }
}

/// Builds the scenario parameters from the signal, clock, reset, and
/// scenario sections.
pub fn resolve_scenario(config: &ProjectConfig) -> Result<ScenarioConfig, ConfigError> {
    let frequency: Frequency = config
        .clock
        .frequency
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("clock.frequency: {e}")))?;
    let duration_fs = parse_duration(&config.reset.duration)
        .map_err(|e| ConfigError::ValidationError(format!("reset.duration: {e}")))?;
    let signals = &config.signals;
    let scenario = &config.scenario;

    Ok(ScenarioConfig {
        startup: StartupConfig {
            input: signals.input.clone(),
            clock: ClockConfig::new(signals.clock.clone(), frequency, config.clock.unit),
            reset: ResetConfig::new(signals.reset.clone(), config.reset.active_low, duration_fs),
            variant: model_variant(config),
        },
        output: signals.output.clone(),
        warmup_cycles: scenario.warmup_cycles,
        settle_cycles: scenario.settle_cycles,
        output_latency: scenario.output_latency,
        expected: scenario.expected,
    })
}

/// The simulated-time watchdog in femtoseconds, if one is configured.
pub fn resolve_time_limit(config: &ProjectConfig) -> Result<Option<u64>, ConfigError> {
    config
        .simulation
        .time_limit
        .as_deref()
        .map(|limit| {
            parse_duration(limit)
                .map_err(|e| ConfigError::ValidationError(format!("simulation.time_limit: {e}")))
        })
        .transpose()
}

fn expand_home(path: &str, home: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let rest = match path.strip_prefix('~') {
        None => return Ok(PathBuf::from(path)),
        Some(rest) => rest.trim_start_matches('/'),
    };
    let home = home.ok_or_else(|| {
        ConfigError::ValidationError(format!("cannot expand '{path}': HOME is not set"))
    })?;
    Ok(home.join(rest))
}
