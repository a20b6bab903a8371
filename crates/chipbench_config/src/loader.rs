//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use chipbench_common::{parse_duration, Frequency};
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "chipbench.toml";

/// Loads and validates a `chipbench.toml` configuration from a project directory.
///
/// Reads `<project_dir>/chipbench.toml`, parses it, and validates it.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    tracing::debug!(path = %config_path.display(), "loading configuration");
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `chipbench.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates required fields and that every string-typed value parses.
pub(crate) fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.top.is_empty() {
        return Err(ConfigError::MissingField("project.top".to_string()));
    }
    if config.simulation.backend.is_empty() {
        return Err(ConfigError::MissingField("simulation.backend".to_string()));
    }

    let frequency: Frequency = config.clock.frequency.parse().map_err(|e| {
        ConfigError::ValidationError(format!("clock.frequency: {e}"))
    })?;
    if !frequency.is_valid() {
        return Err(ConfigError::ValidationError(format!(
            "clock.frequency must be positive, got {frequency}"
        )));
    }
    parse_duration(&config.reset.duration)
        .map_err(|e| ConfigError::ValidationError(format!("reset.duration: {e}")))?;
    if let Some(limit) = &config.simulation.time_limit {
        parse_duration(limit)
            .map_err(|e| ConfigError::ValidationError(format!("simulation.time_limit: {e}")))?;
    }

    if config.scenario.warmup_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "scenario.warmup_cycles must be positive".to_string(),
        ));
    }
    if config.scenario.test.is_empty() {
        return Err(ConfigError::MissingField("scenario.test".to_string()));
    }
    for arg in &config.simulation.plusargs {
        if !arg.starts_with('+') {
            return Err(ConfigError::ValidationError(format!(
                "plusarg '{arg}' must start with '+'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chipbench_common::TimeUnit;

    const MINIMAL: &str = r#"
[project]
name = "counter"
top = "chip_top"
"#;

    fn with(extra: &str) -> String {
        format!("{MINIMAL}\n{extra}")
    }

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.project.name, "counter");
        assert_eq!(config.project.top, "chip_top");
    }

    #[test]
    fn default_values() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.signals.clock, "clk_PAD");
        assert_eq!(config.signals.reset, "rst_n_PAD");
        assert_eq!(config.signals.input, "input_PAD");
        assert_eq!(config.signals.output, "bidir_PAD");
        assert_eq!(config.clock.frequency, "50MHz");
        assert_eq!(config.clock.unit, TimeUnit::Ns);
        assert!(config.reset.active_low);
        assert_eq!(config.reset.duration, "1000ns");
        assert_eq!(config.scenario.warmup_cycles, 10);
        assert_eq!(config.scenario.settle_cycles, 100);
        assert_eq!(config.scenario.test, "test_counter");
        assert_eq!(config.pdk.name, "ihp-sg13g2");
        assert_eq!(config.pdk.scl, "sg13g2_stdcell");
        assert_eq!(config.pdk.root, "~/.ciel");
        assert_eq!(config.simulation.backend, "model");
        assert!(!config.simulation.gate_level);
    }

    #[test]
    fn parse_full_config() {
        let toml = with(
            r#"
[sources]
rtl = ["src/chip_top.sv", "src/chip_core.sv"]
netlist = "final/nl/chip_top.nl.v"
extra = ["ip/bondpad_70x70/vh/bondpad_70x70.v"]

[pdk]
root = "/opt/pdks"

[simulation]
backend = "model"
gate_level = true
build_args = "--timing"
plusargs = ["+settle_cycles=50"]
time_limit = "10us"

[clock]
frequency = "25MHz"

[reset]
active_low = false
duration = "200ns"

[scenario]
settle_cycles = 50
expected = 49
"#,
        );
        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.sources.rtl.len(), 2);
        assert_eq!(config.sources.io_models.len(), 1);
        assert_eq!(config.pdk.root, "/opt/pdks");
        assert_eq!(config.pdk.name, "ihp-sg13g2");
        assert!(config.simulation.gate_level);
        assert_eq!(config.simulation.build_args, vec!["--timing"]);
        assert_eq!(config.clock.frequency, "25MHz");
        assert!(!config.reset.active_low);
        assert_eq!(config.scenario.expected, Some(49));
    }

    #[test]
    fn missing_name_errors() {
        let err = load_config_from_str("[project]\nname = \"\"\ntop = \"chip_top\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "project.name"));
    }

    #[test]
    fn missing_top_errors() {
        let err = load_config_from_str("[project]\nname = \"x\"\ntop = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "project.top"));
    }

    #[test]
    fn missing_project_section_errors() {
        let err = load_config_from_str("[clock]\nfrequency = \"50MHz\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_frequency_errors() {
        let err = load_config_from_str(&with("[clock]\nfrequency = \"fast\"\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        let err = load_config_from_str(&with("[clock]\nfrequency = \"0MHz\"\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_unit_errors() {
        let err = load_config_from_str(&with("[clock]\nunit = \"fortnight\"\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_reset_duration_errors() {
        let err = load_config_from_str(&with("[reset]\nduration = \"1000\"\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(m) if m.starts_with("reset.duration")));
    }

    #[test]
    fn zero_warmup_errors() {
        let err = load_config_from_str(&with("[scenario]\nwarmup_cycles = 0\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_settle_is_allowed() {
        let config = load_config_from_str(&with("[scenario]\nsettle_cycles = 0\n")).unwrap();
        assert_eq!(config.scenario.settle_cycles, 0);
    }

    #[test]
    fn plusarg_without_plus_errors() {
        let err =
            load_config_from_str(&with("[simulation]\nplusargs = [\"seed=1\"]\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), MINIMAL).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.top, "chip_top");
    }

    #[test]
    fn read_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
