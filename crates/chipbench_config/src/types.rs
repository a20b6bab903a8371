//! Configuration types deserialized from `chipbench.toml`.

use chipbench_common::TimeUnit;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `chipbench.toml`.
///
/// Only `[project]` is required. Every other section falls back to the
/// defaults of the reference chip-top template: IHP SG13G2 cells, a 50 MHz
/// clock on `clk_PAD`, an active-low reset on `rst_n_PAD` held for 1000 ns,
/// and the counter test with 10 warmup and 100 settle cycles.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, top-level module).
    pub project: ProjectMeta,
    /// HDL sources for both model variants.
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Process design kit location and standard cell library.
    #[serde(default)]
    pub pdk: PdkConfig,
    /// Backend selection and run limits.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Names of the device pins the harness drives and reads.
    #[serde(default)]
    pub signals: SignalsConfig,
    /// Clock generation.
    #[serde(default)]
    pub clock: ClockSection,
    /// Reset pulse.
    #[serde(default)]
    pub reset: ResetSection,
    /// Scenario parameters.
    #[serde(default)]
    pub scenario: ScenarioSection,
}

/// Core project metadata required in every `chipbench.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Name of the top-level HDL module.
    pub top: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// HDL source lists. Paths are relative to the project directory unless
/// noted otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// RTL files for the behavioral model.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub rtl: Vec<String>,
    /// Synthesized netlist for gate-level runs. Defaults to
    /// `final/nl/<top>.nl.v`.
    pub netlist: Option<String>,
    /// IO cell models, relative to `<pdk root>/<pdk name>`.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub io_models: Vec<String>,
    /// Additional files appended in both modes (bondpads, macros).
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub extra: Vec<String>,
    /// Include directories.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub includes: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            rtl: Vec::new(),
            netlist: None,
            io_models: vec!["libs.ref/sg13g2_io/verilog/sg13g2_io.v".to_string()],
            extra: Vec::new(),
            includes: Vec::new(),
        }
    }
}

/// Location of the process design kit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdkConfig {
    /// Directory holding installed PDKs. A leading `~` is expanded.
    pub root: String,
    /// PDK name.
    pub name: String,
    /// Standard cell library name.
    pub scl: String,
}

impl Default for PdkConfig {
    fn default() -> Self {
        Self {
            root: "~/.ciel".to_string(),
            name: "ihp-sg13g2".to_string(),
            scl: "sg13g2_stdcell".to_string(),
        }
    }
}

/// Backend selection and run limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Name of the simulation backend.
    pub backend: String,
    /// Build and run the gate-level netlist instead of the RTL.
    pub gate_level: bool,
    /// Extra arguments passed to the build step.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub build_args: Vec<String>,
    /// Extra `+key=value` arguments passed to the run step.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub plusargs: Vec<String>,
    /// Simulated-time watchdog, as a duration string (e.g. `"1ms"`).
    pub time_limit: Option<String>,
    /// Wall-clock watchdog in seconds.
    pub wall_timeout_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            backend: "model".to_string(),
            gate_level: false,
            build_args: Vec::new(),
            plusargs: Vec::new(),
            time_limit: Some("1ms".to_string()),
            wall_timeout_secs: 60,
        }
    }
}

/// Device pin names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    /// Clock input.
    pub clock: String,
    /// Reset input.
    pub reset: String,
    /// Primary input bus.
    pub input: String,
    /// Output bus checked by the scenario.
    pub output: String,
    /// Supply rail (gate-level only).
    pub vdd: String,
    /// Ground rail (gate-level only).
    pub vss: String,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            clock: "clk_PAD".to_string(),
            reset: "rst_n_PAD".to_string(),
            input: "input_PAD".to_string(),
            output: "bidir_PAD".to_string(),
            vdd: "VDD".to_string(),
            vss: "VSS".to_string(),
        }
    }
}

/// Clock generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// Frequency string (e.g. `"50MHz"`), parsed to [`Frequency`](chipbench_common::Frequency).
    pub frequency: String,
    /// Unit the half period is rounded to.
    pub unit: TimeUnit,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            frequency: "50MHz".to_string(),
            unit: TimeUnit::Ns,
        }
    }
}

/// Reset pulse settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResetSection {
    /// Reset is asserted low.
    pub active_low: bool,
    /// How long reset is held, as a duration string.
    pub duration: String,
}

impl Default for ResetSection {
    fn default() -> Self {
        Self {
            active_low: true,
            duration: "1000ns".to_string(),
        }
    }
}

/// Scenario parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenarioSection {
    /// Test entrypoint to run.
    pub test: String,
    /// Clock cycles between reset release and stimulus.
    pub warmup_cycles: u32,
    /// Clock cycles between stimulus and the check.
    pub settle_cycles: u32,
    /// Edges between stimulus and the first visible increment.
    pub output_latency: u32,
    /// Explicit expected output value.
    pub expected: Option<i64>,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            test: "test_counter".to_string(),
            warmup_cycles: 10,
            settle_cycles: 100,
            output_latency: 1,
            expected: None,
        }
    }
}

/// Preprocessor defines passed to the build step.
pub type Defines = BTreeMap<String, String>;

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "deserialize_string_or_vec")]
        files: Vec<String>,
    }

    #[test]
    fn single_string_becomes_list() {
        let w: Wrapper = toml::from_str(r#"files = "src/top.sv""#).unwrap();
        assert_eq!(w.files, vec!["src/top.sv"]);
    }

    #[test]
    fn list_is_kept() {
        let w: Wrapper = toml::from_str(r#"files = ["a.sv", "b.sv"]"#).unwrap();
        assert_eq!(w.files, vec!["a.sv", "b.sv"]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let s: SignalsConfig = toml::from_str(r#"clock = "clk""#).unwrap();
        assert_eq!(s.clock, "clk");
        assert_eq!(s.reset, "rst_n_PAD");
        assert_eq!(s.output, "bidir_PAD");
    }

    #[test]
    fn time_unit_is_lowercase() {
        let c: ClockSection = toml::from_str(r#"unit = "ps""#).unwrap();
        assert_eq!(c.unit, TimeUnit::Ps);
        assert_eq!(c.frequency, "50MHz");
    }
}
