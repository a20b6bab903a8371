//! Environment overrides, captured once and applied explicitly.
//!
//! The variables are the ones the chip-top template has always honored:
//! `SIM`, `PDK_ROOT`, `PDK`, `SCL`, and `GL`. `HOME` is captured too, so
//! that `~` in the PDK root can be expanded without another environment
//! read later on.

use std::path::PathBuf;

use crate::types::ProjectConfig;

/// Values that override the corresponding configuration fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `SIM`: simulation backend name.
    pub sim: Option<String>,
    /// `PDK_ROOT`: PDK installation directory.
    pub pdk_root: Option<String>,
    /// `PDK`: PDK name.
    pub pdk: Option<String>,
    /// `SCL`: standard cell library.
    pub scl: Option<String>,
    /// `GL`: run the gate-level netlist.
    pub gl: Option<bool>,
    /// `HOME`: used for `~` expansion.
    pub home: Option<PathBuf>,
}

impl EnvOverrides {
    /// Reads the overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds overrides from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            sim: get("SIM"),
            pdk_root: get("PDK_ROOT"),
            pdk: get("PDK"),
            scl: get("SCL"),
            gl: get("GL").map(|v| parse_flag(&v)),
            home: get("HOME").map(PathBuf::from),
        }
    }

    /// Returns a copy of `config` with every present override applied.
    pub fn apply(&self, config: &ProjectConfig) -> ProjectConfig {
        let mut config = config.clone();
        if let Some(sim) = &self.sim {
            config.simulation.backend = sim.clone();
        }
        if let Some(root) = &self.pdk_root {
            config.pdk.root = root.clone();
        }
        if let Some(pdk) = &self.pdk {
            config.pdk.name = pdk.clone();
        }
        if let Some(scl) = &self.scl {
            config.pdk.scl = scl.clone();
        }
        if let Some(gl) = self.gl {
            config.simulation.gate_level = gl;
        }
        config
    }
}

/// Any value other than an explicit "off" word enables the flag.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> EnvOverrides {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvOverrides::from_lookup(|k| map.get(k).cloned())
    }

    fn config() -> ProjectConfig {
        load_config_from_str("[project]\nname = \"c\"\ntop = \"chip_top\"\n").unwrap()
    }

    #[test]
    fn empty_environment_changes_nothing() {
        let overrides = lookup(&[]);
        assert_eq!(overrides, EnvOverrides::default());
        let applied = overrides.apply(&config());
        assert_eq!(applied.pdk.name, "ihp-sg13g2");
        assert!(!applied.simulation.gate_level);
    }

    #[test]
    fn overrides_replace_fields() {
        let overrides = lookup(&[
            ("SIM", "model"),
            ("PDK_ROOT", "/opt/pdk"),
            ("PDK", "gf180mcuD"),
            ("SCL", "gf180mcu_fd_sc_mcu7t5v0"),
            ("GL", "1"),
        ]);
        let applied = overrides.apply(&config());
        assert_eq!(applied.pdk.root, "/opt/pdk");
        assert_eq!(applied.pdk.name, "gf180mcuD");
        assert_eq!(applied.pdk.scl, "gf180mcu_fd_sc_mcu7t5v0");
        assert!(applied.simulation.gate_level);
    }

    #[test]
    fn apply_leaves_input_untouched() {
        let original = config();
        let _ = lookup(&[("PDK", "other")]).apply(&original);
        assert_eq!(original.pdk.name, "ihp-sg13g2");
    }

    #[test]
    fn gl_flag_values() {
        assert_eq!(lookup(&[("GL", "yes")]).gl, Some(true));
        assert_eq!(lookup(&[("GL", "0")]).gl, Some(false));
        assert_eq!(lookup(&[("GL", "False")]).gl, Some(false));
        assert_eq!(lookup(&[("GL", "")]).gl, None);
    }

    #[test]
    fn home_is_captured() {
        assert_eq!(
            lookup(&[("HOME", "/home/dev")]).home,
            Some(PathBuf::from("/home/dev"))
        );
    }
}
