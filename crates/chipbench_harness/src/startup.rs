//! Bringing a device from power-on to out-of-reset.

use chipbench_sim::Dut;

use crate::clock::{spawn_clock, ClockConfig, ClockHandle};
use crate::error::HarnessError;
use crate::reset::{hold_reset, ResetConfig};

/// Power rail names for gate-level models.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerConfig {
    /// Supply rail, driven to `1`.
    pub vdd: String,
    /// Ground rail, driven to `0`.
    pub vss: String,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            vdd: "VDD".to_string(),
            vss: "VSS".to_string(),
        }
    }
}

/// Which kind of model is being exercised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ModelVariant {
    /// RTL model with no power pins.
    #[default]
    Behavioral,
    /// Synthesized netlist whose rails must be driven before it does anything.
    GateLevel {
        /// The rails to drive.
        power: PowerConfig,
    },
}

impl ModelVariant {
    /// True for gate-level models.
    pub fn is_powered(&self) -> bool {
        matches!(self, ModelVariant::GateLevel { .. })
    }

    /// The power rails, if this variant has any.
    pub fn power(&self) -> Option<&PowerConfig> {
        match self {
            ModelVariant::Behavioral => None,
            ModelVariant::GateLevel { power } => Some(power),
        }
    }
}

/// Everything [`startup`] drives.
#[derive(Clone, Debug, PartialEq)]
pub struct StartupConfig {
    /// Primary input bus, driven to zero first.
    pub input: String,
    /// Clock to start.
    pub clock: ClockConfig,
    /// Reset to pulse.
    pub reset: ResetConfig,
    /// Model variant; decides whether the rails are driven.
    pub variant: ModelVariant,
}

/// Runs the startup sequence and returns the running clock.
///
/// Every signal is looked up before anything is driven, so a misnamed
/// signal leaves the device untouched. Then, in order: the input bus goes to
/// zero, the rails are powered (gate-level only), the clock starts, and the
/// reset is held and released. Returns once the reset is released.
///
/// Calling this twice on the same device starts a second clock on the same
/// signal; that is not supported.
pub async fn startup(dut: &Dut, config: &StartupConfig) -> Result<ClockHandle, HarnessError> {
    let half_period_fs = config.clock.half_period_fs()?;
    let input = dut.signal(&config.input)?;
    let rails = match config.variant.power() {
        Some(power) => Some((dut.signal(&power.vdd)?, dut.signal(&power.vss)?)),
        None => None,
    };
    let clock = dut.signal(&config.clock.signal)?;
    let reset = dut.signal(&config.reset.signal)?;

    input.set_bool(false)?;
    if let Some((vdd, vss)) = rails {
        tracing::debug!(vdd = vdd.name(), vss = vss.name(), "powering rails");
        vdd.set_bool(true)?;
        vss.set_bool(false)?;
    }
    let handle = spawn_clock(dut.sim(), clock, half_period_fs);
    hold_reset(dut.sim(), &reset, &config.reset).await?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chipbench_common::units::FS_PER_NS;
    use chipbench_common::{Frequency, LogicVec, TimeUnit};
    use chipbench_sim::{PortDirection, Sim};

    const SIGNALS: [(&str, u32); 5] = [
        ("clk_PAD", 1),
        ("rst_n_PAD", 1),
        ("input_PAD", 12),
        ("VDD", 1),
        ("VSS", 1),
    ];

    fn dut() -> Dut {
        let sim = Sim::new();
        for (name, width) in SIGNALS {
            sim.add_signal(name, width, PortDirection::Input).unwrap();
        }
        sim.dut("chip_top")
    }

    fn config(variant: ModelVariant) -> StartupConfig {
        StartupConfig {
            input: "input_PAD".into(),
            clock: ClockConfig::new("clk_PAD", Frequency::from_mhz(50.0), TimeUnit::Ns),
            reset: ResetConfig::new("rst_n_PAD", true, 1000 * FS_PER_NS),
            variant,
        }
    }

    fn gate_level() -> ModelVariant {
        ModelVariant::GateLevel {
            power: PowerConfig::default(),
        }
    }

    fn values(dut: &Dut, names: &[&str]) -> Vec<LogicVec> {
        names.iter().map(|n| dut.signal(n).unwrap().get()).collect()
    }

    /// Runs startup `times` times and returns the non-clock signal values.
    fn run_startup(variant: ModelVariant, times: usize) -> (Vec<LogicVec>, u64) {
        let dut = dut();
        let sim = dut.sim().clone();
        let cfg = config(variant);
        let d = dut.clone();
        let s = sim.clone();
        let end = sim
            .run(async move {
                for _ in 0..times {
                    startup(&d, &cfg).await.unwrap();
                }
                s.now().fs
            })
            .unwrap();
        (values(&dut, &["rst_n_PAD", "input_PAD", "VDD", "VSS"]), end)
    }

    #[test]
    fn behavioral_startup_leaves_rails_alone() {
        let (vals, end) = run_startup(ModelVariant::Behavioral, 1);
        assert_eq!(vals[0], LogicVec::from_bool(true));
        assert_eq!(vals[1], LogicVec::all_zero(12));
        assert!(!vals[2].is_fully_defined());
        assert!(!vals[3].is_fully_defined());
        assert_eq!(end, 1000 * FS_PER_NS);
    }

    #[test]
    fn gate_level_startup_powers_rails() {
        let (vals, _) = run_startup(gate_level(), 1);
        assert_eq!(vals[2], LogicVec::from_bool(true));
        assert_eq!(vals[3], LogicVec::from_bool(false));
    }

    #[test]
    fn startup_twice_matches_once() {
        let (once, _) = run_startup(gate_level(), 1);
        let (twice, _) = run_startup(gate_level(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_signal_drives_nothing() {
        let dut = dut();
        let sim = dut.sim().clone();
        let mut cfg = config(gate_level());
        cfg.reset.signal = "rst_PAD".into();
        let d = dut.clone();
        let err = sim
            .run(async move { startup(&d, &cfg).await.unwrap_err() })
            .unwrap();
        assert_eq!(err.to_string(), "unknown signal 'rst_PAD'");
        for (name, _) in SIGNALS {
            assert!(!dut.signal(name).unwrap().get().is_fully_defined());
        }
    }

    #[test]
    fn bad_frequency_drives_nothing() {
        let dut = dut();
        let sim = dut.sim().clone();
        let mut cfg = config(ModelVariant::Behavioral);
        cfg.clock.frequency = Frequency::new(0.0);
        let d = dut.clone();
        let err = sim
            .run(async move { startup(&d, &cfg).await.unwrap_err() })
            .unwrap();
        assert!(matches!(err, HarnessError::InvalidFrequency { .. }));
        assert!(!dut.signal("input_PAD").unwrap().get().is_fully_defined());
    }

    #[test]
    fn variant_power_accessor() {
        assert!(ModelVariant::Behavioral.power().is_none());
        assert_eq!(gate_level().power().map(|p| p.vdd.as_str()), Some("VDD"));
        assert!(gate_level().is_powered());
    }
}
