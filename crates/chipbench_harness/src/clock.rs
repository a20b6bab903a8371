//! Free-running clock generation.

use chipbench_common::{Frequency, TimeUnit};
use chipbench_sim::{Dut, SignalHandle, Sim, TaskHandle};

use crate::error::HarnessError;

/// Where and how fast to toggle a clock.
#[derive(Clone, Debug, PartialEq)]
pub struct ClockConfig {
    /// Name of the clock signal.
    pub signal: String,
    /// Clock frequency.
    pub frequency: Frequency,
    /// Time unit the half period is rounded to.
    pub unit: TimeUnit,
}

impl ClockConfig {
    /// Creates a clock configuration.
    pub fn new(signal: impl Into<String>, frequency: Frequency, unit: TimeUnit) -> Self {
        Self {
            signal: signal.into(),
            frequency,
            unit,
        }
    }

    /// Half of one period, rounded to whole `unit`s.
    pub fn half_period_units(&self) -> Result<u64, HarnessError> {
        let invalid = || HarnessError::InvalidFrequency {
            frequency: self.frequency,
            unit: self.unit,
        };
        if !self.frequency.is_valid() {
            return Err(invalid());
        }
        let units = (self.frequency.half_period_fs() / self.unit.fs_per_unit() as f64).round();
        if !units.is_finite() || units < 1.0 || units > u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(units as u64)
    }

    /// Half of one period in femtoseconds, after rounding to the unit.
    pub fn half_period_fs(&self) -> Result<u64, HarnessError> {
        Ok(self.unit.to_fs(self.half_period_units()?))
    }
}

/// A running clock. The clock stops when the simulation run that owns it
/// returns; there is no way to stop it earlier.
#[derive(Clone, Debug)]
pub struct ClockHandle {
    task: TaskHandle,
    signal: String,
    half_period_fs: u64,
}

impl ClockHandle {
    /// Name of the driven signal.
    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Half period in femtoseconds.
    pub fn half_period_fs(&self) -> u64 {
        self.half_period_fs
    }

    /// Full period in femtoseconds.
    pub fn period_fs(&self) -> u64 {
        self.half_period_fs.saturating_mul(2)
    }

    /// False only if the toggle loop bailed out on a failed write.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Starts a clock on `config.signal` and returns without waiting.
///
/// The first rising edge happens on the clock task's first poll, at the
/// current simulation time.
pub fn start_clock(dut: &Dut, config: &ClockConfig) -> Result<ClockHandle, HarnessError> {
    let half_period_fs = config.half_period_fs()?;
    let signal = dut.signal(&config.signal)?;
    Ok(spawn_clock(dut.sim(), signal, half_period_fs))
}

/// Spawns the toggle loop on an already-resolved signal.
pub(crate) fn spawn_clock(sim: &Sim, signal: SignalHandle, half_period_fs: u64) -> ClockHandle {
    tracing::debug!(
        signal = signal.name(),
        half_period_fs,
        "starting clock"
    );
    let name = signal.name().to_string();
    let timer_source = sim.clone();
    let task = sim.spawn(async move {
        loop {
            for level in [true, false] {
                if let Err(err) = signal.set_bool(level) {
                    tracing::error!(signal = signal.name(), %err, "clock write failed");
                    return;
                }
                timer_source.timer(half_period_fs).await;
            }
        }
    });
    ClockHandle {
        task,
        signal: name,
        half_period_fs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chipbench_common::units::FS_PER_NS;
    use chipbench_sim::{EdgeKind, PortDirection};
    use std::cell::Cell;
    use std::rc::Rc;

    fn dut() -> Dut {
        let sim = Sim::new();
        sim.add_signal("clk_PAD", 1, PortDirection::Input).unwrap();
        sim.dut("chip_top")
    }

    #[test]
    fn fifty_mhz_in_ns() {
        let cfg = ClockConfig::new("clk_PAD", Frequency::from_mhz(50.0), TimeUnit::Ns);
        assert_eq!(cfg.half_period_units().unwrap(), 10);
        assert_eq!(cfg.half_period_fs().unwrap(), 10 * FS_PER_NS);
    }

    #[test]
    fn half_period_rounds_to_unit() {
        // 3 MHz: 166.67 ns half period.
        let cfg = ClockConfig::new("clk", Frequency::from_mhz(3.0), TimeUnit::Ns);
        assert_eq!(cfg.half_period_units().unwrap(), 167);
    }

    #[test]
    fn rejects_non_positive_frequency() {
        for hz in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = ClockConfig::new("clk", Frequency::new(hz), TimeUnit::Ns);
            assert!(matches!(
                cfg.half_period_units(),
                Err(HarnessError::InvalidFrequency { .. })
            ));
        }
    }

    #[test]
    fn rejects_half_period_below_unit() {
        let cfg = ClockConfig::new("clk", Frequency::from_mhz(50.0), TimeUnit::Us);
        assert!(cfg.half_period_fs().is_err());
    }

    #[test]
    fn unknown_clock_signal() {
        let cfg = ClockConfig::new("nope", Frequency::from_mhz(50.0), TimeUnit::Ns);
        let err = start_clock(&dut(), &cfg).unwrap_err();
        assert!(matches!(err, HarnessError::Sim(_)));
    }

    #[test]
    fn transitions_match_frequency() {
        let dut = dut();
        let sim = dut.sim().clone();
        let cfg = ClockConfig::new("clk_PAD", Frequency::from_mhz(50.0), TimeUnit::Ns);
        let clk = dut.signal("clk_PAD").unwrap();
        let transitions = Rc::new(Cell::new(0u32));

        let s = sim.clone();
        let counted = Rc::clone(&transitions);
        let handle = sim
            .run(async move {
                let handle = start_clock(&dut, &cfg).unwrap();
                s.spawn(async move {
                    loop {
                        clk.edge(EdgeKind::Any, 1).await;
                        counted.set(counted.get() + 1);
                    }
                });
                s.timer(1000 * FS_PER_NS).await;
                handle
            })
            .unwrap();

        // 2 * 50 MHz * 1000 ns
        assert_eq!(transitions.get(), 100);
        assert_eq!(handle.period_fs(), 20 * FS_PER_NS);
        assert!(handle.is_running());
    }

    #[test]
    fn start_clock_does_not_block() {
        let dut = dut();
        let sim = dut.sim().clone();
        let cfg = ClockConfig::new("clk_PAD", Frequency::from_mhz(50.0), TimeUnit::Ns);
        let s = sim.clone();
        let started_at = sim
            .run(async move {
                start_clock(&dut, &cfg).unwrap();
                s.now()
            })
            .unwrap();
        assert_eq!(started_at.fs, 0);
    }
}
