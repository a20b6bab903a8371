//! Time-based reset sequencing.

use chipbench_sim::{Dut, SignalHandle, Sim};

use crate::error::HarnessError;

/// Which signal to reset, its polarity, and how long to hold it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetConfig {
    /// Name of the reset signal.
    pub signal: String,
    /// Whether the reset is asserted by driving the signal low.
    pub active_low: bool,
    /// How long the reset is held, in femtoseconds.
    pub duration_fs: u64,
}

impl ResetConfig {
    /// Creates a reset configuration.
    pub fn new(signal: impl Into<String>, active_low: bool, duration_fs: u64) -> Self {
        Self {
            signal: signal.into(),
            active_low,
            duration_fs,
        }
    }

    /// Level that asserts the reset.
    pub fn assert_level(&self) -> bool {
        !self.active_low
    }

    /// Level that releases the reset.
    pub fn deassert_level(&self) -> bool {
        self.active_low
    }
}

/// Asserts the reset, holds it for the configured duration, and releases it.
///
/// The hold is measured in simulated time only; it is not aligned to any
/// clock edge.
pub async fn reset(dut: &Dut, config: &ResetConfig) -> Result<(), HarnessError> {
    let signal = dut.signal(&config.signal)?;
    hold_reset(dut.sim(), &signal, config).await
}

pub(crate) async fn hold_reset(
    sim: &Sim,
    signal: &SignalHandle,
    config: &ResetConfig,
) -> Result<(), HarnessError> {
    sim.note("Reset asserted...");
    signal.set_bool(config.assert_level())?;
    sim.timer(config.duration_fs).await;
    signal.set_bool(config.deassert_level())?;
    sim.note("Reset deasserted.");
    Ok(())
}
