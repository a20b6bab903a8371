//! Error types for test sequencing.

use chipbench_common::{Frequency, TimeUnit};
use chipbench_sim::SimError;

/// Configuration errors detected while setting up a scenario.
///
/// These are fatal: a scenario that hits one ends in
/// [`Failure::Config`](crate::Failure::Config) before the device is driven.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HarnessError {
    /// The clock frequency is not positive, or its half period rounds to
    /// zero in the configured time unit.
    #[error("invalid clock frequency {frequency} for time unit '{unit}'")]
    InvalidFrequency {
        /// The rejected frequency.
        frequency: Frequency,
        /// The time unit the half period was rounded to.
        unit: TimeUnit,
    },

    /// A signal lookup or write failed.
    #[error(transparent)]
    Sim(#[from] SimError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_frequency() {
        let err = HarnessError::InvalidFrequency {
            frequency: Frequency::from_mhz(50.0),
            unit: TimeUnit::Us,
        };
        assert_eq!(
            format!("{err}"),
            "invalid clock frequency 50MHz for time unit 'us'"
        );
    }

    #[test]
    fn display_sim_error_is_transparent() {
        let err = HarnessError::from(SimError::UnknownSignal {
            name: "VDD".into(),
        });
        assert_eq!(format!("{err}"), "unknown signal 'VDD'");
    }
}
