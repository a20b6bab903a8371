//! Error types for building and running tests.

use chipbench_sim::{SimError, SimTime};

/// Errors that keep a test from producing a pass/fail verdict.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// No backend with the given name exists.
    #[error("unknown simulation backend '{0}' (available: model)")]
    UnknownBackend(String),

    /// The backend has no model for the requested top-level module.
    #[error("no model registered for top-level module '{0}'")]
    UnknownModel(String),

    /// No test entrypoint with the given name is registered.
    #[error("unknown test '{0}'")]
    UnknownTest(String),

    /// A plusarg could not be applied.
    #[error("invalid plusarg '{arg}': {reason}")]
    InvalidPlusarg {
        /// The offending argument.
        arg: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The scheduler ran out of events while the test was still waiting.
    #[error("test '{test}' hung at {time}: no pending event can wake it")]
    Stalled {
        /// The test that hung.
        test: String,
        /// Simulated time when the queue ran dry.
        time: SimTime,
    },

    /// The simulated-time or wall-clock watchdog stopped the test.
    #[error("watchdog stopped test '{test}': {source}")]
    Watchdog {
        /// The test that was stopped.
        test: String,
        /// The limit that was hit.
        source: SimError,
    },

    /// Any other simulation error.
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}

impl RunnerError {
    /// Sorts a kernel error raised while running `test` into a hang, a
    /// watchdog expiry, or a plain simulation error.
    pub(crate) fn from_run(test: &str, err: SimError) -> Self {
        match err {
            SimError::Stalled { time } => RunnerError::Stalled {
                test: test.to_string(),
                time,
            },
            SimError::TimeLimitExceeded { .. } | SimError::WallClockTimeout { .. } => {
                RunnerError::Watchdog {
                    test: test.to_string(),
                    source: err,
                }
            }
            other => RunnerError::Sim(other),
        }
    }
}
