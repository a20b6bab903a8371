//! Error types for the discrete-event kernel.
//!
//! Configuration mistakes (an unknown signal name, a value of the wrong
//! width) and scheduling failures (a stall, a runaway delta loop, the time
//! limit) are all variants of [`SimError`].

use crate::time::SimTime;

/// Errors that can occur while building or running a simulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// No signal with the given name exists on the device.
    #[error("unknown signal '{name}'")]
    UnknownSignal {
        /// The name that was looked up.
        name: String,
    },

    /// A signal with the given name was declared twice.
    #[error("signal '{name}' is already declared")]
    DuplicateSignal {
        /// The conflicting name.
        name: String,
    },

    /// A value was written to a signal with a different width.
    #[error("width mismatch on '{signal}': expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// The signal being written.
        signal: String,
        /// The declared width of the signal.
        expected: u32,
        /// The width of the value that was written.
        actual: u32,
    },

    /// The event queue drained while the main task was still waiting.
    #[error("simulation stalled at {time}: no pending events can wake the main task")]
    Stalled {
        /// The time at which the queue ran dry.
        time: SimTime,
    },

    /// The simulation exceeded the configured time limit.
    #[error("time limit exceeded: {limit_fs} fs")]
    TimeLimitExceeded {
        /// The time limit in femtoseconds.
        limit_fs: u64,
    },

    /// Too many delta cycles at a single time step, indicating a zero-delay loop.
    #[error("delta cycle limit exceeded at {fs} fs (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time in femtoseconds where the limit was hit.
        fs: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },

    /// The run took longer than its wall-clock budget.
    #[error("wall-clock timeout after {limit_ms} ms (simulated time {time})")]
    WallClockTimeout {
        /// The wall-clock budget in milliseconds.
        limit_ms: u64,
        /// Simulated time when the budget ran out.
        time: SimTime,
    },
}
