//! Test sequencing for chipbench: the pieces a testbench composes to bring a
//! device out of reset and check it.
//!
//! - [`start_clock`] spawns a free-running clock and returns immediately.
//! - [`reset`] holds a reset line at its active level for a fixed duration.
//! - [`startup`] drives inputs to defaults, powers gate-level models, starts
//!   the clock, and runs reset, in that order.
//! - [`run_scenario`] walks the [`ScenarioState`] machine from startup through
//!   stimulus to a terminal [`TestOutcome`].
//!
//! All of it runs as ordinary futures on a [`chipbench_sim::Sim`].

pub mod clock;
pub mod error;
pub mod reset;
pub mod scenario;
pub mod startup;

pub use clock::{start_clock, ClockConfig, ClockHandle};
pub use error::HarnessError;
pub use reset::{reset, ResetConfig};
pub use scenario::{
    run_scenario, test_counter, Failure, ScenarioConfig, ScenarioState, TestOutcome,
    TEST_COUNTER,
};
pub use startup::{startup, ModelVariant, PowerConfig, StartupConfig};
