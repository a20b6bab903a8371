//! The scenario state machine and the counter test built on it.
//!
//! A scenario runs once, front to back:
//!
//! ```text
//! INIT -> STARTUP -> WARMUP_WAIT -> STIMULUS -> SETTLE_WAIT -> ASSERT -> PASS | FAIL
//! ```
//!
//! Any configuration problem found in `INIT` or `STARTUP` goes straight to
//! `FAIL`. There are no retries.

use std::fmt;

use chipbench_common::LogicVec;
use chipbench_sim::{Dut, SignalHandle};
use serde::{Serialize, Serializer};

use crate::startup::{startup, StartupConfig};

/// Name under which [`test_counter`] is registered.
pub const TEST_COUNTER: &str = "test_counter";

/// Parameters of one scenario run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// Startup sequence to run first.
    pub startup: StartupConfig,
    /// Output bus that is checked at the end.
    pub output: String,
    /// Clock cycles between reset release and stimulus.
    pub warmup_cycles: u32,
    /// Clock cycles between stimulus and the check.
    pub settle_cycles: u32,
    /// Edges between stimulus and the first visible increment.
    pub output_latency: u32,
    /// Explicit expected value, overriding `settle_cycles - output_latency`.
    pub expected: Option<i64>,
}

impl ScenarioConfig {
    /// Creates a configuration with 10 warmup cycles, 100 settle cycles, and
    /// a one-edge output latency.
    pub fn new(startup: StartupConfig, output: impl Into<String>) -> Self {
        Self {
            startup,
            output: output.into(),
            warmup_cycles: 10,
            settle_cycles: 100,
            output_latency: 1,
            expected: None,
        }
    }

    /// The value the output must hold at the check.
    pub fn expected_value(&self) -> i64 {
        self.expected
            .unwrap_or(i64::from(self.settle_cycles) - i64::from(self.output_latency))
    }
}

/// States of a scenario run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScenarioState {
    /// Nothing done yet.
    Init,
    /// Running the startup sequence.
    Startup,
    /// Letting the device settle after reset.
    WarmupWait,
    /// Driving the input bus to all ones.
    Stimulus,
    /// Waiting for the counter to run.
    SettleWait,
    /// Comparing the output to the expectation.
    Assert,
    /// Terminal: the check held.
    Pass,
    /// Terminal: a configuration error or a mismatch.
    Fail,
}

impl ScenarioState {
    /// True for `Pass` and `Fail`.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScenarioState::Pass | ScenarioState::Fail)
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioState::Init => "INIT",
            ScenarioState::Startup => "STARTUP",
            ScenarioState::WarmupWait => "WARMUP_WAIT",
            ScenarioState::Stimulus => "STIMULUS",
            ScenarioState::SettleWait => "SETTLE_WAIT",
            ScenarioState::Assert => "ASSERT",
            ScenarioState::Pass => "PASS",
            ScenarioState::Fail => "FAIL",
        };
        f.write_str(name)
    }
}

/// Why a scenario failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Failure {
    /// The device or the scenario was misconfigured.
    #[error("configuration error: {0}")]
    Config(String),

    /// The output did not hold the expected value.
    #[error("expected {expected}, observed {observed}")]
    Mismatch {
        /// The expected output value.
        expected: i64,
        /// The output value actually read.
        #[serde(serialize_with = "serialize_display")]
        observed: LogicVec,
    },
}

fn serialize_display<S: Serializer>(value: &LogicVec, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Final result of a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "failure", rename_all = "snake_case")]
pub enum TestOutcome {
    /// The check held.
    Pass,
    /// The scenario failed.
    Fail(Failure),
}

impl TestOutcome {
    /// True for [`TestOutcome::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, TestOutcome::Pass)
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            TestOutcome::Pass => None,
            TestOutcome::Fail(failure) => Some(failure),
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Pass => f.write_str("PASS"),
            TestOutcome::Fail(failure) => write!(f, "FAIL: {failure}"),
        }
    }
}

/// X/Z bits and negative expectations never match.
fn output_matches(observed: &LogicVec, expected: i64) -> bool {
    match (u64::try_from(expected), observed.to_u64()) {
        (Ok(expected), Some(observed)) => expected == observed,
        _ => false,
    }
}

/// Handles resolved in `INIT`.
struct Ports {
    input: SignalHandle,
    clock: SignalHandle,
    output: SignalHandle,
}

fn resolve(dut: &Dut, config: &ScenarioConfig) -> Result<Ports, Failure> {
    let lookup = |name: &str| dut.signal(name).map_err(|e| Failure::Config(e.to_string()));
    Ok(Ports {
        input: lookup(&config.startup.input)?,
        clock: lookup(&config.startup.clock.signal)?,
        output: lookup(&config.output)?,
    })
}

/// Runs one scenario to a terminal state.
pub async fn run_scenario(dut: &Dut, config: &ScenarioConfig) -> TestOutcome {
    let sim = dut.sim();
    let expected = config.expected_value();
    let mut state = ScenarioState::Init;
    let mut ports = None;
    let mut observed = None;
    let mut failure = None;

    while !state.is_terminal() {
        let next = match state {
            ScenarioState::Init => {
                if config.settle_cycles == 0 {
                    tracing::warn!(
                        expected,
                        "settle_cycles is 0: the output is checked before any increment can land"
                    );
                }
                match resolve(dut, config) {
                    Ok(resolved) => {
                        ports = Some(resolved);
                        sim.note("Startup sequence...");
                        ScenarioState::Startup
                    }
                    Err(err) => {
                        failure = Some(err);
                        ScenarioState::Fail
                    }
                }
            }
            ScenarioState::Startup => match startup(dut, &config.startup).await {
                Ok(_) => {
                    sim.note("Running the test...");
                    ScenarioState::WarmupWait
                }
                Err(err) => {
                    failure = Some(Failure::Config(err.to_string()));
                    ScenarioState::Fail
                }
            },
            ScenarioState::WarmupWait => {
                if let Some(p) = &ports {
                    p.clock.clock_cycles(config.warmup_cycles).await;
                }
                ScenarioState::Stimulus
            }
            ScenarioState::Stimulus => {
                let driven = ports.as_ref().map(|p| p.input.set_all_ones());
                match driven {
                    Some(Err(err)) => {
                        failure = Some(Failure::Config(err.to_string()));
                        ScenarioState::Fail
                    }
                    _ => ScenarioState::SettleWait,
                }
            }
            ScenarioState::SettleWait => {
                if let Some(p) = &ports {
                    p.clock.clock_cycles(config.settle_cycles).await;
                    observed = Some(p.output.get());
                }
                ScenarioState::Assert
            }
            ScenarioState::Assert => match observed.take() {
                Some(value) if output_matches(&value, expected) => ScenarioState::Pass,
                Some(value) => {
                    failure = Some(Failure::Mismatch {
                        expected,
                        observed: value,
                    });
                    ScenarioState::Fail
                }
                None => {
                    failure = Some(Failure::Config("output was never sampled".to_string()));
                    ScenarioState::Fail
                }
            },
            ScenarioState::Pass | ScenarioState::Fail => state,
        };
        tracing::debug!(from = %state, to = %next, time = %sim.now(), "scenario transition");
        state = next;
    }

    match failure {
        None => {
            sim.note("Done!");
            TestOutcome::Pass
        }
        Some(failure) => {
            sim.note(format!("FAIL: {failure}"));
            TestOutcome::Fail(failure)
        }
    }
}

/// Counter test: after startup and warmup, enable the counter with an
/// all-ones input and check the output after the settle window.
pub async fn test_counter(dut: Dut, config: ScenarioConfig) -> TestOutcome {
    run_scenario(&dut, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockConfig;
    use crate::reset::ResetConfig;
    use crate::startup::ModelVariant;
    use chipbench_common::units::FS_PER_NS;
    use chipbench_common::{Frequency, TimeUnit};
    use chipbench_sim::{Model, ModelContext, PortBuilder, PortDecl, Sim, SignalId, SimError};

    /// Counts rising clock edges while `en` is all ones; clears on `rst_n` low.
    #[derive(Default)]
    struct Counter {
        ports: Option<[SignalId; 4]>,
        count: u64,
    }

    impl Model for Counter {
        fn elaborate(&mut self, ports: &mut PortBuilder<'_>) -> Result<(), SimError> {
            self.ports = Some([
                ports.declare(PortDecl::input("clk", 1))?,
                ports.declare(PortDecl::input("rst_n", 1))?,
                ports.declare(PortDecl::input("en", 4))?,
                ports.declare(PortDecl::output("count", 16))?,
            ]);
            Ok(())
        }

        fn evaluate(&mut self, ctx: &mut ModelContext<'_>) {
            let Some([clk, rst_n, en, count]) = self.ports else {
                return;
            };
            if !ctx.rose(clk) {
                return;
            }
            if ctx.value(rst_n).lsb() == chipbench_common::Logic::Zero {
                self.count = 0;
            } else if ctx.value(en).is_all_one() {
                self.count += 1;
            }
            ctx.drive(count, LogicVec::from_u64(self.count, 16));
        }
    }

    fn config() -> ScenarioConfig {
        ScenarioConfig::new(
            StartupConfig {
                input: "en".into(),
                clock: ClockConfig::new("clk", Frequency::from_mhz(50.0), TimeUnit::Ns),
                reset: ResetConfig::new("rst_n", true, 1000 * FS_PER_NS),
                variant: ModelVariant::Behavioral,
            },
            "count",
        )
    }

    fn run(config: ScenarioConfig) -> (TestOutcome, Sim) {
        let sim = Sim::with_model(Box::new(Counter::default())).unwrap();
        let dut = sim.dut("counter");
        let outcome = sim.run(test_counter(dut, config)).unwrap();
        (outcome, sim)
    }

    #[test]
    fn expected_value_defaults() {
        let cfg = config();
        assert_eq!(cfg.expected_value(), 99);
        let mut zero = cfg.clone();
        zero.settle_cycles = 0;
        assert_eq!(zero.expected_value(), -1);
        let mut explicit = cfg;
        explicit.expected = Some(7);
        assert_eq!(explicit.expected_value(), 7);
    }

    #[test]
    fn counter_passes_at_ninety_nine() {
        let (outcome, sim) = run(config());
        assert_eq!(outcome, TestOutcome::Pass);
        let lines: Vec<String> = sim
            .transcript()
            .into_iter()
            .filter_map(|l| l.split_once("] ").map(|(_, m)| m.to_string()))
            .collect();
        assert_eq!(
            lines,
            vec![
                "Startup sequence...",
                "Reset asserted...",
                "Reset deasserted.",
                "Running the test...",
                "Done!",
            ]
        );
    }

    #[test]
    fn wrong_expectation_reports_both_values() {
        let mut cfg = config();
        cfg.expected = Some(100);
        let (outcome, _) = run(cfg);
        assert_eq!(
            outcome,
            TestOutcome::Fail(Failure::Mismatch {
                expected: 100,
                observed: LogicVec::from_u64(99, 16),
            })
        );
    }

    #[test]
    fn zero_settle_cycles_fails_against_minus_one() {
        let mut cfg = config();
        cfg.settle_cycles = 0;
        let (outcome, _) = run(cfg);
        assert_eq!(
            outcome,
            TestOutcome::Fail(Failure::Mismatch {
                expected: -1,
                observed: LogicVec::from_u64(0, 16),
            })
        );
    }

    #[test]
    fn unknown_output_fails_before_startup() {
        let mut cfg = config();
        cfg.output = "bidir".into();
        let (outcome, sim) = run(cfg);
        assert_eq!(
            outcome,
            TestOutcome::Fail(Failure::Config("unknown signal 'bidir'".into()))
        );
        assert_eq!(sim.now().fs, 0);
        let en = sim.dut("counter").signal("en").unwrap();
        assert!(!en.get().is_fully_defined());
    }

    #[test]
    fn missing_power_rails_fail_startup() {
        let mut cfg = config();
        cfg.startup.variant = ModelVariant::GateLevel {
            power: Default::default(),
        };
        let (outcome, _) = run(cfg);
        assert!(matches!(outcome, TestOutcome::Fail(Failure::Config(_))));
    }

    #[test]
    fn unknown_bits_never_match() {
        assert!(!output_matches(&LogicVec::all_x(8), 0));
        assert!(!output_matches(&LogicVec::from_u64(0, 8), -1));
        assert!(output_matches(&LogicVec::from_u64(99, 40), 99));
    }

    #[test]
    fn outcome_json() {
        let fail = TestOutcome::Fail(Failure::Mismatch {
            expected: 99,
            observed: LogicVec::from_u64(5, 4),
        });
        let json = serde_json::to_value(&fail).unwrap();
        assert_eq!(json["result"], "fail");
        assert_eq!(json["failure"]["kind"], "mismatch");
        assert_eq!(json["failure"]["detail"]["observed"], "0101");
        let pass = serde_json::to_value(TestOutcome::Pass).unwrap();
        assert_eq!(pass["result"], "pass");
    }

    #[test]
    fn state_names() {
        assert_eq!(ScenarioState::WarmupWait.to_string(), "WARMUP_WAIT");
        assert!(ScenarioState::Pass.is_terminal());
        assert!(!ScenarioState::Assert.is_terminal());
    }

    #[test]
    fn display_failure() {
        let mismatch = Failure::Mismatch {
            expected: 99,
            observed: LogicVec::from_u64(3, 2),
        };
        assert_eq!(mismatch.to_string(), "expected 99, observed 11");
        assert_eq!(
            TestOutcome::Fail(Failure::Config("bad".into())).to_string(),
            "FAIL: configuration error: bad"
        );
    }
}
