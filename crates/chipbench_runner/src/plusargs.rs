//! `+key=value` run arguments.
//!
//! Scenario parameters can be overridden per run without touching the
//! configuration file. Unrecognized keys are ignored, as simulators do.

use chipbench_harness::ScenarioConfig;

use crate::error::RunnerError;

/// Applies every recognized plusarg to `scenario`, in order.
///
/// Recognized keys: `warmup_cycles`, `settle_cycles`, `output_latency`, and
/// `expected`.
pub fn apply_plusargs(scenario: &mut ScenarioConfig, plusargs: &[String]) -> Result<(), RunnerError> {
    for arg in plusargs {
        let invalid = |reason: &str| RunnerError::InvalidPlusarg {
            arg: arg.clone(),
            reason: reason.to_string(),
        };
        let body = arg
            .strip_prefix('+')
            .ok_or_else(|| invalid("plusargs start with '+'"))?;
        let Some((key, value)) = body.split_once('=') else {
            tracing::debug!(arg = %arg, "ignoring flag plusarg");
            continue;
        };
        let value = value.trim();
        match key {
            "warmup_cycles" => {
                scenario.warmup_cycles = value
                    .parse()
                    .map_err(|_| invalid("expected a non-negative integer"))?;
            }
            "settle_cycles" => {
                scenario.settle_cycles = value
                    .parse()
                    .map_err(|_| invalid("expected a non-negative integer"))?;
            }
            "output_latency" => {
                scenario.output_latency = value
                    .parse()
                    .map_err(|_| invalid("expected a non-negative integer"))?;
            }
            "expected" => {
                scenario.expected = Some(value.parse().map_err(|_| invalid("expected an integer"))?);
            }
            _ => tracing::debug!(arg = %arg, "ignoring unrecognized plusarg"),
        }
    }
    Ok(())
}
