//! Shared foundational types used across the chipbench verification harness.
//!
//! This crate provides 4-state logic values, packed logic vectors for signal
//! state, clock frequencies, and simulation time units.

#![warn(missing_docs)]

pub mod frequency;
pub mod logic;
pub mod logic_vec;
pub mod units;

pub use frequency::{Frequency, ParseFrequencyError};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use units::{parse_duration, ParseDurationError, TimeUnit};
