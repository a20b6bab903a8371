//! Discrete-event simulation kernel for the chipbench verification harness.
//!
//! This crate provides the time source and signal plumbing that testbench
//! code runs against: a signal table with 4-state values, a timer queue in
//! femtoseconds with delta cycles, and a single-threaded cooperative task
//! executor. Testbench coroutines are ordinary Rust futures that suspend on
//! triggers ([`Timer`], [`EdgeTrigger`]) and are resumed by the kernel when
//! the trigger condition is met.
//!
//! # Architecture
//!
//! A [`Sim`] is a reference-counted handle; clones share the same kernel.
//! Task writes take effect immediately, while writes produced by the
//! [`Model`] behind the signals are applied one delta later. Each pass of
//! the run loop polls every runnable task, settles the signals they
//! touched (letting the model evaluate and edge waiters fire), applies the
//! model's pending writes, and only then advances time to the next timer.
//!
//! # Usage
//!
//! ```ignore
//! use chipbench_sim::{Sim, PortDirection};
//!
//! let sim = Sim::new();
//! let clk = sim.add_signal("clk", 1, PortDirection::Input)?;
//! let t = sim.run(async move { 42 })?;
//! ```
//!
//! # Modules
//!
//! - `error` — Kernel error types
//! - `time` — Femtosecond-precision time with delta cycles
//! - `value` — Signal identifiers, port declarations, and change records
//! - `model` — The `Model` trait for device behavior behind the signals
//! - `task` — Task table, wakers, and task handles
//! - `trigger` — Awaitable time and edge triggers
//! - `kernel` — Event queue, settle loop, and the `Sim` handle
//! - `dut` — Named signal access for testbench code

#![warn(missing_docs)]

pub mod dut;
pub mod error;
pub mod kernel;
pub mod model;
pub mod task;
pub mod time;
pub mod trigger;
pub mod value;

pub use dut::{Dut, SignalHandle};
pub use error::SimError;
pub use kernel::Sim;
pub use model::{Model, ModelContext, PortBuilder};
pub use task::{TaskHandle, TaskId};
pub use time::SimTime;
pub use trigger::{EdgeKind, EdgeTrigger, Timer};
pub use value::{PortDecl, PortDirection, SignalChange, SignalId};
