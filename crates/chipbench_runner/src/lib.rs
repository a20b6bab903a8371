//! Build and run collaborators for chipbench.
//!
//! A [`Backend`] turns a resolved source set into a [`CompiledModel`] and runs
//! a named test entrypoint against it, producing a [`RunReport`]. The only
//! backend shipped here is [`ModelBackend`], which "builds" by looking up a
//! registered Rust model for the top-level module and runs the test on the
//! in-process kernel from `chipbench_sim`.
//!
//! Functional failures come back as [`TestOutcome::Fail`](chipbench_harness::TestOutcome)
//! inside an `Ok` report. Anything that keeps a test from reaching a verdict
//! (an unknown test, a stalled scheduler, an expired watchdog) is a
//! [`RunnerError`].

#![warn(missing_docs)]

pub mod backend;
pub mod chip_top;
pub mod error;
pub mod model_backend;
pub mod plusargs;
pub mod registry;

pub use backend::{backend_for, Backend, BuildRequest, CompiledModel, RunReport, RunRequest};
pub use chip_top::ChipTop;
pub use error::RunnerError;
pub use model_backend::{ModelBackend, ModelFactory};
pub use plusargs::apply_plusargs;
pub use registry::{TestFn, TestRegistry};
