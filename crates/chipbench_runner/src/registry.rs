//! Named test entrypoints.

use std::collections::BTreeMap;

use chipbench_harness::{test_counter, ScenarioConfig, TestOutcome, TEST_COUNTER};
use chipbench_sim::Dut;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

/// A test entrypoint: takes the device and the scenario parameters and
/// resolves to a verdict.
pub type TestFn = fn(Dut, ScenarioConfig) -> LocalBoxFuture<'static, TestOutcome>;

/// Test entrypoints a backend can run, by name.
#[derive(Clone, Debug, Default)]
pub struct TestRegistry {
    tests: BTreeMap<String, TestFn>,
}

impl TestRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in tests.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(TEST_COUNTER, |dut, config| {
            test_counter(dut, config).boxed_local()
        });
        registry
    }

    /// Adds or replaces a test.
    pub fn register(&mut self, name: impl Into<String>, test: TestFn) {
        self.tests.insert(name.into(), test);
    }

    /// Looks up a test by name.
    pub fn get(&self, name: &str) -> Option<TestFn> {
        self.tests.get(name).copied()
    }

    /// Test names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.tests.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_counter() {
        let registry = TestRegistry::with_builtin();
        assert!(registry.get("test_counter").is_some());
        assert_eq!(registry.names(), vec!["test_counter"]);
    }

    #[test]
    fn register_adds_names_sorted() {
        let mut registry = TestRegistry::with_builtin();
        registry.register("test_alpha", |_, _| async { TestOutcome::Pass }.boxed_local());
        assert_eq!(registry.names(), vec!["test_alpha", "test_counter"]);
        assert!(registry.get("test_beta").is_none());
    }
}
