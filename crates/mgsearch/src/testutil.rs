//! Shared helpers for unit tests.

use std::cell::Cell;

use anyhow::bail;

use crate::space::{Config, GraspId, SpaceInformation, StateSpace};

pub(crate) fn cfg(xs: &[f64]) -> Config {
    Config::from_column_slice(xs)
}

/// Wraps a state space and counts oracle calls; can be switched to fail.
pub(crate) struct CountingSpace<S> {
    inner: S,
    cost_calls: Cell<usize>,
    validity_calls: Cell<usize>,
    failing: Cell<bool>,
}

impl<S: StateSpace> CountingSpace<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            cost_calls: Cell::new(0),
            validity_calls: Cell::new(0),
            failing: Cell::new(false),
        }
    }

    pub(crate) fn cost_calls(&self) -> usize {
        self.cost_calls.get()
    }

    pub(crate) fn validity_calls(&self) -> usize {
        self.validity_calls.get()
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn tick(&self, counter: &Cell<usize>) -> anyhow::Result<()> {
        if self.failing.get() {
            bail!("oracle offline");
        }
        counter.set(counter.get() + 1);
        Ok(())
    }
}

impl<S: StateSpace> StateSpace for CountingSpace<S> {
    fn space_information(&self) -> &SpaceInformation {
        self.inner.space_information()
    }

    fn is_valid(&self, config: &Config) -> anyhow::Result<bool> {
        self.tick(&self.validity_calls)?;
        self.inner.is_valid(config)
    }

    fn is_valid_for_grasp(&self, config: &Config, grasp: GraspId) -> anyhow::Result<bool> {
        self.tick(&self.validity_calls)?;
        self.inner.is_valid_for_grasp(config, grasp)
    }

    fn cost(&self, config: &Config) -> anyhow::Result<f64> {
        self.tick(&self.cost_calls)?;
        self.inner.cost(config)
    }

    fn conditional_cost(&self, config: &Config, grasp: GraspId) -> anyhow::Result<f64> {
        self.tick(&self.cost_calls)?;
        self.inner.conditional_cost(config, grasp)
    }

    fn distance(&self, a: &Config, b: &Config) -> f64 {
        self.inner.distance(a, b)
    }
}
