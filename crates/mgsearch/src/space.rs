//! Configuration space contract consumed by the roadmap and the heuristic.
//!
//! The oracle behind `StateSpace` (collision checker, clearance field, ...)
//! lives outside this crate. All calls must be pure with respect to the
//! current environment: the roadmap caches every answer it receives.

use nalgebra::DVector;

use crate::error::{PlanError, Result};

/// A point in configuration space. Fixed dimension per roadmap.
pub type Config = DVector<f64>;

/// Identifier of a grasp (interaction mode with its own validity/cost).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraspId(pub u32);

/// Dimension and axis-aligned limits of the configuration space.
#[derive(Clone, Debug, PartialEq)]
pub struct SpaceInformation {
    pub dimension: usize,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl SpaceInformation {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        let info = Self {
            dimension: lower.len(),
            lower,
            upper,
        };
        info.validate()?;
        Ok(info)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(PlanError::bounds("dimension must be at least 1"));
        }
        if self.lower.len() != self.dimension || self.upper.len() != self.dimension {
            return Err(PlanError::bounds(format!(
                "expected {} lower and upper limits, got {} and {}",
                self.dimension,
                self.lower.len(),
                self.upper.len()
            )));
        }
        for (i, (lo, hi)) in self.lower.iter().zip(self.upper.iter()).enumerate() {
            if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
                return Err(PlanError::bounds(format!(
                    "axis {i}: need finite lower < upper, got [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }

    /// Lebesgue measure of the bounds box.
    pub fn volume(&self) -> f64 {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(lo, hi)| hi - lo)
            .product()
    }

    /// Map a point of the unit cube onto the bounds box.
    pub fn scale_to_limits(&self, unit: &[f64]) -> Config {
        debug_assert_eq!(unit.len(), self.dimension);
        Config::from_iterator(
            self.dimension,
            unit.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .map(|(u, (lo, hi))| u * (hi - lo) + lo),
        )
    }

    pub fn check_dimension(&self, config: &Config) -> Result<()> {
        if config.len() != self.dimension {
            return Err(PlanError::DimensionMismatch {
                expected: self.dimension,
                got: config.len(),
            });
        }
        Ok(())
    }
}

/// Validity/cost oracle.
///
/// Fallible calls return `anyhow::Result` so that any backend error type can be
/// surfaced; the roadmap wraps it into [`PlanError::Oracle`].
pub trait StateSpace {
    fn space_information(&self) -> &SpaceInformation;

    /// Grasp-independent validity (e.g. robot alone against the scene).
    fn is_valid(&self, config: &Config) -> anyhow::Result<bool>;

    /// Validity while holding the object with grasp `grasp`.
    fn is_valid_for_grasp(&self, config: &Config, grasp: GraspId) -> anyhow::Result<bool>;

    /// Differential cost at `config`; `f64::INFINITY` marks infeasible.
    fn cost(&self, config: &Config) -> anyhow::Result<f64>;

    fn conditional_cost(&self, config: &Config, grasp: GraspId) -> anyhow::Result<f64>;

    /// Cheap lower bound on the cost of moving from `a` to `b`.
    fn distance(&self, a: &Config, b: &Config) -> f64;
}

/// Euclidean distance in configuration space.
#[inline]
pub fn c_space_distance(a: &Config, b: &Config) -> f64 {
    (a - b).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_validation_rejects_inverted_axis() {
        let err = SpaceInformation::new(vec![0.0, 1.0], vec![1.0, 0.5]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidBounds(_)));
        assert!(SpaceInformation::new(vec![], vec![]).is_err());
    }

    #[test]
    fn scale_and_volume() {
        let si = SpaceInformation::new(vec![-1.0, 0.0], vec![1.0, 4.0]).unwrap();
        assert!((si.volume() - 8.0).abs() < 1e-12);
        let q = si.scale_to_limits(&[0.5, 0.25]);
        assert!((q[0] - 0.0).abs() < 1e-12);
        assert!((q[1] - 1.0).abs() < 1e-12);
        assert!(si.check_dimension(&Config::zeros(3)).is_err());
    }
}
