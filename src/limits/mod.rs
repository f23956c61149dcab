//! Limits model shared read-only by generators and the blender

pub mod joint_limits;
pub mod cartesian_limit;

pub use cartesian_limit::*;
pub use joint_limits::*;

use crate::common::{PlanningError, PlanningResult};

/// Joint and Cartesian bounds of one planning session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Limits {
    pub joint: JointLimits,
    pub cartesian: CartesianLimit,
}

impl Limits {
    pub fn new(joint: JointLimits, cartesian: CartesianLimit) -> Self {
        Self { joint, cartesian }
    }

    /// Check that every bound is set and that each of `joint_names` has a limit
    pub fn validate(&self, joint_names: &[String]) -> PlanningResult<()> {
        if let Some(bound) = self.cartesian.invalid_bound() {
            return Err(PlanningError::InvalidLimits(format!(
                "cartesian {} must be finite and positive",
                bound
            )));
        }

        for name in joint_names {
            let limit = self.joint.get(name).ok_or_else(|| {
                PlanningError::InvalidLimits(format!("no limits for joint '{}'", name))
            })?;
            if let Some(bound) = limit.invalid_bound() {
                return Err(PlanningError::InvalidLimits(format!(
                    "joint '{}' {} must be finite and positive",
                    name, bound
                )));
            }
        }
        Ok(())
    }
}
