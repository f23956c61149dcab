//! Common traits defining the seams of the motion planner

use crate::common::types::{Pose, ProfileSample};
use crate::kinematics::KinematicsError;

/// Kinematics capability of one planning group.
///
/// Implementations must be reentrant if generators are shared across threads.
pub trait KinematicsSolver {
    /// Name of the planning group this solver serves
    fn group_name(&self) -> &str;

    /// Active joint names in the order used by every joint vector
    fn joint_names(&self) -> &[String];

    /// Link moved by Cartesian commands that only carry a joint goal
    fn tip_link(&self) -> &str;

    /// Check whether a link exists in the robot model
    fn has_link(&self, link_name: &str) -> bool;

    /// Pose of `link_name` for the given joint positions
    fn forward(&self, link_name: &str, positions: &[f64]) -> Result<Pose, KinematicsError>;

    /// Joint positions placing `link_name` at `pose`, choosing the branch closest to `seed`
    fn inverse(
        &self,
        link_name: &str,
        pose: &Pose,
        seed: &[f64],
    ) -> Result<Vec<f64>, KinematicsError>;
}

impl<K: KinematicsSolver + ?Sized> KinematicsSolver for &K {
    fn group_name(&self) -> &str {
        (**self).group_name()
    }

    fn joint_names(&self) -> &[String] {
        (**self).joint_names()
    }

    fn tip_link(&self) -> &str {
        (**self).tip_link()
    }

    fn has_link(&self, link_name: &str) -> bool {
        (**self).has_link(link_name)
    }

    fn forward(&self, link_name: &str, positions: &[f64]) -> Result<Pose, KinematicsError> {
        (**self).forward(link_name, positions)
    }

    fn inverse(
        &self,
        link_name: &str,
        pose: &Pose,
        seed: &[f64],
    ) -> Result<Vec<f64>, KinematicsError> {
        (**self).inverse(link_name, pose, seed)
    }
}

/// Time parameterization of a path expressed as a fraction in [0, 1]
pub trait TimeLaw {
    /// Total duration in seconds
    fn duration(&self) -> f64;

    /// Fraction, fraction rate and fraction acceleration at time `t`.
    ///
    /// Times outside `[0, duration]` are clamped to the rest states at either end.
    fn sample(&self, t: f64) -> ProfileSample;

    /// Path fraction reached at time `t`
    fn fraction(&self, t: f64) -> f64 {
        self.sample(t).position
    }
}
