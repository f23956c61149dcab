//! Joint-space checks run on every finished trajectory

use crate::common::{PlanningError, PlanningResult, Trajectory, TrajectoryPoint};
use crate::limits::JointLimits;

/// Relative slack on joint bounds absorbing rounding in the finite differences
const LIMIT_SLACK: f64 = 1e-9;

/// Check every sample's velocity and acceleration against the joint limits.
///
/// Accelerations opposing the velocity are held to the deceleration bound.
pub fn verify_joint_limits(trajectory: &Trajectory, limits: &JointLimits) -> PlanningResult<()> {
    verify_points(&trajectory.joint_names, &trajectory.points, limits)
}

/// Check the velocities and accelerations of `points` against the joint limits
pub fn verify_points(
    joint_names: &[String],
    points: &[TrajectoryPoint],
    limits: &JointLimits,
) -> PlanningResult<()> {
    for (j, name) in joint_names.iter().enumerate() {
        let limit = limits.get(name).ok_or_else(|| {
            PlanningError::InvalidLimits(format!("no limits for joint '{}'", name))
        })?;

        for point in points {
            let velocity = point.velocities[j];
            let acceleration = point.accelerations[j];
            if velocity.abs() > limit.max_velocity * (1.0 + LIMIT_SLACK) {
                return Err(PlanningError::planning_failed(format!(
                    "joint '{}' velocity {:.4} exceeds {:.4} at t = {:.3} s",
                    name, velocity, limit.max_velocity, point.time_from_start
                )));
            }
            let bound = limit.acceleration_bound(velocity, acceleration);
            if acceleration.abs() > bound * (1.0 + LIMIT_SLACK) {
                return Err(PlanningError::planning_failed(format!(
                    "joint '{}' acceleration {:.4} exceeds {:.4} at t = {:.3} s",
                    name, acceleration, bound, point.time_from_start
                )));
            }
        }
    }
    Ok(())
}

/// Check that the trajectory ends at rest within `tolerance`
pub fn verify_terminal_state(trajectory: &Trajectory, tolerance: f64) -> PlanningResult<()> {
    let last = trajectory
        .last()
        .ok_or_else(|| PlanningError::planning_failed("trajectory has no samples"))?;
    let moving = last
        .velocities
        .iter()
        .chain(last.accelerations.iter())
        .any(|value| value.abs() > tolerance);
    if moving {
        return Err(PlanningError::planning_failed("trajectory does not end at rest"));
    }
    Ok(())
}
