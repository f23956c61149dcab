//! Kinematics capability consumed by the generators
//!
//! The planner only depends on [`KinematicsSolver`](crate::common::KinematicsSolver).
//! [`GantryWristRobot`] is an analytic reference robot used by the demo and the tests.

pub mod gantry_wrist;

pub use gantry_wrist::*;

use thiserror::Error;

use crate::common::{KinematicsSolver, MotionPlanFault, PlanningResult, Pose};

/// Failure reported by a kinematics solver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    #[error("unknown link '{0}'")]
    UnknownLink(String),
    #[error("expected {expected} joint values, got {actual}")]
    JointCount { expected: usize, actual: usize },
    #[error("pose out of reach: {0}")]
    OutOfReach(String),
    #[error("singular configuration: {0}")]
    Singular(String),
    #[error("link '{0}' cannot be placed by inverse kinematics")]
    NotSolvable(String),
}

/// Joint positions for every pose, each solution seeding the next one.
///
/// The first pose is seeded with `seed`. Fails on the first pose without a solution.
pub fn inverse_along_path<'p, K: KinematicsSolver>(
    kinematics: &K,
    link_name: &str,
    poses: impl IntoIterator<Item = &'p Pose>,
    seed: &[f64],
) -> PlanningResult<Vec<Vec<f64>>> {
    poses
        .into_iter()
        .enumerate()
        .try_fold(Vec::new(), |mut solutions: Vec<Vec<f64>>, (sample, pose)| {
            let previous = solutions.last().map(Vec::as_slice).unwrap_or(seed);
            let solution = kinematics
                .inverse(link_name, pose, previous)
                .map_err(|source| MotionPlanFault::NoIkSolution { sample, source })?;
            solutions.push(solution);
            Ok(solutions)
        })
}

/// Pose of `link_name` for every joint vector
pub fn forward_along_path<'q, K: KinematicsSolver>(
    kinematics: &K,
    link_name: &str,
    positions: impl IntoIterator<Item = &'q Vec<f64>>,
) -> PlanningResult<Vec<Pose>> {
    positions
        .into_iter()
        .map(|q| {
            kinematics
                .forward(link_name, q)
                .map_err(|e| MotionPlanFault::ForwardKinematics(e).into())
        })
        .collect()
}
