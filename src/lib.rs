//! industrial_motion - motion planning core for industrial robots
//!
//! Plans PTP, LIN and CIRC commands into time-parameterized joint trajectories
//! that respect joint and Cartesian limits, and blends command sequences into
//! one continuous motion.

// Core modules
pub mod common;
pub mod limits;
pub mod config;
pub mod command;
pub mod kinematics;

// Planning modules
pub mod trajectory_generation;
pub mod blending;

#[cfg(test)]
mod testing;

// Re-export common types for convenience
pub use common::{JointState, Pose, Trajectory, TrajectoryPoint};
pub use common::{KinematicsSolver, TimeLaw};
pub use common::{ErrorCode, MotionPlanFault, PlanningError, PlanningResult};
pub use command::{MotionCommand, MotionRequest, Sequence};
pub use config::PlannerConfig;
pub use limits::Limits;
pub use trajectory_generation::TrajectoryGenerator;
pub use blending::{SequencePlanner, TransitionWindowBlender};
