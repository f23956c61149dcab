//! Shared fixtures for unit tests: reference robot, limits and requests

use nalgebra::{Point3, UnitQuaternion};

use crate::command::{CommandKind, GoalConstraints, MotionRequest, PathConstraint};
use crate::common::{pose_from_parts, JointState, KinematicsSolver, Pose};
use crate::config::PlannerConfig;
use crate::kinematics::{GantryWristRobot, TCP_LINK};
use crate::limits::{CartesianLimit, JointLimit, JointLimits, Limits};
use crate::trajectory_generation::TrajectoryGenerator;

pub(crate) const GROUP: &str = "manipulator";
pub(crate) const CIRCLE_RADIUS: f64 = 0.5;
/// Height of the flange below the tool center point with the wrist at zero
const TOOL_LENGTH: f64 = 0.1;

pub(crate) fn robot() -> GantryWristRobot {
    GantryWristRobot::with_defaults()
}

/// Cartesian limits are generous, the prismatic joints are the bottleneck
pub(crate) fn fixture_limits() -> Limits {
    let robot = robot();
    let joint = robot
        .joint_names()
        .iter()
        .enumerate()
        .fold(JointLimits::new(), |limits, (i, name)| {
            let limit = if i < 3 {
                JointLimit::symmetric(0.25, 2.0)
            } else {
                JointLimit::symmetric(1.0, 4.0)
            };
            limits.with_limit(name.clone(), limit)
        });
    Limits::new(joint, CartesianLimit::new(2.0, 4.0, 4.0, 2.0))
}

pub(crate) fn generator() -> TrajectoryGenerator<GantryWristRobot> {
    match TrajectoryGenerator::new(robot(), fixture_limits(), PlannerConfig::default()) {
        Ok(generator) => generator,
        Err(e) => panic!("fixture limits rejected: {}", e),
    }
}

pub(crate) fn circle_center() -> Point3<f64> {
    Point3::new(0.0, 0.0, 0.6)
}

/// Point on the fixture circle (xy plane) at `degrees`
pub(crate) fn point_on_circle(degrees: f64) -> Point3<f64> {
    let phi = degrees.to_radians();
    circle_center() + CIRCLE_RADIUS * nalgebra::Vector3::new(phi.cos(), phi.sin(), 0.0)
}

/// Tool center point pose with the tool pointing along the base z axis
pub(crate) fn tcp_pose(position: Point3<f64>) -> Pose {
    pose_from_parts(position, UnitQuaternion::identity())
}

/// Joint positions placing the tool center point at `position`
pub(crate) fn joints_at(position: Point3<f64>) -> Vec<f64> {
    vec![position.x, position.y, position.z - TOOL_LENGTH, 0.0, 0.0, 0.0]
}

pub(crate) fn circ_start() -> Point3<f64> {
    point_on_circle(-45.0)
}

pub(crate) fn circ_goal() -> Point3<f64> {
    point_on_circle(45.0)
}

pub(crate) fn start_joints() -> Vec<f64> {
    joints_at(circ_start())
}

fn start_state(positions: &[f64]) -> JointState {
    JointState::at_rest(robot().joint_names().to_vec(), positions.to_vec())
}

pub(crate) enum AuxKind {
    Center,
    /// Interim point at the given angle in degrees
    Interim(f64),
}

/// CIRC on the fixture circle between two angles in degrees
pub(crate) fn circle_request(start_degrees: f64, goal_degrees: f64, aux: AuxKind) -> MotionRequest {
    let path = match aux {
        AuxKind::Center => PathConstraint::center(TCP_LINK, circle_center()),
        AuxKind::Interim(degrees) => PathConstraint::interim(TCP_LINK, point_on_circle(degrees)),
    };
    MotionRequest::new(
        CommandKind::Circ,
        GROUP,
        start_state(&joints_at(point_on_circle(start_degrees))),
        GoalConstraints::pose(TCP_LINK, tcp_pose(point_on_circle(goal_degrees))),
    )
    .with_path_constraint(path)
    .with_scaling(0.1, 0.1)
}

/// Quarter circle from -45° to 45° around the fixture center
pub(crate) fn circ_center_request() -> MotionRequest {
    circle_request(-45.0, 45.0, AuxKind::Center)
}

/// Same quarter circle, fixed by an interim point at 0°
pub(crate) fn circ_interim_request() -> MotionRequest {
    circle_request(-45.0, 45.0, AuxKind::Interim(0.0))
}

pub(crate) fn lin_request(start: &[f64], goal: Point3<f64>) -> MotionRequest {
    MotionRequest::new(
        CommandKind::Lin,
        GROUP,
        start_state(start),
        GoalConstraints::pose(TCP_LINK, tcp_pose(goal)),
    )
    .with_scaling(0.1, 0.1)
}

pub(crate) fn ptp_request(start: &[f64], goal: &[f64]) -> MotionRequest {
    let robot = robot();
    MotionRequest::new(
        CommandKind::Ptp,
        GROUP,
        start_state(start),
        GoalConstraints::joints(robot.joint_names().iter().cloned(), goal),
    )
    .with_scaling(0.1, 0.1)
}
