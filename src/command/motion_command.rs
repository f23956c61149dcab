//! Typed motion commands
//!
//! A [`MotionCommand`] is only obtained by validating a [`MotionRequest`] against a
//! kinematics solver, so the generators never see names that do not resolve,
//! unordered joint vectors or a circular motion without exactly one auxiliary point.

use std::collections::HashSet;

use nalgebra::Point3;

use super::request::{
    CommandKind, GoalConstraints, MotionRequest, PathConstraint, CENTER_CONSTRAINT,
    INTERIM_CONSTRAINT,
};
use crate::common::{
    JointState, KinematicsSolver, MotionPlanFault, PlanningError, PlanningResult, Pose,
};

/// Third point defining a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuxiliaryPoint {
    Center(Point3<f64>),
    Interim(Point3<f64>),
}

/// Goal of a command
#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
    /// Joint positions in the solver's joint order
    Joints(Vec<f64>),
    /// Pose of `link_name` in the base frame
    Pose { link_name: String, pose: Pose },
}

/// Parameters shared by every command kind
#[derive(Debug, Clone, PartialEq)]
pub struct MotionParameters {
    pub group_name: String,
    /// Start positions in the solver's joint order, at rest
    pub start: JointState,
    pub goal: Goal,
    /// Link whose pose Cartesian commands interpolate
    pub target_link: String,
    pub velocity_scale: f64,
    pub acceleration_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MotionCommand {
    Ptp(MotionParameters),
    Lin(MotionParameters),
    Circ {
        parameters: MotionParameters,
        auxiliary: AuxiliaryPoint,
    },
}

impl MotionCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            MotionCommand::Ptp(_) => CommandKind::Ptp,
            MotionCommand::Lin(_) => CommandKind::Lin,
            MotionCommand::Circ { .. } => CommandKind::Circ,
        }
    }

    pub fn parameters(&self) -> &MotionParameters {
        match self {
            MotionCommand::Ptp(parameters) | MotionCommand::Lin(parameters) => parameters,
            MotionCommand::Circ { parameters, .. } => parameters,
        }
    }

    /// Validate `request` against the robot model of `kinematics`.
    ///
    /// Start velocities with a magnitude above `other_tolerance` are rejected.
    /// Scaling factors are carried over unchecked.
    pub fn from_request<K: KinematicsSolver>(
        request: &MotionRequest,
        kinematics: &K,
        other_tolerance: f64,
    ) -> PlanningResult<Self> {
        if request.group_name != kinematics.group_name() {
            return Err(MotionPlanFault::UnknownPlanningGroup(request.group_name.clone()).into());
        }

        let joint_names = kinematics.joint_names();
        let start = ordered_start_state(&request.start_state, joint_names, other_tolerance)?;
        let goal = resolve_goal(&request.goal, joint_names, kinematics)?;
        let target_link = match &goal {
            Goal::Pose { link_name, .. } => link_name.clone(),
            Goal::Joints(_) => kinematics.tip_link().to_string(),
        };

        let parameters = MotionParameters {
            group_name: request.group_name.clone(),
            start,
            goal,
            target_link,
            velocity_scale: request.velocity_scale,
            acceleration_scale: request.acceleration_scale,
        };

        match request.kind {
            CommandKind::Circ => {
                let path = request
                    .path_constraint
                    .as_ref()
                    .ok_or(MotionPlanFault::MissingAuxiliaryPoint)?;
                let auxiliary = resolve_auxiliary_point(path, kinematics)?;
                Ok(MotionCommand::Circ { parameters, auxiliary })
            }
            kind => {
                if request.path_constraint.is_some() {
                    return Err(MotionPlanFault::UnexpectedAuxiliaryPoint(kind.name()).into());
                }
                if kind == CommandKind::Ptp {
                    Ok(MotionCommand::Ptp(parameters))
                } else {
                    Ok(MotionCommand::Lin(parameters))
                }
            }
        }
    }
}

/// Index of every active joint in `names`, requiring each exactly once and nothing else
fn match_joint_names<'a>(
    names: impl Iterator<Item = &'a str> + Clone,
    joint_names: &[String],
) -> Result<Vec<usize>, String> {
    let mut seen = HashSet::new();
    for name in names.clone() {
        if !seen.insert(name) {
            return Err(format!("joint '{}' given twice", name));
        }
        if !joint_names.iter().any(|j| j == name) {
            return Err(format!("joint '{}' is not part of the planning group", name));
        }
    }

    joint_names
        .iter()
        .map(|joint| {
            names
                .clone()
                .position(|name| name == joint)
                .ok_or_else(|| format!("joint '{}' missing", joint))
        })
        .collect()
}

fn ordered_start_state(
    state: &JointState,
    joint_names: &[String],
    other_tolerance: f64,
) -> PlanningResult<JointState> {
    if state.positions.len() != state.names.len() {
        return Err(PlanningError::InvalidRobotState(format!(
            "{} joint names but {} positions",
            state.names.len(),
            state.positions.len()
        )));
    }
    if !state.velocities.is_empty() && state.velocities.len() != state.names.len() {
        return Err(PlanningError::InvalidRobotState(format!(
            "{} joint names but {} velocities",
            state.names.len(),
            state.velocities.len()
        )));
    }

    let indices = match_joint_names(state.names.iter().map(String::as_str), joint_names)
        .map_err(PlanningError::InvalidRobotState)?;

    if let Some((name, velocity)) = state
        .names
        .iter()
        .zip(state.velocities.iter())
        .find(|(_, v)| v.abs() > other_tolerance)
    {
        return Err(PlanningError::InvalidRobotState(format!(
            "joint '{}' is moving with velocity {}",
            name, velocity
        )));
    }

    let positions = indices.iter().map(|&i| state.positions[i]).collect();
    Ok(JointState::at_rest(joint_names.to_vec(), positions))
}

fn resolve_goal<K: KinematicsSolver>(
    goal: &GoalConstraints,
    joint_names: &[String],
    kinematics: &K,
) -> PlanningResult<Goal> {
    match (goal.joint_constraints.is_empty(), &goal.pose) {
        (true, None) => Err(PlanningError::InvalidGoalConstraints("no goal given".to_string())),
        (false, Some(_)) => Err(PlanningError::InvalidGoalConstraints(
            "joint and pose goal given at once".to_string(),
        )),
        (true, Some(constraint)) => {
            if !kinematics.has_link(&constraint.link_name) {
                return Err(PlanningError::InvalidLinkName(constraint.link_name.clone()));
            }
            Ok(Goal::Pose {
                link_name: constraint.link_name.clone(),
                pose: constraint.pose,
            })
        }
        (false, None) => {
            let constraints = &goal.joint_constraints;
            let names = constraints.iter().map(|c| c.joint_name.as_str());
            let indices = match_joint_names(names, joint_names)
                .map_err(PlanningError::InvalidGoalConstraints)?;
            Ok(Goal::Joints(indices.iter().map(|&i| constraints[i].position).collect()))
        }
    }
}

fn resolve_auxiliary_point<K: KinematicsSolver>(
    path: &PathConstraint,
    kinematics: &K,
) -> PlanningResult<AuxiliaryPoint> {
    if path.name.is_empty() {
        return Err(MotionPlanFault::UnnamedAuxiliaryPoint.into());
    }
    let constraint = match path.position_constraints.as_slice() {
        [single] => single,
        other => return Err(MotionPlanFault::AuxiliaryConstraintCount(other.len()).into()),
    };
    let point = match constraint.primitive_poses.as_slice() {
        [single] => *single,
        other => return Err(MotionPlanFault::AuxiliaryPoseCount(other.len()).into()),
    };
    if !kinematics.has_link(&constraint.link_name) {
        return Err(PlanningError::InvalidLinkName(constraint.link_name.clone()));
    }

    match path.name.as_str() {
        CENTER_CONSTRAINT => Ok(AuxiliaryPoint::Center(point)),
        INTERIM_CONSTRAINT => Ok(AuxiliaryPoint::Interim(point)),
        other => Err(MotionPlanFault::UnknownAuxiliaryName(other.to_string()).into()),
    }
}
