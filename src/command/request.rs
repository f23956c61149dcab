//! Loose, declarative motion request as produced by a loader
//!
//! Nothing here is validated. [`MotionCommand::from_request`](super::MotionCommand::from_request)
//! turns a request into a typed command or reports why it cannot.

use nalgebra::Point3;

use crate::common::{JointState, Pose};

/// Name tagging an auxiliary path constraint as a circle center
pub const CENTER_CONSTRAINT: &str = "center";
/// Name tagging an auxiliary path constraint as an intermediate circle point
pub const INTERIM_CONSTRAINT: &str = "interim";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ptp,
    Lin,
    Circ,
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Ptp => "PTP",
            CommandKind::Lin => "LIN",
            CommandKind::Circ => "CIRC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointConstraint {
    pub joint_name: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseConstraint {
    pub link_name: String,
    pub pose: Pose,
}

/// Goal as written by the caller: joint constraints, a pose, or (invalid) both or neither
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoalConstraints {
    pub joint_constraints: Vec<JointConstraint>,
    pub pose: Option<PoseConstraint>,
}

impl GoalConstraints {
    pub fn joints<S: Into<String>>(names: impl IntoIterator<Item = S>, positions: &[f64]) -> Self {
        let joint_constraints = names
            .into_iter()
            .zip(positions.iter())
            .map(|(name, position)| JointConstraint {
                joint_name: name.into(),
                position: *position,
            })
            .collect();
        Self {
            joint_constraints,
            pose: None,
        }
    }

    pub fn pose(link_name: impl Into<String>, pose: Pose) -> Self {
        Self {
            joint_constraints: Vec::new(),
            pose: Some(PoseConstraint {
                link_name: link_name.into(),
                pose,
            }),
        }
    }
}

/// Position constraint on a link, carrying the auxiliary point(s)
#[derive(Debug, Clone, PartialEq)]
pub struct PositionConstraint {
    pub link_name: String,
    pub primitive_poses: Vec<Point3<f64>>,
}

/// Named path constraint; for circular motions the name selects center or interim
#[derive(Debug, Clone, PartialEq)]
pub struct PathConstraint {
    pub name: String,
    pub position_constraints: Vec<PositionConstraint>,
}

impl PathConstraint {
    fn single(name: &str, link_name: impl Into<String>, point: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            position_constraints: vec![PositionConstraint {
                link_name: link_name.into(),
                primitive_poses: vec![point],
            }],
        }
    }

    pub fn center(link_name: impl Into<String>, point: Point3<f64>) -> Self {
        Self::single(CENTER_CONSTRAINT, link_name, point)
    }

    pub fn interim(link_name: impl Into<String>, point: Point3<f64>) -> Self {
        Self::single(INTERIM_CONSTRAINT, link_name, point)
    }
}

/// Motion request before validation
#[derive(Debug, Clone, PartialEq)]
pub struct MotionRequest {
    pub kind: CommandKind,
    pub group_name: String,
    /// Velocities may be left empty, accelerations are ignored
    pub start_state: JointState,
    pub goal: GoalConstraints,
    pub path_constraint: Option<PathConstraint>,
    pub velocity_scale: f64,
    pub acceleration_scale: f64,
}

impl MotionRequest {
    pub fn new(
        kind: CommandKind,
        group_name: impl Into<String>,
        start_state: JointState,
        goal: GoalConstraints,
    ) -> Self {
        Self {
            kind,
            group_name: group_name.into(),
            start_state,
            goal,
            path_constraint: None,
            velocity_scale: 1.0,
            acceleration_scale: 1.0,
        }
    }

    pub fn with_scaling(mut self, velocity_scale: f64, acceleration_scale: f64) -> Self {
        self.velocity_scale = velocity_scale;
        self.acceleration_scale = acceleration_scale;
        self
    }

    pub fn with_path_constraint(mut self, path_constraint: PathConstraint) -> Self {
        self.path_constraint = Some(path_constraint);
        self
    }
}
