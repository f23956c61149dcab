//! Error types for industrial_motion

use thiserror::Error;

use crate::kinematics::KinematicsError;
use crate::trajectory_generation::circle::CircleError;

/// Coarse classification of a failed planning call.
///
/// Exactly one code is reported per failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRobotState,
    InvalidGoalConstraints,
    InvalidMotionPlan,
    InvalidLinkName,
    PlanningFailed,
    InvalidLimits,
}

/// Main error type for trajectory generation and blending
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Start state unusable, e.g. a non-zero start velocity for a standalone command
    #[error("invalid robot state: {0}")]
    InvalidRobotState(String),
    /// Joint goal does not match the active joints of the planning group
    #[error("invalid goal constraints: {0}")]
    InvalidGoalConstraints(String),
    /// Geometry or request shape is degenerate, under- or over-specified
    #[error("invalid motion plan: {0}")]
    InvalidMotionPlan(#[from] MotionPlanFault),
    /// A link name could not be resolved against the robot model
    #[error("invalid link name: {0}")]
    InvalidLinkName(String),
    /// Geometry is fine but the requested scaling cannot be realized within limits
    #[error("planning failed: {0}")]
    PlanningFailed(String),
    /// The limits handed to a generator are incomplete or non-positive
    #[error("invalid limits: {0}")]
    InvalidLimits(String),
}

impl PlanningError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PlanningError::InvalidRobotState(_) => ErrorCode::InvalidRobotState,
            PlanningError::InvalidGoalConstraints(_) => ErrorCode::InvalidGoalConstraints,
            PlanningError::InvalidMotionPlan(_) => ErrorCode::InvalidMotionPlan,
            PlanningError::InvalidLinkName(_) => ErrorCode::InvalidLinkName,
            PlanningError::PlanningFailed(_) => ErrorCode::PlanningFailed,
            PlanningError::InvalidLimits(_) => ErrorCode::InvalidLimits,
        }
    }

    pub fn planning_failed(message: impl Into<String>) -> Self {
        PlanningError::PlanningFailed(message.into())
    }

    /// Re-tag blend faults with `junction`; other errors pass through
    pub fn at_junction(self, junction: usize) -> Self {
        match self {
            PlanningError::InvalidMotionPlan(fault) => {
                PlanningError::InvalidMotionPlan(fault.at_junction(junction))
            }
            other => other,
        }
    }
}

impl From<CircleError> for PlanningError {
    fn from(e: CircleError) -> Self {
        PlanningError::InvalidMotionPlan(MotionPlanFault::Circle(e))
    }
}

/// Detailed reason behind an `InvalidMotionPlan` failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionPlanFault {
    #[error("planning group '{0}' is not known to the kinematics solver")]
    UnknownPlanningGroup(String),
    #[error("circular motion requires an auxiliary point constraint")]
    MissingAuxiliaryPoint,
    #[error("auxiliary constraint must carry exactly one position constraint, got {0}")]
    AuxiliaryConstraintCount(usize),
    #[error("auxiliary position constraint must carry exactly one primitive pose, got {0}")]
    AuxiliaryPoseCount(usize),
    #[error("auxiliary constraint name is empty")]
    UnnamedAuxiliaryPoint,
    #[error("auxiliary constraint name '{0}' is neither 'center' nor 'interim'")]
    UnknownAuxiliaryName(String),
    #[error("{0} motion does not accept an auxiliary point")]
    UnexpectedAuxiliaryPoint(&'static str),
    #[error("circle not well defined: {0}")]
    Circle(#[from] CircleError),
    #[error("start and goal coincide, nothing to move")]
    ZeroLengthMotion,
    #[error("no inverse kinematics solution for sample {sample}: {source}")]
    NoIkSolution {
        sample: usize,
        #[source]
        source: KinematicsError,
    },
    #[error("forward kinematics failed: {0}")]
    ForwardKinematics(KinematicsError),
    #[error("goal pose has no inverse kinematics solution: {0}")]
    UnreachableGoal(KinematicsError),
    #[error("sequence is empty")]
    EmptySequence,
    #[error("blend radius {radius} at junction {junction} is invalid")]
    InvalidBlendRadius { junction: usize, radius: f64 },
    #[error("blend radius {radius} at junction {junction} not achievable, at most {max_radius}")]
    BlendRadiusNotAchievable {
        junction: usize,
        radius: f64,
        max_radius: f64,
    },
    #[error("blend windows around junction {junction} overlap")]
    OverlappingBlendWindows { junction: usize },
}

impl MotionPlanFault {
    /// Re-tag a blend fault with the junction it belongs to
    pub fn at_junction(self, junction: usize) -> Self {
        match self {
            MotionPlanFault::InvalidBlendRadius { radius, .. } => {
                MotionPlanFault::InvalidBlendRadius { junction, radius }
            }
            MotionPlanFault::BlendRadiusNotAchievable { radius, max_radius, .. } => {
                MotionPlanFault::BlendRadiusNotAchievable {
                    junction,
                    radius,
                    max_radius,
                }
            }
            MotionPlanFault::OverlappingBlendWindows { .. } => {
                MotionPlanFault::OverlappingBlendWindows { junction }
            }
            other => other,
        }
    }
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
