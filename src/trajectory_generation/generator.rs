//! Trajectory generation for single PTP, LIN and CIRC commands
//!
//! A call walks through the [`GenerationState`]s below; the first error ends it
//! in `Failed` and is returned as is. No partial trajectory is ever produced.

use std::fmt;

use super::cartesian_path::{parameterize, CartesianPath};
use super::circle::resolve_circle;
use super::time_law::{check_scaling, FractionBounds, SineSquaredProfile};
use super::verification::{verify_joint_limits, verify_terminal_state};
use crate::command::{AuxiliaryPoint, Goal, MotionCommand, MotionParameters, MotionRequest};
use crate::common::{
    pose_position, KinematicsSolver, MotionPlanFault, PlanningError, PlanningResult, Pose,
    Trajectory,
};
use crate::config::PlannerConfig;
use crate::kinematics::inverse_along_path;
use crate::limits::Limits;

/// Joint displacements below this do not constrain a PTP motion
const MIN_JOINT_DISTANCE: f64 = 1e-12;
/// Samples repeating the goal at the end of every trajectory, so it ends standing still
const SETTLE_SAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Validating,
    ResolvingGeometry,
    Parameterizing,
    MappingKinematics,
    Verifying,
    Done,
    Failed,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationState::Validating => "VALIDATING",
            GenerationState::ResolvingGeometry => "RESOLVING_GEOMETRY",
            GenerationState::Parameterizing => "PARAMETERIZING",
            GenerationState::MappingKinematics => "MAPPING_KINEMATICS",
            GenerationState::Verifying => "VERIFYING",
            GenerationState::Done => "DONE",
            GenerationState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Current state of one generation call
struct Progress {
    state: GenerationState,
}

impl Progress {
    fn new() -> Self {
        tracing::debug!("Generation state: {}", GenerationState::Validating);
        Self {
            state: GenerationState::Validating,
        }
    }

    fn enter(&mut self, next: GenerationState) {
        tracing::debug!("Generation state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Plans single motion commands for one planning group.
///
/// Holds no mutable state, so one generator may serve any number of calls.
#[derive(Debug, Clone)]
pub struct TrajectoryGenerator<K> {
    kinematics: K,
    limits: Limits,
    config: PlannerConfig,
}

impl<K: KinematicsSolver> TrajectoryGenerator<K> {
    /// Generator for the planning group of `kinematics`.
    ///
    /// Fails with `InvalidLimits` when a bound is unset or non-positive, a joint of
    /// the group has no limit, or the configuration values are unusable.
    pub fn new(kinematics: K, limits: Limits, config: PlannerConfig) -> PlanningResult<Self> {
        config
            .validate()
            .map_err(|e| PlanningError::InvalidLimits(e.to_string()))?;
        limits.validate(kinematics.joint_names())?;
        Ok(Self {
            kinematics,
            limits,
            config,
        })
    }

    /// Generator using the limits described by `config`
    pub fn from_config(kinematics: K, config: PlannerConfig) -> PlanningResult<Self> {
        let limits = config.limits();
        Self::new(kinematics, limits, config)
    }

    pub fn kinematics(&self) -> &K {
        &self.kinematics
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Validate `request` and plan it
    pub fn generate(&self, request: &MotionRequest) -> PlanningResult<Trajectory> {
        let mut progress = Progress::new();
        let tolerance = self.config.tolerances.other_tolerance;
        let result = MotionCommand::from_request(request, &self.kinematics, tolerance)
            .and_then(|command| self.run(&command, &mut progress));
        self.finish(request.kind.name(), progress, result)
    }

    /// Plan an already typed command
    pub fn generate_command(&self, command: &MotionCommand) -> PlanningResult<Trajectory> {
        let mut progress = Progress::new();
        let result = self.run(command, &mut progress);
        self.finish(command.kind().name(), progress, result)
    }

    fn finish(
        &self,
        kind: &str,
        mut progress: Progress,
        result: PlanningResult<Trajectory>,
    ) -> PlanningResult<Trajectory> {
        match &result {
            Ok(trajectory) => {
                progress.enter(GenerationState::Done);
                tracing::info!(
                    "Planned {} motion: {} samples, {:.3} s",
                    kind,
                    trajectory.len(),
                    trajectory.duration()
                );
            }
            Err(e) => {
                let failed_in = progress.state;
                progress.enter(GenerationState::Failed);
                tracing::warn!("{} motion rejected in {}: {}", kind, failed_in, e);
            }
        }
        result
    }

    fn run(&self, command: &MotionCommand, progress: &mut Progress) -> PlanningResult<Trajectory> {
        let parameters = command.parameters();
        self.validate_command(parameters)?;

        let mut positions = match command {
            MotionCommand::Ptp(parameters) => self.plan_ptp(parameters, progress)?,
            MotionCommand::Lin(parameters) => {
                let (start, goal) = self.terminal_poses(parameters)?;
                let path = CartesianPath::line(&start, &goal);
                self.plan_cartesian(parameters, &path, progress)?
            }
            MotionCommand::Circ { parameters, auxiliary } => {
                let (start, goal) = self.terminal_poses(parameters)?;
                progress.enter(GenerationState::ResolvingGeometry);
                let path = self.circle_path(&start, &goal, auxiliary)?;
                self.plan_cartesian(parameters, &path, progress)?
            }
        };

        if let Some(goal) = positions.last().cloned() {
            positions.extend(std::iter::repeat(goal).take(SETTLE_SAMPLES));
        }

        progress.enter(GenerationState::Verifying);
        let trajectory = Trajectory::from_positions(
            self.kinematics.joint_names().to_vec(),
            self.config.sampling_time,
            positions,
        );
        verify_joint_limits(&trajectory, &self.limits.joint)?;
        verify_terminal_state(&trajectory, self.config.tolerances.other_tolerance)?;
        Ok(trajectory)
    }

    /// Checks a typed command built by hand could still get wrong
    fn validate_command(&self, parameters: &MotionParameters) -> PlanningResult<()> {
        if parameters.group_name != self.kinematics.group_name() {
            return Err(MotionPlanFault::UnknownPlanningGroup(parameters.group_name.clone()).into());
        }
        let dof = self.kinematics.joint_names().len();
        let start = &parameters.start;
        if start.positions.len() != dof || start.names.as_slice() != self.kinematics.joint_names() {
            return Err(PlanningError::InvalidRobotState(format!(
                "start state must list the {} joints of group '{}' in order",
                dof, parameters.group_name
            )));
        }
        let tolerance = self.config.tolerances.other_tolerance;
        if start.velocities.iter().any(|v| v.abs() > tolerance) {
            return Err(PlanningError::InvalidRobotState("start state is not at rest".to_string()));
        }
        match &parameters.goal {
            Goal::Joints(goal) if goal.len() != dof => {
                return Err(PlanningError::InvalidGoalConstraints(format!(
                    "expected {} joint goal values, got {}",
                    dof,
                    goal.len()
                )));
            }
            Goal::Pose { link_name, .. } if !self.kinematics.has_link(link_name) => {
                return Err(PlanningError::InvalidLinkName(link_name.clone()));
            }
            _ => {}
        }
        if !self.kinematics.has_link(&parameters.target_link) {
            return Err(PlanningError::InvalidLinkName(parameters.target_link.clone()));
        }
        Ok(())
    }

    fn forward(&self, link_name: &str, positions: &[f64]) -> PlanningResult<Pose> {
        self.kinematics
            .forward(link_name, positions)
            .map_err(|e| MotionPlanFault::ForwardKinematics(e).into())
    }

    /// Start and goal pose of the target link
    fn terminal_poses(&self, parameters: &MotionParameters) -> PlanningResult<(Pose, Pose)> {
        let start = self.forward(&parameters.target_link, &parameters.start.positions)?;
        let goal = match &parameters.goal {
            Goal::Pose { pose, .. } => *pose,
            Goal::Joints(positions) => self.forward(&parameters.target_link, positions)?,
        };
        Ok((start, goal))
    }

    fn circle_path(
        &self,
        start: &Pose,
        goal: &Pose,
        auxiliary: &AuxiliaryPoint,
    ) -> PlanningResult<CartesianPath> {
        let arc = resolve_circle(
            &pose_position(start),
            &pose_position(goal),
            auxiliary,
            &self.config.tolerances,
        )?;
        tracing::debug!(
            "Resolved circle: center {:?}, radius {:.4} m, sweep {:.4} rad",
            arc.center.coords.as_slice(),
            arc.radius,
            arc.sweep
        );
        Ok(CartesianPath::arc(start, goal, arc))
    }

    fn plan_cartesian(
        &self,
        parameters: &MotionParameters,
        path: &CartesianPath,
        progress: &mut Progress,
    ) -> PlanningResult<Vec<Vec<f64>>> {
        progress.enter(GenerationState::Parameterizing);
        let samples = parameterize(
            path,
            &self.limits.cartesian,
            parameters.velocity_scale,
            parameters.acceleration_scale,
            &self.config.sampling(),
        )?;

        progress.enter(GenerationState::MappingKinematics);
        inverse_along_path(
            &self.kinematics,
            &parameters.target_link,
            samples.iter().map(|sample| &sample.pose),
            &parameters.start.positions,
        )
    }

    /// Synchronized joint-space motion; every joint follows the same fraction
    fn plan_ptp(
        &self,
        parameters: &MotionParameters,
        progress: &mut Progress,
    ) -> PlanningResult<Vec<Vec<f64>>> {
        let start = &parameters.start.positions;
        let goal = match &parameters.goal {
            Goal::Joints(goal) => goal.clone(),
            Goal::Pose { link_name, pose } => self
                .kinematics
                .inverse(link_name, pose, start)
                .map_err(MotionPlanFault::UnreachableGoal)?,
        };

        progress.enter(GenerationState::Parameterizing);
        check_scaling(parameters.velocity_scale, parameters.acceleration_scale)?;
        let per_joint = self
            .kinematics
            .joint_names()
            .iter()
            .zip(start.iter().zip(goal.iter()))
            .filter(|(_, (q0, q1))| (*q1 - *q0).abs() > MIN_JOINT_DISTANCE)
            .map(|(name, (q0, q1))| {
                let distance = (q1 - q0).abs();
                let limit = self.limits.joint.get(name).ok_or_else(|| {
                    PlanningError::InvalidLimits(format!("no limits for joint '{}'", name))
                })?;
                Ok(FractionBounds {
                    velocity: parameters.velocity_scale * limit.max_velocity / distance,
                    acceleration: parameters.acceleration_scale * limit.max_acceleration / distance,
                    deceleration: parameters.acceleration_scale * limit.max_deceleration / distance,
                })
            })
            .collect::<PlanningResult<Vec<_>>>()?;
        let bounds =
            FractionBounds::tightest(per_joint).ok_or(MotionPlanFault::ZeroLengthMotion)?;
        let profile = SineSquaredProfile::new(bounds, &self.config.sampling())?;

        Ok(profile
            .fractions()
            .into_iter()
            .map(|fraction| {
                start
                    .iter()
                    .zip(goal.iter())
                    .map(|(q0, q1)| q0 + fraction * (q1 - q0))
                    .collect()
            })
            .collect())
    }
}
