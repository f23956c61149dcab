//! Transition-window blending of two consecutive trajectories
//!
//! Around the junction (the target-link position where the first trajectory
//! ends) a sphere of the blend radius cuts a tail off the first trajectory and
//! a head off the second. Inside that window the target link follows one
//! quintic polynomial per Cartesian coordinate, matched to the position,
//! velocity and acceleration of both trajectories at the window borders, so
//! the robot does not stop at the junction.
//!
//! Orientation is blended as a rotation vector relative to the orientation at
//! the window start. A window too fast for the joint limits is stretched in
//! time until it fits.

use nalgebra::{Point3, UnitQuaternion, Vector3, Vector6};

use super::quintic::QuinticPolynomial;
use crate::common::{
    pose_from_parts, pose_position, KinematicsSolver, MotionPlanFault, PlanningError,
    PlanningResult, Pose, ProfileSample, TimeLaw, Trajectory,
};
use crate::kinematics::{forward_along_path, inverse_along_path};
use crate::limits::JointLimits;
use crate::trajectory_generation::verification::verify_points;

/// Longest window, in multiples of the samples the sphere cuts off
const MAX_STRETCH: usize = 4;

/// Replacement for the samples around one junction
#[derive(Debug, Clone, PartialEq)]
pub struct BlendWindow {
    /// Index in the first trajectory where the window starts
    pub first_end: usize,
    /// Index in the second trajectory where the window ends
    pub second_start: usize,
    /// Joint positions from `first[first_end]` to `second[second_start]`, both included
    pub positions: Vec<Vec<f64>>,
}

impl BlendWindow {
    /// Window of a hard stop: nothing is replaced
    fn hard_stop(first: &Trajectory) -> PlanningResult<Self> {
        let last = first
            .last()
            .ok_or_else(|| PlanningError::planning_failed("cannot blend an empty trajectory"))?;
        Ok(Self {
            first_end: first.len() - 1,
            second_start: 0,
            positions: vec![last.positions.clone()],
        })
    }
}

/// Position and rotation vector of a pose, relative to `reference` for the rotation
fn chart(reference: &UnitQuaternion<f64>, pose: &Pose) -> Vector6<f64> {
    let position = pose.translation.vector;
    let rotation = (reference.inverse() * pose.rotation).scaled_axis();
    Vector6::new(position.x, position.y, position.z, rotation.x, rotation.y, rotation.z)
}

fn from_chart(reference: &UnitQuaternion<f64>, coordinates: &Vector6<f64>) -> Pose {
    let c = coordinates;
    let rotation = UnitQuaternion::from_scaled_axis(Vector3::new(c[3], c[4], c[5]));
    pose_from_parts(Point3::new(c[0], c[1], c[2]), reference * rotation)
}

/// Chart coordinates of one sample with their first and second time derivatives
struct BorderState {
    position: Vector6<f64>,
    velocity: Vector6<f64>,
    acceleration: Vector6<f64>,
}

impl BorderState {
    /// State of `poses[k]` by central differences; the first and last sample are at rest
    fn at(poses: &[Pose], k: usize, reference: &UnitQuaternion<f64>, dt: f64) -> Self {
        let position = chart(reference, &poses[k]);
        if k == 0 || k + 1 >= poses.len() {
            return Self {
                position,
                velocity: Vector6::zeros(),
                acceleration: Vector6::zeros(),
            };
        }
        let before = chart(reference, &poses[k - 1]);
        let after = chart(reference, &poses[k + 1]);
        Self {
            position,
            velocity: (after - before) / (2.0 * dt),
            acceleration: (after - 2.0 * position + before) / (dt * dt),
        }
    }

    fn axis(&self, i: usize) -> ProfileSample {
        ProfileSample {
            position: self.position[i],
            velocity: self.velocity[i],
            acceleration: self.acceleration[i],
        }
    }
}

/// Blends trajectories on the target link of one kinematics solver.
///
/// Faults carry junction 0; callers blending several junctions re-tag them.
pub struct TransitionWindowBlender<'a, K> {
    kinematics: &'a K,
    link_name: String,
    limits: &'a JointLimits,
}

impl<'a, K: KinematicsSolver> TransitionWindowBlender<'a, K> {
    pub fn new(kinematics: &'a K, link_name: impl Into<String>, limits: &'a JointLimits) -> Self {
        Self {
            kinematics,
            link_name: link_name.into(),
            limits,
        }
    }

    /// Blend `first` into `second` with `radius` (m); 0 keeps the stop at the junction
    pub fn blend(
        &self,
        first: &Trajectory,
        second: &Trajectory,
        radius: f64,
    ) -> PlanningResult<Trajectory> {
        let window = self.window(first, second, radius)?;
        assemble(&[first, second], &[window])
    }

    /// Compute the blend window between `first` and `second`.
    ///
    /// The radius may be at most half the straight distance covered by either trajectory.
    pub fn window(
        &self,
        first: &Trajectory,
        second: &Trajectory,
        radius: f64,
    ) -> PlanningResult<BlendWindow> {
        self.window_after(first, second, radius, 0)
    }

    /// Like [`window`](Self::window), but the window starts no earlier than
    /// `first[earliest_start]`, where the window of the previous junction ended.
    pub fn window_after(
        &self,
        first: &Trajectory,
        second: &Trajectory,
        radius: f64,
        earliest_start: usize,
    ) -> PlanningResult<BlendWindow> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(MotionPlanFault::InvalidBlendRadius { junction: 0, radius }.into());
        }
        if second.is_empty() {
            return Err(PlanningError::planning_failed("cannot blend an empty trajectory"));
        }
        if radius == 0.0 {
            return BlendWindow::hard_stop(first);
        }

        let first_poses = self.poses(first)?;
        let second_poses = self.poses(second)?;
        let (first_start, junction) = match (first_poses.first(), first_poses.last()) {
            (Some(start), Some(end)) => (pose_position(start), pose_position(end)),
            _ => return Err(PlanningError::planning_failed("cannot blend an empty trajectory")),
        };
        let second_end = second_poses.last().map(pose_position).unwrap_or(junction);
        let second_start = second_poses.first().map(pose_position).unwrap_or(junction);

        let max_radius =
            0.5 * (first_start - junction).norm().min((second_end - second_start).norm());
        let not_achievable = || -> PlanningError {
            MotionPlanFault::BlendRadiusNotAchievable {
                junction: 0,
                radius,
                max_radius,
            }
            .into()
        };
        if radius > max_radius {
            return Err(not_achievable());
        }

        let outside = |pose: &Pose| (pose_position(pose) - junction).norm() >= radius;
        let last1 = first_poses.len() - 1;
        let i1 = first_poses
            .iter()
            .rposition(outside)
            .ok_or_else(not_achievable)?
            .max(earliest_start);
        if i1 >= last1 {
            return Err(MotionPlanFault::OverlappingBlendWindows { junction: 0 }.into());
        }
        let i2 = second_poses.iter().position(outside).ok_or_else(not_achievable)?;

        let dt = first.sampling_time;
        let reference = first_poses[i1].rotation;
        let start = BorderState::at(&first_poses, i1, &reference, dt);
        let end = BorderState::at(&second_poses, i2, &reference, dt);

        let base_steps = (last1 - i1).max(i2).max(1);
        let mut steps = base_steps;
        loop {
            let poses = window_poses(&start, &end, &reference, steps, dt)?;
            let positions = inverse_along_path(
                self.kinematics,
                &self.link_name,
                &poses,
                &first.points[i1].positions,
            )?;
            match self.check_limits(first, second, i1, i2, &positions) {
                Ok(()) => {
                    tracing::debug!(
                        "Blend window: first trajectory from sample {}, second up to sample {}, \
                         {} steps",
                        i1,
                        i2,
                        steps
                    );
                    return Ok(BlendWindow {
                        first_end: i1,
                        second_start: i2,
                        positions,
                    });
                }
                Err(e) if steps < MAX_STRETCH * base_steps => {
                    tracing::debug!("Blend window of {} steps too fast, stretching: {}", steps, e);
                    steps = (steps + (steps / 10).max(1)).min(MAX_STRETCH * base_steps);
                }
                Err(e) => {
                    return Err(PlanningError::planning_failed(format!(
                        "blend window of radius {} violates the joint limits even over {} \
                         samples: {}",
                        radius, steps, e
                    )))
                }
            }
        }
    }

    fn poses(&self, trajectory: &Trajectory) -> PlanningResult<Vec<Pose>> {
        forward_along_path(
            self.kinematics,
            &self.link_name,
            trajectory.points.iter().map(|p| &p.positions),
        )
    }

    /// Check the window samples against the joint limits, with derivatives taken
    /// across the samples next to the window
    fn check_limits(
        &self,
        first: &Trajectory,
        second: &Trajectory,
        i1: usize,
        i2: usize,
        window: &[Vec<f64>],
    ) -> PlanningResult<()> {
        let before = i1.checked_sub(1).map(|k| first.points[k].positions.clone());
        let after = second.points.get(i2 + 1).map(|p| p.positions.clone());
        let offset = usize::from(before.is_some());
        let positions: Vec<Vec<f64>> = before
            .into_iter()
            .chain(window.iter().cloned())
            .chain(after)
            .collect();
        let joined =
            Trajectory::from_positions(first.joint_names.clone(), first.sampling_time, positions);
        verify_points(
            &joined.joint_names,
            &joined.points[offset..offset + window.len()],
            self.limits,
        )
    }
}

/// Poses of a window of `steps` samples from `start` to `end`
fn window_poses(
    start: &BorderState,
    end: &BorderState,
    reference: &UnitQuaternion<f64>,
    steps: usize,
    dt: f64,
) -> PlanningResult<Vec<Pose>> {
    let duration = steps as f64 * dt;
    let axes = (0..6)
        .map(|i| {
            QuinticPolynomial::new(start.axis(i), end.axis(i), duration)
                .ok_or_else(|| PlanningError::planning_failed("blend window has no duration"))
        })
        .collect::<PlanningResult<Vec<_>>>()?;
    Ok((0..=steps)
        .map(|k| {
            let t = k as f64 * dt;
            let coordinates = axes.iter().map(|axis| axis.sample(t).position);
            from_chart(reference, &Vector6::from_iterator(coordinates))
        })
        .collect())
}

/// Join `segments`, replacing the samples around junction `j` with `windows[j]`.
///
/// Two windows on the same segment may share one sample, the end of the
/// first being the start of the next. Derivatives are recomputed over the
/// joined positions.
pub fn assemble(segments: &[&Trajectory], windows: &[BlendWindow]) -> PlanningResult<Trajectory> {
    let first = segments.first().ok_or(MotionPlanFault::EmptySequence)?;
    if windows.len() + 1 != segments.len() {
        return Err(PlanningError::planning_failed(format!(
            "{} blend windows for {} trajectories",
            windows.len(),
            segments.len()
        )));
    }

    let mut positions = Vec::new();
    let mut from = 0;
    for (j, segment) in segments.iter().enumerate() {
        let window = windows.get(j);
        let to = window.map(|w| w.first_end).unwrap_or(segment.len());
        if from > to + 1 {
            return Err(MotionPlanFault::OverlappingBlendWindows { junction: j }.into());
        }
        let shared = from == to + 1;
        if !shared {
            positions.extend(segment.points[from..to].iter().map(|p| p.positions.clone()));
        }
        if let Some(window) = window {
            positions.extend(window.positions.iter().skip(usize::from(shared)).cloned());
            from = window.second_start + 1;
        }
    }

    Ok(Trajectory::from_positions(
        first.joint_names.clone(),
        first.sampling_time,
        positions,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::kinematics::{GantryWristRobot, TCP_LINK};
    use crate::trajectory_generation::verification::{verify_joint_limits, verify_terminal_state};
    use crate::testing::*;

    fn lin_between(a: Point3<f64>, b: Point3<f64>) -> Trajectory {
        generator().generate(&lin_request(&joints_at(a), b)).unwrap()
    }

    /// Two 0.3 m lines meeting at a right angle in (0.3, 0, 0.6)
    fn corner() -> (Trajectory, Trajectory) {
        let b = Point3::new(0.3, 0.0, 0.6);
        let first = lin_between(Point3::new(0.0, 0.0, 0.6), b);
        let second = lin_between(b, Point3::new(0.3, 0.3, 0.6));
        (first, second)
    }

    fn blend(first: &Trajectory, second: &Trajectory, radius: f64) -> PlanningResult<Trajectory> {
        let robot = robot();
        let limits = fixture_limits().joint;
        TransitionWindowBlender::new(&robot, TCP_LINK, &limits).blend(first, second, radius)
    }

    fn distance_to(robot: &GantryWristRobot, trajectory: &Trajectory, point: Point3<f64>) -> f64 {
        trajectory
            .points
            .iter()
            .map(|p| {
                let pose = robot.forward(TCP_LINK, &p.positions).unwrap();
                (pose_position(&pose) - point).norm()
            })
            .fold(f64::MAX, f64::min)
    }

    #[test]
    fn test_blend_cuts_the_corner_without_stopping() {
        let robot = robot();
        let (first, second) = corner();
        let blended = blend(&first, &second, 0.05).unwrap();

        assert!(blended.len() < first.len() + second.len() - 1);
        assert!(verify_joint_limits(&blended, &fixture_limits().joint).is_ok());

        let junction = Point3::new(0.3, 0.0, 0.6);
        let (closest, distance) = blended
            .points
            .iter()
            .enumerate()
            .map(|(k, p)| {
                let pose = robot.forward(TCP_LINK, &p.positions).unwrap();
                (k, (pose_position(&pose) - junction).norm())
            })
            .fold((0, f64::MAX), |best, item| if item.1 < best.1 { item } else { best });
        assert!(distance > 1e-3, "the corner must be cut");
        let speed: f64 =
            blended.points[closest].velocities.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!(speed > 0.02, "no stop at the junction, speed {}", speed);
    }

    #[test]
    fn test_blend_is_continuous() {
        let (first, second) = corner();
        let blended = blend(&first, &second, 0.05).unwrap();
        let dt = blended.sampling_time;
        for (a, b) in blended.points.iter().zip(blended.points.iter().skip(1)) {
            for j in 0..3 {
                assert!((b.velocities[j] - a.velocities[j]).abs() <= dt * 2.0 + 1e-9);
            }
        }
        assert!(verify_terminal_state(&blended, 1e-9).is_ok());
    }

    #[test]
    fn test_window_borders_follow_both_trajectories() {
        let robot = robot();
        let limits = fixture_limits().joint;
        let (first, second) = corner();
        let window = TransitionWindowBlender::new(&robot, TCP_LINK, &limits)
            .window(&first, &second, 0.1)
            .unwrap();
        let start = window.positions.first().unwrap();
        let end = window.positions.last().unwrap();
        for j in 0..start.len() {
            assert!((start[j] - first.points[window.first_end].positions[j]).abs() < 1e-9);
            assert!((end[j] - second.points[window.second_start].positions[j]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_radius_at_half_the_segment() {
        let robot = robot();
        let (first, second) = corner();
        let blended = blend(&first, &second, 0.15).unwrap();
        assert!(verify_joint_limits(&blended, &fixture_limits().joint).is_ok());
        assert!(verify_terminal_state(&blended, 1e-9).is_ok());
        assert!(distance_to(&robot, &blended, Point3::new(0.3, 0.0, 0.6)) > 0.01);
    }

    #[test]
    fn test_straight_continuation_stretches_the_window() {
        let robot = robot();
        let limits = fixture_limits().joint;
        let b = Point3::new(0.3, 0.0, 0.6);
        let first = lin_between(Point3::new(0.0, 0.0, 0.6), b);
        let second = lin_between(b, Point3::new(0.6, 0.0, 0.6));
        let blender = TransitionWindowBlender::new(&robot, TCP_LINK, &limits);

        // cruising in and out of a 0.3 m window over the samples the sphere cuts
        // off would exceed the 0.25 m/s joint velocity
        let window = blender.window(&first, &second, 0.15).unwrap();
        let cut = (first.len() - 1 - window.first_end).max(window.second_start);
        assert!(window.positions.len() - 1 > cut);

        let blended = blender.blend(&first, &second, 0.15).unwrap();
        assert!(verify_joint_limits(&blended, &limits).is_ok());
        assert!(blended.duration() < first.duration() + second.duration());
    }

    #[test]
    fn test_zero_radius_keeps_the_stop() {
        let (first, second) = corner();
        let joined = blend(&first, &second, 0.0).unwrap();
        assert_eq!(joined.len(), first.len() + second.len() - 1);
        let junction = &joined.points[first.len() - 1];
        assert!(junction.velocities.iter().all(|v| v.abs() < 1e-6));
        assert_eq!(junction.positions, first.last().unwrap().positions);
    }

    #[test]
    fn test_oversized_radius() {
        let (first, second) = corner();
        let err = blend(&first, &second, 0.2).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidMotionPlan);
        assert!(matches!(
            err,
            PlanningError::InvalidMotionPlan(MotionPlanFault::BlendRadiusNotAchievable { .. })
        ));
    }

    #[test]
    fn test_negative_radius() {
        let robot = robot();
        let limits = fixture_limits().joint;
        let (first, second) = corner();
        let err = TransitionWindowBlender::new(&robot, TCP_LINK, &limits)
            .window(&first, &second, -0.1)
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::InvalidMotionPlan(MotionPlanFault::InvalidBlendRadius { .. })
        ));
    }

    #[test]
    fn test_window_cannot_start_at_the_junction() {
        let robot = robot();
        let limits = fixture_limits().joint;
        let (first, second) = corner();
        let err = TransitionWindowBlender::new(&robot, TCP_LINK, &limits)
            .window_after(&first, &second, 0.05, first.len() - 1)
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::InvalidMotionPlan(MotionPlanFault::OverlappingBlendWindows { .. })
        ));
    }

    #[test]
    fn test_assemble_rejects_overlap() {
        let (first, second) = corner();
        let window = |first_end, second_start| BlendWindow {
            first_end,
            second_start,
            positions: vec![first.points[0].positions.clone()],
        };
        let err =
            assemble(&[&first, &second, &first], &[window(10, 50), window(20, 0)]).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::InvalidMotionPlan(MotionPlanFault::OverlappingBlendWindows {
                junction: 1
            })
        ));
    }

    #[test]
    fn test_assemble_windows_sharing_a_sample() {
        let (first, second) = corner();
        let marker = |value: f64| vec![value; 6];
        let windows = [
            BlendWindow {
                first_end: 10,
                second_start: 30,
                positions: vec![marker(1.0), marker(2.0), marker(3.0)],
            },
            BlendWindow {
                first_end: 30,
                second_start: 5,
                positions: vec![marker(3.0), marker(4.0), marker(5.0)],
            },
        ];
        let joined = assemble(&[&first, &second, &first], &windows).unwrap();
        assert_eq!(joined.len(), 10 + 3 + 2 + (first.len() - 6));
        assert_eq!(joined.points[12].positions, marker(3.0));
        assert_eq!(joined.points[13].positions, marker(4.0));
        assert_eq!(joined.points[15].positions, first.points[6].positions);
    }
}
