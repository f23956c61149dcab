//! Common types used throughout industrial_motion

use itertools::Itertools;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};

/// Cartesian pose of a link: position plus normalized orientation
pub type Pose = Isometry3<f64>;

/// Build a pose from a position and a (normalized) orientation
pub fn pose_from_parts(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Pose {
    Isometry3::from_parts(Translation3::from(position.coords), orientation)
}

/// Position part of a pose as a point
pub fn pose_position(pose: &Pose) -> Point3<f64> {
    Point3::from(pose.translation.vector)
}

/// Orientation a `fraction` of the way from `from` to `to` along the shortest arc.
///
/// Also defined for opposite orientations, where some rotation axis is picked.
pub fn interpolate_orientation(
    from: &UnitQuaternion<f64>,
    to: &UnitQuaternion<f64>,
    fraction: f64,
) -> UnitQuaternion<f64> {
    let relative = from.inverse() * to;
    match relative.axis_angle() {
        Some((axis, angle)) => from * UnitQuaternion::from_axis_angle(&axis, angle * fraction),
        None => *from,
    }
}

/// Named joint positions, velocities and accelerations of one planning group
#[derive(Debug, Clone, PartialEq)]
pub struct JointState {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
}

impl JointState {
    /// Joint state at rest
    pub fn at_rest(names: Vec<String>, positions: Vec<f64>) -> Self {
        let n = positions.len();
        Self {
            names,
            positions,
            velocities: vec![0.0; n],
            accelerations: vec![0.0; n],
        }
    }
}

/// One sample of a joint trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub time_from_start: f64,
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
}

/// Joint trajectory sampled at a uniform time step
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub joint_names: Vec<String>,
    pub sampling_time: f64,
    pub points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Build a trajectory from joint positions sampled every `sampling_time`.
    ///
    /// Velocities and accelerations are central differences, one-sided on the
    /// first and last sample.
    pub fn from_positions(
        joint_names: Vec<String>,
        sampling_time: f64,
        positions: Vec<Vec<f64>>,
    ) -> Self {
        let n = positions.len();
        let dof = joint_names.len();
        let dt2 = sampling_time * sampling_time;
        let mut velocities = vec![vec![0.0; dof]; n];
        let mut accelerations = vec![vec![0.0; dof]; n];

        for (k, (prev, curr, next)) in positions.iter().tuple_windows::<(_, _, _)>().enumerate() {
            for j in 0..dof {
                velocities[k + 1][j] = (next[j] - prev[j]) / (2.0 * sampling_time);
                accelerations[k + 1][j] = (next[j] - 2.0 * curr[j] + prev[j]) / dt2;
            }
        }

        if n >= 2 {
            let last = n - 1;
            for j in 0..dof {
                velocities[0][j] = (positions[1][j] - positions[0][j]) / sampling_time;
                velocities[last][j] = (positions[last][j] - positions[last - 1][j]) / sampling_time;
            }
        }
        if n >= 3 {
            let last = n - 1;
            for j in 0..dof {
                accelerations[0][j] =
                    (positions[2][j] - 2.0 * positions[1][j] + positions[0][j]) / dt2;
                accelerations[last][j] =
                    (positions[last][j] - 2.0 * positions[last - 1][j] + positions[last - 2][j])
                        / dt2;
            }
        }

        let points = positions
            .into_iter()
            .zip(velocities)
            .zip(accelerations)
            .enumerate()
            .map(|(k, ((positions, velocities), accelerations))| TrajectoryPoint {
                time_from_start: k as f64 * sampling_time,
                positions,
                velocities,
                accelerations,
            })
            .collect();

        Self {
            joint_names,
            sampling_time,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        self.last().map(|p| p.time_from_start).unwrap_or(0.0)
    }
}

/// Cartesian sample produced by the path parameterizer before kinematics mapping
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianSample {
    pub time_from_start: f64,
    pub pose: Pose,
}

impl CartesianSample {
    pub fn position(&self) -> Point3<f64> {
        pose_position(&self.pose)
    }
}

/// State of a one-dimensional motion profile at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileSample {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_joint_state_at_rest() {
        let state = JointState::at_rest(names(), vec![0.5, -1.0]);
        assert_eq!(state.positions, vec![0.5, -1.0]);
        assert!(state.velocities.iter().all(|v| *v == 0.0));
        assert!(state.accelerations.iter().all(|a| *a == 0.0));
    }

    #[test]
    fn test_trajectory_time_stamps_uniform() {
        let positions = (0..5).map(|k| vec![k as f64, 0.0]).collect();
        let traj = Trajectory::from_positions(names(), 0.1, positions);
        assert_eq!(traj.len(), 5);
        for (k, p) in traj.points.iter().enumerate() {
            assert!((p.time_from_start - k as f64 * 0.1).abs() < 1e-12);
        }
        assert!((traj.duration() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_trajectory_central_differences() {
        // q = t^2 on the first joint
        let dt = 0.1;
        let positions = (0..5).map(|k| vec![(k as f64 * dt).powi(2), 1.0]).collect();
        let traj = Trajectory::from_positions(names(), dt, positions);
        let mid = &traj.points[2];
        assert!((mid.velocities[0] - 0.4).abs() < 1e-9);
        assert!((mid.accelerations[0] - 2.0).abs() < 1e-9);
        assert_eq!(mid.velocities[1], 0.0);

        // one-sided at the ends
        let first = traj.first().unwrap();
        assert!((first.velocities[0] - 0.1).abs() < 1e-9);
        assert!((first.accelerations[0] - 2.0).abs() < 1e-9);
        let last = traj.last().unwrap();
        assert!((last.velocities[0] - 0.7).abs() < 1e-9);
        assert!((last.accelerations[0] - 2.0).abs() < 1e-9);
        assert_eq!(last.velocities[1], 0.0);
    }

    #[test]
    fn test_short_trajectories() {
        let two = Trajectory::from_positions(names(), 0.5, vec![vec![0.0, 0.0], vec![1.0, 0.0]]);
        assert_eq!(two.last().unwrap().velocities, vec![2.0, 0.0]);
        assert_eq!(two.last().unwrap().accelerations, vec![0.0, 0.0]);

        let one = Trajectory::from_positions(names(), 0.5, vec![vec![1.0, 2.0]]);
        assert_eq!(one.first().unwrap().velocities, vec![0.0, 0.0]);
    }

    #[test]
    fn test_interpolate_orientation() {
        let from = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.2);
        let to = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0);
        let mid = interpolate_orientation(&from, &to, 0.5);
        assert!(mid.angle_to(&UnitQuaternion::from_euler_angles(0.0, 0.0, 0.6)) < 1e-6);
        assert!(interpolate_orientation(&from, &to, 0.0).angle_to(&from) < 1e-6);
        assert!(interpolate_orientation(&from, &to, 1.0).angle_to(&to) < 1e-6);
        // identical orientations stay put
        assert_eq!(interpolate_orientation(&from, &from, 0.3), from);
    }

    #[test]
    fn test_pose_roundtrip_parts() {
        let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let pose = pose_from_parts(Point3::new(1.0, 2.0, 3.0), q);
        assert_eq!(pose_position(&pose), Point3::new(1.0, 2.0, 3.0));
        assert!(pose.rotation.angle_to(&q) < 1e-6);
    }
}
