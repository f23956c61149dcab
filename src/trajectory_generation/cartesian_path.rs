//! Time parameterization of linear and circular Cartesian paths
//!
//! Position follows the geometry, orientation is interpolated on the shortest
//! arc, and both advance with one shared path fraction so that translation and
//! rotation start and stop together.

use nalgebra::Point3;

use super::circle::CircleArc;
use super::time_law::{check_scaling, FractionBounds, Sampling, SineSquaredProfile};
use crate::common::{
    interpolate_orientation, pose_from_parts, pose_position, CartesianSample, MotionPlanFault,
    PlanningResult, Pose,
};
use crate::limits::CartesianLimit;

/// Shorter paths (m) do not constrain the time law
const MIN_PATH_LENGTH: f64 = 1e-9;
/// Smaller rotations (rad) do not constrain the time law
const MIN_ROTATION_ANGLE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
enum PathGeometry {
    Line { start: Point3<f64>, goal: Point3<f64> },
    Arc(CircleArc),
}

/// Geometric path of the target link between two poses
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianPath {
    geometry: PathGeometry,
    start: Pose,
    goal: Pose,
}

impl CartesianPath {
    pub fn line(start: &Pose, goal: &Pose) -> Self {
        Self {
            geometry: PathGeometry::Line {
                start: pose_position(start),
                goal: pose_position(goal),
            },
            start: *start,
            goal: *goal,
        }
    }

    /// Arc from `start` along `arc`; the end position is the arc's end point
    pub fn arc(start: &Pose, goal: &Pose, arc: CircleArc) -> Self {
        Self {
            geometry: PathGeometry::Arc(arc),
            start: *start,
            goal: *goal,
        }
    }

    /// Translational path length (m)
    pub fn length(&self) -> f64 {
        match &self.geometry {
            PathGeometry::Line { start, goal } => (goal - start).norm(),
            PathGeometry::Arc(arc) => arc.length(),
        }
    }

    /// Rotation angle between start and goal orientation (rad)
    pub fn rotation_angle(&self) -> f64 {
        self.start.rotation.angle_to(&self.goal.rotation)
    }

    pub fn pose_at(&self, fraction: f64) -> Pose {
        let position = match &self.geometry {
            PathGeometry::Line { start, goal } => start + (goal - start) * fraction,
            PathGeometry::Arc(arc) => arc.point(arc.sweep * fraction),
        };
        let orientation =
            interpolate_orientation(&self.start.rotation, &self.goal.rotation, fraction);
        pose_from_parts(position, orientation)
    }

    /// Bounds on the path fraction implied by the scaled Cartesian limits.
    ///
    /// Translation and rotation each bound the fraction; the tighter one wins.
    pub fn fraction_bounds(
        &self,
        limit: &CartesianLimit,
        velocity_scale: f64,
        acceleration_scale: f64,
    ) -> PlanningResult<FractionBounds> {
        check_scaling(velocity_scale, acceleration_scale)?;

        let translational_velocity = velocity_scale * limit.max_translational_velocity;
        let translational_acceleration = acceleration_scale * limit.max_translational_acceleration;
        let translational_deceleration = acceleration_scale * limit.max_translational_deceleration;
        let rotational_velocity = velocity_scale * limit.max_rotational_velocity;
        let rotational_acceleration = acceleration_scale * limit.max_rotational_acceleration();
        let rotational_deceleration = acceleration_scale * limit.max_rotational_deceleration();

        let length = self.length();
        let angle = self.rotation_angle();
        let translational = (length > MIN_PATH_LENGTH).then(|| FractionBounds {
            velocity: translational_velocity / length,
            acceleration: translational_acceleration / length,
            deceleration: translational_deceleration / length,
        });
        let rotational = (angle > MIN_ROTATION_ANGLE).then(|| FractionBounds {
            velocity: rotational_velocity / angle,
            acceleration: rotational_acceleration / angle,
            deceleration: rotational_deceleration / angle,
        });

        FractionBounds::tightest(translational.into_iter().chain(rotational))
            .ok_or_else(|| MotionPlanFault::ZeroLengthMotion.into())
    }
}

/// Sample `path` every sampling period under the scaled Cartesian limits.
///
/// The first sample is the start pose and the last one the end of the path.
pub fn parameterize(
    path: &CartesianPath,
    limit: &CartesianLimit,
    velocity_scale: f64,
    acceleration_scale: f64,
    sampling: &Sampling,
) -> PlanningResult<Vec<CartesianSample>> {
    let bounds = path.fraction_bounds(limit, velocity_scale, acceleration_scale)?;
    let profile = SineSquaredProfile::new(bounds, sampling)?;
    tracing::debug!(
        "Parameterized path: length {:.4} m, rotation {:.4} rad, {} steps",
        path.length(),
        path.rotation_angle(),
        profile.steps()
    );

    Ok(profile
        .fractions()
        .into_iter()
        .enumerate()
        .map(|(k, fraction)| CartesianSample {
            time_from_start: k as f64 * sampling.period,
            pose: path.pose_at(fraction),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::AuxiliaryPoint;
    use crate::common::{ErrorCode, PlanningError};
    use crate::config::Tolerances;
    use crate::trajectory_generation::circle::resolve_circle;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, UnitQuaternion, Vector3};

    fn limit() -> CartesianLimit {
        CartesianLimit::new(2.0, 4.0, 4.0, 2.0)
    }

    fn sampling(period: f64) -> Sampling {
        Sampling {
            period,
            max_samples: 100_000,
        }
    }

    fn pose(x: f64, y: f64, z: f64) -> Pose {
        Isometry3::translation(x, y, z)
    }

    #[test]
    fn test_line_samples_on_segment() {
        let path = CartesianPath::line(&pose(0.0, 0.0, 0.5), &pose(0.3, 0.1, 0.5));
        let samples = parameterize(&path, &limit(), 0.1, 0.1, &sampling(0.01)).unwrap();
        let direction = Vector3::new(0.3, 0.1, 0.0).normalize();
        for sample in &samples {
            let d = sample.position() - Point3::new(0.0, 0.0, 0.5);
            assert!(d.cross(&direction).norm() < 1e-12);
        }
        let end = samples.last().unwrap().position();
        assert_relative_eq!(end, Point3::new(0.3, 0.1, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_translational_speed_respected() {
        let path = CartesianPath::line(&pose(0.0, 0.0, 0.0), &pose(1.0, 0.0, 0.0));
        let dt = 0.01;
        let samples = parameterize(&path, &limit(), 0.25, 0.25, &sampling(dt)).unwrap();
        let top_speed = samples
            .windows(2)
            .map(|w| (w[1].position() - w[0].position()).norm() / dt)
            .fold(0.0, f64::max);
        assert!(top_speed <= 0.5 + 1e-6);
        assert!(top_speed > 0.4);
    }

    #[test]
    fn test_rotation_bounds_pure_turn() {
        let start = pose(0.0, 0.0, 0.5);
        let turn = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0);
        let goal = Isometry3::from_parts(start.translation, turn);
        let path = CartesianPath::line(&start, &goal);
        let bounds = path.fraction_bounds(&limit(), 0.5, 0.5).unwrap();
        assert_relative_eq!(bounds.velocity, 1.0, epsilon = 1e-12);
        let samples = parameterize(&path, &limit(), 0.5, 0.5, &sampling(0.01)).unwrap();
        for sample in &samples {
            assert_relative_eq!(sample.position(), Point3::new(0.0, 0.0, 0.5), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_arc_samples_equidistant() {
        let start = pose(0.5, 0.0, 0.5);
        let goal = pose(0.0, 0.5, 0.5);
        let arc = resolve_circle(
            &pose_position(&start),
            &pose_position(&goal),
            &AuxiliaryPoint::Center(Point3::new(0.0, 0.0, 0.5)),
            &Tolerances::default(),
        )
        .unwrap();
        let path = CartesianPath::arc(&start, &goal, arc);
        let samples = parameterize(&path, &limit(), 0.1, 0.1, &sampling(0.01)).unwrap();
        for sample in &samples {
            let d = sample.position() - Point3::new(0.0, 0.0, 0.5);
            assert_relative_eq!(d.norm(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_length_motion() {
        let path = CartesianPath::line(&pose(0.1, 0.0, 0.0), &pose(0.1, 0.0, 0.0));
        assert!(matches!(
            parameterize(&path, &limit(), 0.1, 0.1, &sampling(0.01)),
            Err(PlanningError::InvalidMotionPlan(MotionPlanFault::ZeroLengthMotion))
        ));
    }

    #[test]
    fn test_rotation_uses_scaled_rotational_limits() {
        let start = pose(0.0, 0.0, 0.5);
        let turn = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5);
        let path = CartesianPath::line(&start, &Isometry3::from_parts(start.translation, turn));
        let bounds = path.fraction_bounds(&limit(), 0.5, 0.25).unwrap();
        // rotational acceleration 2 * 4 / 2 = 4 rad/s², scaled by 0.25
        assert_relative_eq!(bounds.acceleration, 1.0 / 0.5, epsilon = 1e-9);
        assert_relative_eq!(bounds.velocity, 1.0 / 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_limit_fails_planning() {
        let path = CartesianPath::line(&pose(0.0, 0.0, 0.0), &pose(0.3, 0.0, 0.0));
        let err = parameterize(&path, &limit(), 1e-9, 1e-9, &sampling(0.01)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlanningFailed);
    }

    #[test]
    fn test_invalid_scaling_fails_planning() {
        let path = CartesianPath::line(&pose(0.0, 0.0, 0.0), &pose(0.1, 0.0, 0.0));
        let err = parameterize(&path, &limit(), 0.0, 0.1, &sampling(0.01)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PlanningFailed);
    }
}
