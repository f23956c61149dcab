//! Circle through start and goal, fixed by a center or an interim point
//!
//! The resolved [`CircleArc`] carries its own traversal direction: position at
//! angle `phi` is `center + radius * (cos(phi) * u + sin(phi) * v)` with `u`
//! pointing at the start and `phi` running from 0 to `sweep`.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use thiserror::Error;

use crate::command::AuxiliaryPoint;
use crate::config::Tolerances;

// sine of the angle below which three points count as colinear
const COLINEAR_EPS: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircleError {
    #[error("start, goal and auxiliary point must be distinct")]
    CoincidentPoints,
    #[error("start radius {start_radius} and goal radius {goal_radius} differ over {tolerance}")]
    RadiusMismatch {
        start_radius: f64,
        goal_radius: f64,
        tolerance: f64,
    },
    #[error("start, center and goal are colinear, the circle plane is undefined")]
    ColinearCenter,
    #[error("start, interim and goal are colinear, the center is not well defined")]
    CenterNotDefined,
}

/// Circular arc in 3D
#[derive(Debug, Clone, PartialEq)]
pub struct CircleArc {
    pub center: Point3<f64>,
    pub radius: f64,
    /// Unit normal of the circle plane, the arc turns counter-clockwise about it
    pub normal: Vector3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    /// Angle swept from start to goal (rad)
    pub sweep: f64,
}

impl CircleArc {
    pub fn point(&self, phi: f64) -> Point3<f64> {
        self.center + self.radius * (phi.cos() * self.u + phi.sin() * self.v)
    }

    /// Arc length (m)
    pub fn length(&self) -> f64 {
        self.radius * self.sweep
    }

    /// Angle of the projection of `p` into the circle plane, in [0, 2π)
    fn angle_of(&self, p: &Point3<f64>) -> f64 {
        let d = p - self.center;
        let phi = d.dot(&self.v).atan2(d.dot(&self.u));
        if phi < 0.0 {
            phi + 2.0 * PI
        } else {
            phi
        }
    }
}

fn is_colinear(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    a.cross(b).norm() <= COLINEAR_EPS * a.norm() * b.norm()
}

/// Resolve the circle from `start` to `goal` through the auxiliary point
pub fn resolve_circle(
    start: &Point3<f64>,
    goal: &Point3<f64>,
    auxiliary: &AuxiliaryPoint,
    tolerances: &Tolerances,
) -> Result<CircleArc, CircleError> {
    let aux = match auxiliary {
        AuxiliaryPoint::Center(p) | AuxiliaryPoint::Interim(p) => p,
    };
    let eps = tolerances.point_tolerance;
    if (start - goal).norm() <= eps || (start - aux).norm() <= eps || (goal - aux).norm() <= eps {
        return Err(CircleError::CoincidentPoints);
    }

    match auxiliary {
        AuxiliaryPoint::Center(center) => {
            from_center(start, goal, center, tolerances.circle_radius_tolerance)
        }
        AuxiliaryPoint::Interim(interim) => from_interim(start, goal, interim),
    }
}

fn from_center(
    start: &Point3<f64>,
    goal: &Point3<f64>,
    center: &Point3<f64>,
    radius_tolerance: f64,
) -> Result<CircleArc, CircleError> {
    let to_start = start - center;
    let to_goal = goal - center;
    let start_radius = to_start.norm();
    let goal_radius = to_goal.norm();
    if (start_radius - goal_radius).abs() > radius_tolerance {
        return Err(CircleError::RadiusMismatch {
            start_radius,
            goal_radius,
            tolerance: radius_tolerance,
        });
    }
    if is_colinear(&to_start, &to_goal) {
        return Err(CircleError::ColinearCenter);
    }

    let cross = to_start.cross(&to_goal);
    let normal = cross.normalize();
    let u = to_start / start_radius;
    Ok(CircleArc {
        center: *center,
        radius: start_radius,
        normal,
        u,
        v: normal.cross(&u),
        // short way, always below π
        sweep: cross.norm().atan2(to_start.dot(&to_goal)),
    })
}

fn from_interim(
    start: &Point3<f64>,
    goal: &Point3<f64>,
    interim: &Point3<f64>,
) -> Result<CircleArc, CircleError> {
    let t = interim - start;
    let u = goal - start;
    let v = goal - interim;
    if is_colinear(&t, &u) {
        return Err(CircleError::CenterNotDefined);
    }
    let w = t.cross(&u);
    let w_sq = w.norm_squared();

    let center = start + (u * t.dot(&t) * u.dot(&v) - t * u.dot(&u) * t.dot(&v)) / (2.0 * w_sq);
    let to_start = start - center;
    let radius = to_start.norm();
    let normal = w / w_sq.sqrt();
    let basis_u = to_start / radius;
    let mut arc = CircleArc {
        center,
        radius,
        normal,
        u: basis_u,
        v: normal.cross(&basis_u),
        sweep: 0.0,
    };
    // start, interim, goal are counter-clockwise about `normal`
    arc.sweep = arc.angle_of(goal);
    Ok(arc)
}
