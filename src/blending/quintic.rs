//! Quintic polynomial between two boundary states
//!
//! Position, velocity and acceleration are matched at both ends. From rest at 0
//! to rest at 1 over a unit interval it is the smooth step `10s³ - 15s⁴ + 6s⁵`.

use nalgebra::{Matrix3, Vector3};

use crate::common::{ProfileSample, TimeLaw};

#[derive(Debug, Clone, PartialEq)]
pub struct QuinticPolynomial {
    coefficients: [f64; 6],
    duration: f64,
}

impl QuinticPolynomial {
    /// Polynomial from `start` at 0 to `end` at `duration`, `None` for a degenerate duration
    pub fn new(start: ProfileSample, end: ProfileSample, duration: f64) -> Option<Self> {
        let a0 = start.position;
        let a1 = start.velocity;
        let a2 = start.acceleration / 2.0;

        let t = duration;
        let (t2, t3, t4, t5) = (t * t, t * t * t, t.powi(4), t.powi(5));
        #[rustfmt::skip]
        let a = Matrix3::new(
            t3, t4, t5,
            3.0 * t2, 4.0 * t3, 5.0 * t4,
            6.0 * t, 12.0 * t2, 20.0 * t3,
        );
        let b = Vector3::new(
            end.position - a0 - a1 * t - a2 * t2,
            end.velocity - a1 - 2.0 * a2 * t,
            end.acceleration - 2.0 * a2,
        );
        let high = a.lu().solve(&b)?;

        Some(Self {
            coefficients: [a0, a1, a2, high[0], high[1], high[2]],
            duration,
        })
    }

    pub fn position(&self, t: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    pub fn velocity(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        c[1] + 2.0 * c[2] * t
            + 3.0 * c[3] * t.powi(2)
            + 4.0 * c[4] * t.powi(3)
            + 5.0 * c[5] * t.powi(4)
    }

    pub fn acceleration(&self, t: f64) -> f64 {
        let c = &self.coefficients;
        2.0 * c[2] + 6.0 * c[3] * t + 12.0 * c[4] * t.powi(2) + 20.0 * c[5] * t.powi(3)
    }
}

impl TimeLaw for QuinticPolynomial {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn sample(&self, t: f64) -> ProfileSample {
        let t = t.clamp(0.0, self.duration);
        ProfileSample {
            position: self.position(t),
            velocity: self.velocity(t),
            acceleration: self.acceleration(t),
        }
    }
}
