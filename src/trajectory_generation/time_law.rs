//! Sine-squared acceleration profile on the normalized path fraction
//!
//! Acceleration rises and falls as `sin²`, so the fraction, its rate and its
//! acceleration are all continuous and vanish at both ends. Between the
//! acceleration and deceleration phases the profile cruises at the velocity
//! bound when the path is long enough to reach it.

use std::f64::consts::PI;

use crate::common::{PlanningError, PlanningResult, ProfileSample, TimeLaw};

/// Upper bounds on the path fraction's rate, acceleration and deceleration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionBounds {
    pub velocity: f64,
    pub acceleration: f64,
    pub deceleration: f64,
}

impl FractionBounds {
    /// Tightest bounds over several constraints, `None` when there are none
    pub fn tightest(bounds: impl IntoIterator<Item = FractionBounds>) -> Option<FractionBounds> {
        bounds.into_iter().reduce(|a, b| FractionBounds {
            velocity: a.velocity.min(b.velocity),
            acceleration: a.acceleration.min(b.acceleration),
            deceleration: a.deceleration.min(b.deceleration),
        })
    }
}

/// Sampling period of a trajectory and the most samples one time law may produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    /// Seconds between two samples
    pub period: f64,
    pub max_samples: usize,
}

/// Reject scaling factors outside (0, 1]
pub fn check_scaling(velocity_scale: f64, acceleration_scale: f64) -> PlanningResult<()> {
    for (name, scale) in [("velocity", velocity_scale), ("acceleration", acceleration_scale)] {
        if !(scale.is_finite() && scale > 0.0 && scale <= 1.0) {
            return Err(PlanningError::planning_failed(format!(
                "{} scaling factor {} outside (0, 1]",
                name, scale
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SineSquaredProfile {
    /// Reached fraction rate
    velocity: f64,
    /// Peak acceleration and deceleration
    acceleration: f64,
    deceleration: f64,
    accel_time: f64,
    cruise_time: f64,
    decel_time: f64,
    /// Unstretched time per stretched time, at most 1
    time_scale: f64,
    duration: f64,
    steps: usize,
}

impl SineSquaredProfile {
    /// Profile from fraction 0 to 1 whose duration is a whole multiple of the sampling period.
    ///
    /// The bounds must be finite and positive. Fails with `PlanningFailed` when
    /// the profile needs more samples than `sampling` allows.
    pub fn new(bounds: FractionBounds, sampling: &Sampling) -> PlanningResult<Self> {
        let FractionBounds {
            velocity: max_velocity,
            acceleration,
            deceleration,
        } = bounds;

        // the sin² ramps cover v²/a and v²/d
        let ramp_factor = 1.0 / acceleration + 1.0 / deceleration;
        let (velocity, cruise_time) = if max_velocity * max_velocity * ramp_factor >= 1.0 {
            ((1.0 / ramp_factor).sqrt(), 0.0)
        } else {
            (
                max_velocity,
                (1.0 - max_velocity * max_velocity * ramp_factor) / max_velocity,
            )
        };
        let accel_time = 2.0 * velocity / acceleration;
        let decel_time = 2.0 * velocity / deceleration;
        let raw_duration = accel_time + cruise_time + decel_time;

        let steps = ((raw_duration / sampling.period) - 1e-9).ceil().max(1.0);
        if !(steps.is_finite() && steps + 1.0 <= sampling.max_samples as f64) {
            return Err(PlanningError::planning_failed(format!(
                "motion of {:.3e} s needs more than {} samples",
                raw_duration, sampling.max_samples
            )));
        }
        let steps = steps as usize;
        let duration = steps as f64 * sampling.period;

        Ok(Self {
            velocity,
            acceleration,
            deceleration,
            accel_time,
            cruise_time,
            decel_time,
            time_scale: raw_duration / duration,
            duration,
            steps,
        })
    }

    /// Number of sampling intervals
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Fractions at every sampling instant, ending exactly at 1
    pub fn fractions(&self) -> Vec<f64> {
        let dt = self.duration / self.steps as f64;
        (0..=self.steps)
            .map(|k| if k == self.steps { 1.0 } else { self.fraction(k as f64 * dt) })
            .collect()
    }

    /// Sample of a `sin²` ramp with peak `peak` and length `ramp` at time `t` into it
    fn ramp(peak: f64, ramp: f64, t: f64) -> ProfileSample {
        let w = 2.0 * PI / ramp;
        ProfileSample {
            position: 0.5 * peak * (t * t / 2.0 + ((w * t).cos() - 1.0) / (w * w)),
            velocity: 0.5 * peak * (t - (w * t).sin() / w),
            acceleration: peak * (PI * t / ramp).sin().powi(2),
        }
    }

    fn sample_unstretched(&self, tau: f64) -> ProfileSample {
        let cruise_start = self.accel_time;
        let decel_start = self.accel_time + self.cruise_time;
        if tau < cruise_start {
            Self::ramp(self.acceleration, self.accel_time, tau)
        } else if tau < decel_start {
            let start = Self::ramp(self.acceleration, self.accel_time, self.accel_time);
            ProfileSample {
                position: start.position + self.velocity * (tau - cruise_start),
                velocity: self.velocity,
                acceleration: 0.0,
            }
        } else {
            // mirrored ramp, counted back from the end
            let remaining = (self.accel_time + self.cruise_time + self.decel_time - tau).max(0.0);
            let mirror = Self::ramp(self.deceleration, self.decel_time, remaining);
            ProfileSample {
                position: 1.0 - mirror.position,
                velocity: mirror.velocity,
                acceleration: -mirror.acceleration,
            }
        }
    }
}

impl TimeLaw for SineSquaredProfile {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn sample(&self, t: f64) -> ProfileSample {
        if t <= 0.0 {
            return ProfileSample::default();
        }
        if t >= self.duration {
            return ProfileSample {
                position: 1.0,
                ..ProfileSample::default()
            };
        }
        let s = self.sample_unstretched(t * self.time_scale);
        ProfileSample {
            position: s.position,
            velocity: s.velocity * self.time_scale,
            acceleration: s.acceleration * self.time_scale * self.time_scale,
        }
    }
}
