//! Per-joint kinematic bounds

use std::collections::BTreeMap;

/// Velocity, acceleration and deceleration bound of a single joint.
///
/// All values are magnitudes; a valid limit has every bound finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointLimit {
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_deceleration: f64,
}

impl JointLimit {
    pub fn new(max_velocity: f64, max_acceleration: f64, max_deceleration: f64) -> Self {
        Self {
            max_velocity,
            max_acceleration,
            max_deceleration,
        }
    }

    /// Same bound for acceleration and deceleration
    pub fn symmetric(max_velocity: f64, max_acceleration: f64) -> Self {
        Self::new(max_velocity, max_acceleration, max_acceleration)
    }

    /// Name of the first unset or non-positive bound, if any
    pub fn invalid_bound(&self) -> Option<&'static str> {
        [
            ("max_velocity", self.max_velocity),
            ("max_acceleration", self.max_acceleration),
            ("max_deceleration", self.max_deceleration),
        ]
        .iter()
        .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        .map(|(name, _)| *name)
    }

    /// Bound applying to `acceleration` while moving at `velocity`.
    ///
    /// Braking (acceleration opposing velocity) is checked against the deceleration bound.
    pub fn acceleration_bound(&self, velocity: f64, acceleration: f64) -> f64 {
        if velocity * acceleration < 0.0 {
            self.max_deceleration
        } else {
            self.max_acceleration
        }
    }
}

/// Limits of all joints, keyed by joint name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointLimits {
    limits: BTreeMap<String, JointLimit>,
}

impl JointLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint_name: impl Into<String>, limit: JointLimit) {
        self.limits.insert(joint_name.into(), limit);
    }

    pub fn with_limit(mut self, joint_name: impl Into<String>, limit: JointLimit) -> Self {
        self.insert(joint_name, limit);
        self
    }

    pub fn get(&self, joint_name: &str) -> Option<&JointLimit> {
        self.limits.get(joint_name)
    }
}
