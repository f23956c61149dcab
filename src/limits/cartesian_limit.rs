//! Cartesian bounds of the target link

/// Translational and rotational bounds of the target link
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CartesianLimit {
    /// m/s
    pub max_translational_velocity: f64,
    /// m/s²
    pub max_translational_acceleration: f64,
    /// m/s², magnitude
    pub max_translational_deceleration: f64,
    /// rad/s
    pub max_rotational_velocity: f64,
}

impl CartesianLimit {
    pub fn new(
        max_translational_velocity: f64,
        max_translational_acceleration: f64,
        max_translational_deceleration: f64,
        max_rotational_velocity: f64,
    ) -> Self {
        Self {
            max_translational_velocity,
            max_translational_acceleration,
            max_translational_deceleration,
            max_rotational_velocity,
        }
    }

    /// Name of the first unset or non-positive bound, if any
    pub fn invalid_bound(&self) -> Option<&'static str> {
        [
            ("max_translational_velocity", self.max_translational_velocity),
            ("max_translational_acceleration", self.max_translational_acceleration),
            ("max_translational_deceleration", self.max_translational_deceleration),
            ("max_rotational_velocity", self.max_rotational_velocity),
        ]
        .iter()
        .find(|(_, value)| !(value.is_finite() && *value > 0.0))
        .map(|(name, _)| *name)
    }

    /// Rotational acceleration derived from the translational ratio a/v
    pub fn max_rotational_acceleration(&self) -> f64 {
        self.max_rotational_velocity * self.max_translational_acceleration
            / self.max_translational_velocity
    }

    /// Rotational deceleration derived from the translational ratio d/v
    pub fn max_rotational_deceleration(&self) -> f64 {
        self.max_rotational_velocity * self.max_translational_deceleration
            / self.max_translational_velocity
    }
}
