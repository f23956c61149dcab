//! # Planner Configuration
//!
//! Sampling time, numeric tolerances and the kinematic limits of a planning
//! session, loaded from TOML.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! sampling_time = 0.01
//!
//! max_samples = 100000
//!
//! [tolerances]
//! other_tolerance = 1e-6
//! circle_radius_tolerance = 1e-3
//!
//! [cartesian_limits]
//! max_trans_vel = 2.0
//! max_trans_acc = 4.0
//! max_trans_dec = 4.0
//! max_rot_vel = 2.0
//!
//! [joint_limits.gantry_x]
//! max_velocity = 0.25
//! max_acceleration = 2.0
//! ```
//!
//! A joint without `max_deceleration` brakes with its `max_acceleration`.
//! Missing bounds are kept as zero so that the generator rejects them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::limits::{CartesianLimit, JointLimit, JointLimits, Limits};
use crate::trajectory_generation::Sampling;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level planner configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlannerConfig {
    /// Time between two trajectory samples (s)
    #[serde(default = "default_sampling_time")]
    pub sampling_time: f64,
    /// Most samples one time law may produce before planning fails
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default)]
    pub cartesian_limits: CartesianLimitConfig,
    #[serde(default)]
    pub joint_limits: BTreeMap<String, JointLimitConfig>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            sampling_time: default_sampling_time(),
            max_samples: default_max_samples(),
            tolerances: Tolerances::default(),
            cartesian_limits: CartesianLimitConfig::default(),
            joint_limits: BTreeMap::new(),
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check the values that are not part of the limits model
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sampling_time.is_finite() && self.sampling_time > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sampling_time must be positive, got {}",
                self.sampling_time
            )));
        }
        if self.max_samples < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_samples must be at least 2, got {}",
                self.max_samples
            )));
        }
        let t = &self.tolerances;
        for (name, value) in [
            ("other_tolerance", t.other_tolerance),
            ("circle_radius_tolerance", t.circle_radius_tolerance),
            ("point_tolerance", t.point_tolerance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn sampling(&self) -> Sampling {
        Sampling {
            period: self.sampling_time,
            max_samples: self.max_samples,
        }
    }

    /// Limits model described by this configuration.
    ///
    /// Unset bounds become zero; `Limits::validate` reports them.
    pub fn limits(&self) -> Limits {
        let joint = self
            .joint_limits
            .iter()
            .fold(JointLimits::new(), |limits, (name, cfg)| {
                limits.with_limit(name.clone(), cfg.to_limit())
            });
        Limits::new(joint, self.cartesian_limits.to_limit())
    }
}

/// Numeric tolerances used by validation and geometry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Tolerances {
    /// Start velocities and terminal derivatives below this are treated as zero
    #[serde(default = "default_other_tolerance")]
    pub other_tolerance: f64,
    /// Allowed difference between start and goal distance to an explicit center (m)
    #[serde(default = "default_circle_radius_tolerance")]
    pub circle_radius_tolerance: f64,
    /// Points closer than this are considered coincident (m)
    #[serde(default = "default_point_tolerance")]
    pub point_tolerance: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            other_tolerance: default_other_tolerance(),
            circle_radius_tolerance: default_circle_radius_tolerance(),
            point_tolerance: default_point_tolerance(),
        }
    }
}

/// Cartesian limits as written in the configuration file
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CartesianLimitConfig {
    #[serde(default)]
    pub max_trans_vel: Option<f64>,
    #[serde(default)]
    pub max_trans_acc: Option<f64>,
    #[serde(default)]
    pub max_trans_dec: Option<f64>,
    #[serde(default)]
    pub max_rot_vel: Option<f64>,
}

impl CartesianLimitConfig {
    pub fn to_limit(&self) -> CartesianLimit {
        CartesianLimit::new(
            self.max_trans_vel.unwrap_or_default(),
            self.max_trans_acc.unwrap_or_default(),
            self.max_trans_dec.map(f64::abs).unwrap_or_default(),
            self.max_rot_vel.unwrap_or_default(),
        )
    }
}

/// Joint limit as written in the configuration file
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct JointLimitConfig {
    #[serde(default)]
    pub max_velocity: Option<f64>,
    #[serde(default)]
    pub max_acceleration: Option<f64>,
    #[serde(default)]
    pub max_deceleration: Option<f64>,
}

impl JointLimitConfig {
    pub fn to_limit(&self) -> JointLimit {
        let acceleration = self.max_acceleration.unwrap_or_default();
        JointLimit::new(
            self.max_velocity.unwrap_or_default(),
            acceleration,
            self.max_deceleration.map(f64::abs).unwrap_or(acceleration),
        )
    }
}

fn default_sampling_time() -> f64 {
    0.01
}

fn default_max_samples() -> usize {
    100_000
}

fn default_other_tolerance() -> f64 {
    1e-6
}

fn default_circle_radius_tolerance() -> f64 {
    1e-3
}

fn default_point_tolerance() -> f64 {
    1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        sampling_time = 0.02

        [tolerances]
        other_tolerance = 1e-5

        [cartesian_limits]
        max_trans_vel = 1.0
        max_trans_acc = 2.0
        max_trans_dec = -2.0
        max_rot_vel = 0.5

        [joint_limits.j1]
        max_velocity = 1.0
        max_acceleration = 3.0

        [joint_limits.j2]
        max_velocity = 2.0
        max_acceleration = 3.0
        max_deceleration = 4.0
    "#;

    #[test]
    fn test_parse_config() {
        let config = PlannerConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.sampling_time, 0.02);
        assert_eq!(config.tolerances.other_tolerance, 1e-5);
        assert_eq!(config.tolerances.circle_radius_tolerance, 1e-3);

        let limits = config.limits();
        assert_eq!(limits.cartesian.max_translational_deceleration, 2.0);
        assert_eq!(limits.joint.get("j1").unwrap().max_deceleration, 3.0);
        assert_eq!(limits.joint.get("j2").unwrap().max_deceleration, 4.0);
        assert!(limits.validate(&["j1".to_string(), "j2".to_string()]).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        // nothing configured, so the limits are unusable
        assert!(config.limits().validate(&[]).is_err());
    }

    #[test]
    fn test_invalid_sampling_time() {
        let err = PlannerConfig::from_toml_str("sampling_time = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_max_samples() {
        let config = PlannerConfig::from_toml_str("max_samples = 500").unwrap();
        assert_eq!(config.sampling().max_samples, 500);
        assert_eq!(PlannerConfig::default().sampling().period, 0.01);
        let err = PlannerConfig::from_toml_str("max_samples = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = PlannerConfig::from_toml_str("sampling_time = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PlannerConfig::from_file("/nonexistent/planner.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
