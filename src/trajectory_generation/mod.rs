//! Trajectory generation for single motion commands
//!
//! Circle resolution, time parameterization, kinematics mapping and joint-space
//! verification, driven by [`TrajectoryGenerator`].

pub mod circle;
pub mod time_law;
pub mod cartesian_path;
pub mod verification;
pub mod generator;

pub use cartesian_path::CartesianPath;
pub use circle::{resolve_circle, CircleArc, CircleError};
pub use generator::{GenerationState, TrajectoryGenerator};
pub use time_law::{FractionBounds, Sampling, SineSquaredProfile};
