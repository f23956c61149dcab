//! Common types, traits, and error definitions for industrial_motion
//!
//! This module provides the foundational building blocks shared by the
//! generators, the blender and the kinematics adapters.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
