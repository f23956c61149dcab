//! Blending of consecutive trajectories into one continuous motion

pub mod quintic;
pub mod transition_window;
pub mod sequence_planner;

pub use quintic::QuinticPolynomial;
pub use sequence_planner::SequencePlanner;
pub use transition_window::{assemble, BlendWindow, TransitionWindowBlender};
