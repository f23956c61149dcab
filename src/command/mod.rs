//! Motion command model: loose requests, typed commands and sequences

pub mod request;
pub mod motion_command;
pub mod sequence;

pub use motion_command::*;
pub use request::*;
pub use sequence::*;
