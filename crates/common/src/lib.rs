//! Shared vocabulary for the mazeview workspace: controls, actions, poses and
//! viewer configuration.

pub mod config;
mod types;

pub use config::{ConfigError, ViewerConfig};
pub use types::{Action, Control, ControlFlags, Pose};
