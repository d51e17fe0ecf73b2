//! Simulation kernel: player kinematics, the fixed-timestep step, and the
//! thread that runs it.
//!
//! # Invariants
//! - Only the simulation thread mutates the player and the held controls.
//! - The player never enters a wall cell; blocked moves are silent no-ops.
//! - Tick rate is independent of render rate.

pub mod player;
pub mod scheduler;
pub mod sim;

pub use player::Player;
pub use scheduler::{SimError, Simulation};
pub use sim::{Tuning, apply, step};
