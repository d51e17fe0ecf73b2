//! Input controller: maps desktop key and mouse events onto simulation actions.
//!
//! # Invariants
//! - The key table is fixed; unmapped keys are ignored.
//! - Input never touches player state, it only produces actions.

mod bindings;
mod controller;

pub use bindings::KeyBindings;
pub use controller::InputController;
