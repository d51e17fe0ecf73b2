use crate::bindings::KeyBindings;
use mazeview_common::{Action, ViewerConfig};
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Turns raw key and mouse events into [`Action`]s for the simulation.
///
/// Keys become persistent control changes; mouse motion becomes a one-shot
/// look scaled by the sensitivity.
#[derive(Debug, Clone)]
pub struct InputController {
    bindings: KeyBindings,
    sensitivity: f64,
    held: HashSet<KeyCode>,
}

impl InputController {
    pub fn new(bindings: KeyBindings, sensitivity: f64) -> Self {
        Self {
            bindings,
            sensitivity,
            held: HashSet::new(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(KeyBindings::default(), config.mouse_sensitivity)
    }

    /// Key down (`pressed = true`) or key up. Unmapped keys and auto-repeat
    /// presses of an already held key produce nothing.
    pub fn key(&mut self, key: KeyCode, pressed: bool) -> Option<Action> {
        let control = self.bindings.control_for(key)?;
        let changed = if pressed {
            self.held.insert(key)
        } else {
            self.held.remove(&key)
        };
        if !changed {
            return None;
        }
        tracing::debug!(?key, ?control, pressed, "control changed");
        Some(Action::Control {
            control,
            engaged: pressed,
        })
    }

    /// Relative mouse motion in pixels. Positive `dx` turns right, positive
    /// `dy` (mouse moved down) tilts down.
    pub fn mouse_motion(&self, dx: f64, dy: f64) -> Option<Action> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(Action::Look {
            yaw: dx * self.sensitivity,
            pitch: dy * self.sensitivity,
        })
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) -> Action {
        self.held.clear();
        Action::ReleaseAll
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}
