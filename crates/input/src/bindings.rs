use mazeview_common::Control;
use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Fixed key-to-control table.
///
/// Defaults: W/S walk, A/D strafe, Q/E turn, R/F tilt up/down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    table: HashMap<KeyCode, Control>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let table = [
            (KeyCode::KeyW, Control::Forward),
            (KeyCode::KeyS, Control::Back),
            (KeyCode::KeyA, Control::StrafeLeft),
            (KeyCode::KeyD, Control::StrafeRight),
            (KeyCode::KeyQ, Control::TurnLeft),
            (KeyCode::KeyE, Control::TurnRight),
            (KeyCode::KeyR, Control::TiltUp),
            (KeyCode::KeyF, Control::TiltDown),
        ]
        .into_iter()
        .collect();
        Self { table }
    }
}

impl KeyBindings {
    /// Control bound to `key`, if any.
    pub fn control_for(&self, key: KeyCode) -> Option<Control> {
        self.table.get(&key).copied()
    }

    /// Key bound to `control`, if any.
    pub fn key_for(&self, control: Control) -> Option<KeyCode> {
        self.table
            .iter()
            .find_map(|(k, c)| (*c == control).then_some(*k))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
