use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One of the eight held-key controls that drive the simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    TiltUp,
    TiltDown,
}

impl Control {
    /// Every control, in the order the simulation step applies them.
    pub const ALL: [Control; 8] = [
        Control::Forward,
        Control::Back,
        Control::StrafeLeft,
        Control::StrafeRight,
        Control::TurnRight,
        Control::TurnLeft,
        Control::TiltUp,
        Control::TiltDown,
    ];
}

/// Persistent held-key state, one flag per [`Control`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub tilt_up: bool,
    pub tilt_down: bool,
}

impl ControlFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engage or release a single control.
    pub fn set(&mut self, control: Control, engaged: bool) {
        *self.flag_mut(control) = engaged;
    }

    pub fn is_set(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Back => self.back,
            Control::StrafeLeft => self.strafe_left,
            Control::StrafeRight => self.strafe_right,
            Control::TurnLeft => self.turn_left,
            Control::TurnRight => self.turn_right,
            Control::TiltUp => self.tilt_up,
            Control::TiltDown => self.tilt_down,
        }
    }

    /// Release every control.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when no control is held.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    /// Held controls in application order.
    pub fn held(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL.into_iter().filter(|c| self.is_set(*c))
    }

    fn flag_mut(&mut self, control: Control) -> &mut bool {
        match control {
            Control::Forward => &mut self.forward,
            Control::Back => &mut self.back,
            Control::StrafeLeft => &mut self.strafe_left,
            Control::StrafeRight => &mut self.strafe_right,
            Control::TurnLeft => &mut self.turn_left,
            Control::TurnRight => &mut self.turn_right,
            Control::TiltUp => &mut self.tilt_up,
            Control::TiltDown => &mut self.tilt_down,
        }
    }
}

/// An input intent produced by the render loop and consumed by the simulation.
///
/// The simulation thread is the only writer of player state; the render loop
/// never touches the player directly, it only queues actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// A control key went down (`engaged = true`) or up.
    Control { control: Control, engaged: bool },
    /// Mouse look, already scaled to radians. Positive yaw turns right,
    /// positive pitch tilts down.
    Look { yaw: f64, pitch: f64 },
    /// Drop every held control (e.g. the window lost focus).
    ReleaseAll,
}

/// Read-only snapshot of the player's position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    /// Position in map cells; x grows right, y grows down the rows.
    pub position: DVec2,
    /// Facing angle in radians, 0 along +x.
    pub dir: f64,
    /// Pitch in radians, positive looks down.
    pub tilt: f64,
}

impl Pose {
    /// Unit heading on the map plane.
    pub fn heading(&self) -> DVec2 {
        DVec2::new(self.dir.cos(), self.dir.sin())
    }

    /// Map cell the position falls in.
    pub fn cell(&self) -> (i64, i64) {
        (
            self.position.x.floor() as i64,
            self.position.y.floor() as i64,
        )
    }
}
