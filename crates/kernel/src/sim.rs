use crate::player::Player;
use mazeview_common::{Action, Control, ControlFlags, ViewerConfig};

/// Per-tick magnitudes used by [`step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Cells walked or strafed per tick.
    pub walk_distance: f64,
    /// Radians turned or tilted per tick.
    pub turn_angle: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for Tuning {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            walk_distance: config.walk_distance,
            turn_angle: config.turn_angle,
        }
    }
}

/// Advance the player by one tick for every held control.
pub fn step(flags: &ControlFlags, player: &mut Player, tuning: &Tuning) {
    for control in flags.held() {
        match control {
            Control::Forward => player.walk_forward(tuning.walk_distance),
            Control::Back => player.walk_back(tuning.walk_distance),
            Control::StrafeLeft => player.shift_left(tuning.walk_distance),
            Control::StrafeRight => player.shift_right(tuning.walk_distance),
            Control::TurnRight => player.turn_right(tuning.turn_angle),
            Control::TurnLeft => player.turn_left(tuning.turn_angle),
            Control::TiltUp => player.tilt_up(tuning.turn_angle),
            Control::TiltDown => player.tilt_down(tuning.turn_angle),
        }
    }
}

/// Apply one queued input action.
///
/// Control actions only change the held flags; look actions rotate the
/// player immediately.
pub fn apply(action: &Action, flags: &mut ControlFlags, player: &mut Player) {
    match *action {
        Action::Control { control, engaged } => flags.set(control, engaged),
        Action::Look { yaw, pitch } => {
            if yaw >= 0.0 {
                player.turn_right(yaw);
            } else {
                player.turn_left(-yaw);
            }
            if pitch >= 0.0 {
                player.tilt_down(pitch);
            } else {
                player.tilt_up(-pitch);
            }
        }
        Action::ReleaseAll => flags.clear(),
    }
}
