use glam::DVec2;
use mazeview_common::Pose;
use mazeview_map::GridMap;
use std::f64::consts::TAU;
use std::sync::Arc;

/// The player: position, facing and tilt, moved with collision against the map.
///
/// Moves are resolved one axis at a time (X, then Y). Each axis is committed
/// only if its destination cell is open, so a diagonal move into a wall keeps
/// the free component and slides along the wall.
#[derive(Debug, Clone)]
pub struct Player {
    map: Arc<GridMap>,
    position: DVec2,
    dir: f64,
    tilt: f64,
    tilt_limit: Option<f64>,
}

impl Player {
    /// Place a player at the map's declared start, level, facing the start direction.
    pub fn spawn(map: Arc<GridMap>) -> Self {
        let position = map.start();
        let dir = map.start_dir();
        tracing::debug!(x = position.x, y = position.y, dir, "player spawned");
        Self {
            map,
            position,
            dir,
            tilt: 0.0,
            tilt_limit: None,
        }
    }

    /// Clamp tilt to `[-limit, limit]`. `None` or a non-finite limit leaves it
    /// unclamped.
    pub fn with_tilt_limit(mut self, limit: Option<f64>) -> Self {
        self.tilt_limit = limit.filter(|l| l.is_finite()).map(f64::abs);
        self.tilt = self.clamp_tilt(self.tilt);
        self
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn dir(&self) -> f64 {
        self.dir
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            dir: self.dir,
            tilt: self.tilt,
        }
    }

    pub fn walk_forward(&mut self, dist: f64) {
        self.slide(self.heading() * dist);
    }

    pub fn walk_back(&mut self, dist: f64) {
        self.slide(-self.heading() * dist);
    }

    pub fn shift_left(&mut self, dist: f64) {
        self.slide(-self.right() * dist);
    }

    pub fn shift_right(&mut self, dist: f64) {
        self.slide(self.right() * dist);
    }

    pub fn turn_left(&mut self, angle: f64) {
        self.dir = (self.dir - angle).rem_euclid(TAU);
    }

    pub fn turn_right(&mut self, angle: f64) {
        self.dir = (self.dir + angle).rem_euclid(TAU);
    }

    pub fn tilt_up(&mut self, angle: f64) {
        self.tilt = self.clamp_tilt(self.tilt - angle);
    }

    pub fn tilt_down(&mut self, angle: f64) {
        self.tilt = self.clamp_tilt(self.tilt + angle);
    }

    fn heading(&self) -> DVec2 {
        DVec2::new(self.dir.cos(), self.dir.sin())
    }

    /// Unit vector to the player's right. Map Y grows downward, so this is
    /// the heading rotated by +90 degrees.
    fn right(&self) -> DVec2 {
        DVec2::new(-self.dir.sin(), self.dir.cos())
    }

    fn slide(&mut self, delta: DVec2) {
        let new_x = self.position.x + delta.x;
        if self.is_open(new_x, self.position.y) {
            self.position.x = new_x;
        } else {
            tracing::trace!(x = new_x, y = self.position.y, "x move blocked");
        }

        let new_y = self.position.y + delta.y;
        if self.is_open(self.position.x, new_y) {
            self.position.y = new_y;
        } else {
            tracing::trace!(x = self.position.x, y = new_y, "y move blocked");
        }
    }

    fn is_open(&self, x: f64, y: f64) -> bool {
        !self.map.is_wall(x.floor() as i64, y.floor() as i64)
    }

    fn clamp_tilt(&self, tilt: f64) -> f64 {
        match self.tilt_limit {
            Some(limit) => tilt.clamp(-limit, limit),
            None => tilt,
        }
    }
}
