use glam::{DVec2, Vec2};
use mazeview_common::Pose;
use mazeview_map::GridMap;

/// Side of one map cell on the minimap, in pixels.
pub const CELL_SIZE: f32 = 20.0;
/// Margin between the minimap edge and the first cell.
pub const MAP_OFFSET: f32 = 10.0;
/// Diameter of the player dot.
pub const PLAYER_SIZE: f32 = 4.0;
/// Length of the heading segment.
pub const PLAYER_ARROW: f32 = CELL_SIZE / 2.0;
pub const HEADING_WIDTH: f32 = PLAYER_SIZE / 2.0;
pub const BORDER_WIDTH: f32 = 3.0;

pub type Rgba = [f32; 4];

pub const BACKGROUND_COLOR: Rgba = [0.2, 0.2, 0.2, 1.0];
pub const WALL_COLOR: Rgba = [0.8, 0.8, 0.8, 1.0];
pub const START_COLOR: Rgba = [1.0, 1.0, 1.0, 1.0];
pub const PLAYER_COLOR: Rgba = [0.0, 1.0, 0.0, 1.0];
pub const HEADING_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];
pub const BORDER_COLOR: Rgba = [0.0, 0.0, 1.0, 1.0];

/// Axis-aligned rectangle in minimap pixels, y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// A filled cell on the minimap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapCell {
    pub x: usize,
    pub y: usize,
    pub rect: Rect,
    pub color: Rgba,
}

/// Where the player dot and heading segment go this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMarker {
    pub position: Vec2,
    pub heading_end: Vec2,
}

/// Overhead 2D map layout: static cells plus a per-frame player marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimap {
    size: Vec2,
    cells: Vec<MinimapCell>,
}

impl Minimap {
    /// Lay out the static part of the minimap. Walls are gray, the start
    /// marker cell is white, open floor is left as background.
    pub fn new(map: &GridMap) -> Self {
        let size = Vec2::new(
            map.width() as f32 * CELL_SIZE + MAP_OFFSET * 2.0,
            map.height() as f32 * CELL_SIZE + MAP_OFFSET * 2.0,
        );
        let cells = map
            .cells()
            .filter_map(|(x, y, _)| {
                let color = if map.is_start_marker(x as i64, y as i64) {
                    START_COLOR
                } else if map.is_wall(x as i64, y as i64) {
                    WALL_COLOR
                } else {
                    return None;
                };
                let min = Vec2::new(
                    MAP_OFFSET + x as f32 * CELL_SIZE,
                    MAP_OFFSET + y as f32 * CELL_SIZE,
                );
                Some(MinimapCell {
                    x,
                    y,
                    rect: Rect {
                        min,
                        max: min + Vec2::splat(CELL_SIZE),
                    },
                    color,
                })
            })
            .collect();
        Self { size, cells }
    }

    /// Overall extent, including the margin on every side.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Filled background; also the outline drawn as the border.
    pub fn bounds(&self) -> Rect {
        Rect {
            min: Vec2::ZERO,
            max: self.size,
        }
    }

    pub fn cells(&self) -> &[MinimapCell] {
        &self.cells
    }

    /// Map a position in cells to minimap pixels.
    pub fn project(position: DVec2) -> Vec2 {
        Vec2::splat(MAP_OFFSET) + position.as_vec2() * CELL_SIZE
    }

    pub fn marker(&self, pose: &Pose) -> PlayerMarker {
        let position = Self::project(pose.position);
        PlayerMarker {
            position,
            heading_end: position + pose.heading().as_vec2() * PLAYER_ARROW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_map() -> GridMap {
        GridMap::parse("6 3 2.5 1.5 0\n######\n#@...#\n######\n").unwrap()
    }

    #[test]
    fn bounds_use_width_and_height_separately() {
        let minimap = Minimap::new(&wide_map());
        let bounds = minimap.bounds();
        assert_eq!(bounds.size(), Vec2::new(6.0 * 20.0 + 20.0, 3.0 * 20.0 + 20.0));
        assert_eq!(minimap.size(), bounds.max);
    }

    #[test]
    fn walls_and_start_cell_are_filled() {
        let minimap = Minimap::new(&wide_map());
        // 14 walls plus the start cell; three plain floor cells stay empty.
        assert_eq!(minimap.cells().len(), 15);
        let start = minimap
            .cells()
            .iter()
            .find(|c| c.x == 1 && c.y == 1)
            .unwrap();
        assert_eq!(start.color, START_COLOR);
        assert_eq!(start.rect.min, Vec2::new(30.0, 30.0));
        assert_eq!(start.rect.max, Vec2::new(50.0, 50.0));
        assert!(minimap.cells().iter().all(|c| c.x != 2 || c.y != 1));
        let corner = minimap.cells()[0];
        assert_eq!(corner.color, WALL_COLOR);
    }

    #[test]
    fn marker_points_along_heading() {
        let minimap = Minimap::new(&wide_map());
        let pose = Pose {
            position: DVec2::new(2.5, 1.5),
            dir: std::f64::consts::FRAC_PI_2,
            tilt: 0.0,
        };
        let marker = minimap.marker(&pose);
        assert_eq!(marker.position, Vec2::new(60.0, 40.0));
        let delta = marker.heading_end - marker.position;
        assert!(delta.x.abs() < 1e-4);
        assert!((delta.y - PLAYER_ARROW).abs() < 1e-4, "y grows downward");
    }
}
