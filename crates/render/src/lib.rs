//! Rendering adapter: backend-agnostic view of the maze.
//!
//! Computes everything a backend needs to draw a frame (camera, static 3D
//! scene, minimap layout) without touching a GPU.
//!
//! # Invariants
//! - Renderers never mutate the map or the player.
//! - Render state derives from the map and a pose snapshot.

mod camera;
mod minimap;
mod renderer;
mod scene;

pub use camera::{Camera, EYE_HEIGHT, WALL_HEIGHT, to_world};
pub use minimap::{
    BACKGROUND_COLOR, BORDER_COLOR, BORDER_WIDTH, CELL_SIZE, HEADING_COLOR, HEADING_WIDTH,
    MAP_OFFSET, Minimap, MinimapCell, PLAYER_ARROW, PLAYER_COLOR, PLAYER_SIZE, PlayerMarker, Rect,
    Rgba, START_COLOR, WALL_COLOR,
};
pub use renderer::{AsciiRenderer, Renderer, heading_glyph};
pub use scene::{Quad, SceneGeometry, Surface};
