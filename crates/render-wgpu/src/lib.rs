//! wgpu render backend for the maze viewer.
//!
//! Draws textured walls, floor and ceiling from a [`SceneGeometry`] built
//! once at startup. The camera is rebuilt from a pose snapshot every frame.
//!
//! # Invariants
//! - Renderer never mutates the map or the player.
//! - Textures are decoded before any GPU resource is created.
//! - Frame rate is independent of the simulation tick rate.
//!
//! [`SceneGeometry`]: mazeview_render::SceneGeometry

mod gpu;
mod shaders;
mod texture;

pub use gpu::MazeRenderer;
pub use texture::{TextureError, TextureImage, TextureSet};
